// MangaShelf - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library plus data crates (chrono, regex, walkdir, glob).
// Must NOT depend on: platform, app, or any terminal I/O.

pub mod browse;
pub mod export;
pub mod filter;
pub mod home;
pub mod merge;
pub mod metadata;
pub mod model;
pub mod reader;
pub mod selection;
pub mod sort;
