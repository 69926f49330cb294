// MangaShelf - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: standard library, directories crate, core value types.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
