// MangaShelf - app/mod.rs
//
// Application layer: orchestration, state management, collection loading.
// Dependencies: core layer, platform layer.

pub mod controller;
pub mod library_mgr;
pub mod prompt;
pub mod state;
