pub mod app;
pub mod audio;
pub mod config;
pub mod engine;
pub mod prefs;
pub mod render;
pub mod terminal;
