pub mod app;
pub mod library;
pub mod logging;
pub mod player;
pub mod theme;
pub mod ui;
pub mod watcher;
pub mod wav;
