pub mod api;
pub mod attempt;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod model;
pub mod navigator;
pub mod session;
pub mod state;
pub mod submit;
pub mod timer;
pub mod tui;
pub mod ui;
pub mod viewer;
