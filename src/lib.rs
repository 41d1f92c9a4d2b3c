pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod progress;
pub mod prompt;
pub mod view;
