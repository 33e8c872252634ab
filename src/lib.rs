pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod performance;
pub mod ui;
pub mod utils;
