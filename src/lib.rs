pub mod app;
pub mod async_task;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod confirm;
pub mod error;
pub mod event;
pub mod executor;
pub mod expansion;
pub mod main_lib;
pub mod mode;
pub mod navigator;
pub mod provider;
pub mod screenshot;
pub mod selector;
pub mod snapshot;
pub mod status;
pub mod test_runner;
pub mod theme;
pub mod ui;
