pub mod app;
pub mod config;
pub mod docker;
pub mod services;
pub mod ui;
