pub mod aggregator;
pub mod api;
pub mod app;
pub mod commentary;
pub mod config;
pub mod quote;
pub mod resolver;
pub mod synthetic;
pub mod ticker;
pub mod ui;
