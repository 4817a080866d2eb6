pub mod formatters;
mod tables;

pub use tables::{render_portfolio, render_quotes};
