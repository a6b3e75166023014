#![warn(clippy::all, rust_2018_idioms)]

pub mod actions;
pub mod app;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod output;

pub use app::run;
pub use config::{Args, Config, RunSettings};
pub use error::{Error, Result};
