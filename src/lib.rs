pub mod bump;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod hooks;
pub mod plugins;
pub mod store;
pub mod ui;
pub mod warning;
pub mod workspace;

pub use error::{BumpError, Result};
