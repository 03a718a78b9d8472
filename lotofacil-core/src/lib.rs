pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod history;
pub mod models;

pub use error::{CoreError, Result};
