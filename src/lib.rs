//! Bulk item import: delimited text or spreadsheets in, validated item records out to the
//! items REST backend in sequential chunks.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{ApiError, ImportError};
