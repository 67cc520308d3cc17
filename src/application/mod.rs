//! Application layer: record loading and services

pub mod entry;
pub mod error;
pub mod loader;
pub mod services;

pub use entry::{Entry, Key};
pub use error::{ApplicationError, ApplicationResult};
pub use loader::{load_records, parse_records, RecordFormat};
