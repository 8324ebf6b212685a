//! Input helpers.
//!
//! - raw cell grid → named numeric columns (`raw`)
//! - CSV file → raw cell grid (`ingest`)

pub mod ingest;
pub mod raw;

pub use ingest::*;
pub use raw::*;
