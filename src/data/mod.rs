//! Tabular measurement data.
//!
//! - [`FittingData`]: named columns, role bindings and a record mask
//! - [`FittingDataPayload`]: its serde form
//! - [`sample`]: synthetic datasets around a model function

pub mod fitting_data;
pub mod payload;
pub mod roles;
pub mod sample;

pub use fitting_data::FittingData;
pub use payload::{ColumnTable, FittingDataPayload};
pub use roles::{ColumnRef, Role, RoleHints};
pub use sample::{generate_sample, SampleConfig};
