//! Error type shared by every module of the crate.
//!
//! All failures here are caused by caller input: a bad column name, an
//! out-of-range record, a parameter vector of the wrong length, and so on.
//! Each variant names the offending value or position so the message is useful
//! on its own.

use thiserror::Error;

use crate::data::Role;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("all columns must have the same length, but {column:?} has {actual} records (expected {expected})")]
    ColumnsLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column {0:?} appears more than once")]
    DuplicateColumn(String),

    #[error("could not find column {0:?} in data")]
    ColumnExistence(String),

    #[error("no column number {index} in data; index should be between 1 and {columns}")]
    ColumnIndex { index: usize, columns: usize },

    #[error("record number {index} is out of range; index should be between 1 and {records}")]
    RecordIndex { index: usize, records: usize },

    #[error("records selection has {actual} entries but data has {expected} records")]
    RecordsSelection { expected: usize, actual: usize },

    #[error("{0}")]
    Set(String),

    #[error("no column is bound to the {0} role")]
    MissingRole(Role),

    #[error("{0}")]
    Function(String),

    #[error("{function} has no analytic {derivative} derivative")]
    MissingDerivative {
        function: String,
        derivative: &'static str,
    },

    #[error("{0}")]
    Save(String),

    #[error("{0}")]
    Load(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("cannot compute {0} of an empty sequence")]
    EmptyData(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Io(String),
}

impl Error {
    /// Process exit code used by the `fitdata` binary.
    ///
    /// - 2: bad input or usage (unreadable file, malformed grid, unknown name)
    /// - 3: the data cannot support the request (empty selection, missing role)
    /// - 4: internal/serialization failures
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::EmptyData(_) | Error::MissingRole(_) | Error::RecordsSelection { .. } => 3,
            Error::Serialization(_) => 4,
            _ => 2,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
