use std::collections::TryReserveError;

use crate::schema::SectionKind;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Fewer bytes were available than a field requires.
    #[error("truncated input reading {section}.{field}: needed {needed} bytes, got {got}")]
    Truncated {
        section: SectionKind,
        field: &'static str,
        needed: usize,
        got: usize,
    },

    /// A section identifier did not match the schema after byte-order normalization.
    #[error("wrong {section} id in frame: read {actual:#06x}, expected {expected:#06x}")]
    SchemaViolation {
        section: SectionKind,
        expected: u16,
        actual: u16,
    },

    #[error("failed to grow series storage by {requested} records")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// The section a decode error refers to, if any.
    #[must_use]
    pub fn section(&self) -> Option<SectionKind> {
        match self {
            Error::Truncated { section, .. } | Error::SchemaViolation { section, .. } => {
                Some(*section)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
