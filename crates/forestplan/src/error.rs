use thiserror::Error;

/// Errors surfaced by the two public operations.
///
/// Internal recoveries (a polygon that cannot be bisected, a compartment that
/// under-produces plots) never show up here; they are logged and the request
/// continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("compartment count must be >= 1, got {0}")]
    InvalidCount(usize),

    #[error("no compartments to sample")]
    NoCompartments,

    #[error("sampling intensity must be finite and >= 0, got {0}")]
    InvalidIntensity(f64),

    #[error("compartment {compartment_id} would need {requested} plots, more than the limit of {limit}")]
    TooManyPlots {
        compartment_id: String,
        requested: usize,
        limit: usize,
    },
}

impl GeometryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry(reason.into())
    }
}

/// Convenience alias for results using [`GeometryError`].
pub type Result<T> = std::result::Result<T, GeometryError>;
