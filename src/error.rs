//! Error types for terrain map generation

use thiserror::Error;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The diagram source could not produce a subdivision
    #[error("diagram generation failed: {0}")]
    DiagramFailed(String),

    /// The raw subdivision is internally inconsistent
    #[error("malformed diagram: {0}")]
    MalformedDiagram(String),

    /// Fewer usable polygons than requested sites
    #[error("degenerate diagram: expected {expected} polygons, got {actual}")]
    DegenerateDiagram {
        /// Number of sites that were requested
        expected: usize,
        /// Number of polygons the diagram actually produced
        actual: usize,
    },

    /// An internal graph invariant does not hold
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Requested center ID does not exist
    #[error("center not found: {0}")]
    CenterNotFound(usize),
}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;
