use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during cap geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Transform is not invertible")]
    SingularTransform,

    #[error("Degenerate plane normal")]
    DegeneratePlane,
}

impl Error {
    /// Shorthand for a malformed mesh error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedMesh(msg.into())
    }
}
