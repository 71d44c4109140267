use thiserror::Error;

#[derive(Error, Debug)]
pub enum UmbraError {
    #[error("length mismatch for {what}: {got} vs {expected}")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("bounds violation: {0}")]
    Bounds(String),

    #[error("mask plane '{0}' is not defined")]
    MissingMaskPlane(String),

    #[error("mask plane limit reached while adding '{0}'")]
    MaskPlaneLimit(String),
}

pub type Result<T> = std::result::Result<T, UmbraError>;
