//! Centralized error handling for mpas_post
//!
//! Every fallible operation in the crate returns [`Result`], so errors from the
//! NetCDF library, array reshaping and time decoding all surface as one type.

use std::fmt;

/// Main error type for mpas_post operations
#[derive(Debug)]
pub enum MpasPostError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in a dataset
    VariableNotFound { var: String },

    /// Dimension not found in a dataset or variable
    DimensionNotFound { dim: String },

    /// Lengths along a dimension disagree
    ShapeMismatch { message: String },

    /// Variable holds character data where numbers were expected, or the reverse
    TypeMismatch { var: String, expected: &'static str },

    /// A replacement coordinate is not usable as a dimension coordinate
    InvalidCoordinate { message: String },

    /// Bounding box or map extent is unusable
    InvalidBounds { message: String },

    /// Encoded timestamp could not be decoded
    TimeDecode { value: String, message: String },

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error
    Generic(String),
}

impl fmt::Display for MpasPostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpasPostError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            MpasPostError::IoError(e) => write!(f, "I/O error: {}", e),
            MpasPostError::ArrayError(e) => write!(f, "Array error: {}", e),
            MpasPostError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in dataset", var)
            }
            MpasPostError::DimensionNotFound { dim } => {
                write!(f, "Dimension '{}' not found in dataset", dim)
            }
            MpasPostError::ShapeMismatch { message } => write!(f, "Shape mismatch: {}", message),
            MpasPostError::TypeMismatch { var, expected } => {
                write!(f, "Variable '{}' is not {} data", var, expected)
            }
            MpasPostError::InvalidCoordinate { message } => {
                write!(f, "Invalid coordinate: {}", message)
            }
            MpasPostError::InvalidBounds { message } => write!(f, "Invalid bounds: {}", message),
            MpasPostError::TimeDecode { value, message } => {
                write!(f, "Cannot decode time '{}': {}", value, message)
            }
            MpasPostError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            MpasPostError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MpasPostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MpasPostError::NetCDFError(e) => Some(e),
            MpasPostError::IoError(e) => Some(e),
            MpasPostError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for MpasPostError {
    fn from(error: netcdf::Error) -> Self {
        MpasPostError::NetCDFError(error)
    }
}

impl From<std::io::Error> for MpasPostError {
    fn from(error: std::io::Error) -> Self {
        MpasPostError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for MpasPostError {
    fn from(error: ndarray::ShapeError) -> Self {
        MpasPostError::ArrayError(error)
    }
}

impl From<String> for MpasPostError {
    fn from(error: String) -> Self {
        MpasPostError::Generic(error)
    }
}

impl From<&str> for MpasPostError {
    fn from(error: &str) -> Self {
        MpasPostError::Generic(error.to_string())
    }
}

/// Result type alias for mpas_post operations
pub type Result<T> = std::result::Result<T, MpasPostError>;
