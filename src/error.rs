// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during solver setup, marching, or I/O.
#[derive(Debug)]
pub enum EikonalError {
    /// Grid size has a zero element.
    InvalidGridSize {
        /// The axis index.
        axis: usize,
        /// The size provided.
        size: usize,
    },
    /// Grid spacing is not positive and finite.
    InvalidGridSpacing {
        /// The axis index.
        axis: usize,
        /// The spacing provided.
        spacing: f64,
    },
    /// Speed value is not positive and finite.
    InvalidSpeed {
        /// The flat index of the invalid value for per-cell speed fields,
        /// `None` for a uniform scalar speed.
        index: Option<usize>,
        /// The invalid value.
        value: f64,
    },
    /// Slowness value is not positive and finite.
    InvalidSlowness {
        /// The flat index of the invalid value.
        index: usize,
        /// The invalid value.
        value: f64,
    },
    /// Speed lookup at an index outside the speed grid.
    SpeedOutOfBounds {
        /// The offending index.
        index: Vec<i32>,
    },
    /// Seed index and seed distance lists have different lengths.
    SeedMismatch {
        /// Number of seed indices.
        indices: usize,
        /// Number of seed distances.
        distances: usize,
    },
    /// The seed list is empty.
    SeedEmpty,
    /// A seed index lies outside the grid.
    SeedOutOfBounds {
        /// The offending index.
        index: Vec<i32>,
    },
    /// The same index appears more than once in the seed list.
    SeedDuplicate {
        /// The offending index.
        index: Vec<i32>,
    },
    /// A seed distance failed the driver's distance predicate.
    SeedDistanceRejected {
        /// The rejected distance.
        distance: f64,
    },
    /// The seed list covers every cell of the grid.
    WholeGridFrozen,
    /// A seed component has a single dilation band, so inside and outside
    /// cannot be distinguished.
    OpenComponent,
    /// The local eikonal quadratic has a negative discriminant or a
    /// negative root.
    UnsolvableQuadratic,
    /// Some cells were still unfrozen when the narrow band drained.
    IncompleteMarch {
        /// Number of cells left unfrozen.
        unfrozen: usize,
    },
    /// Array shape does not match the expected shape.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape encountered.
        got: Vec<usize>,
    },
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// Expected MAT variable not found in file.
    MatVariableNotFound {
        /// The variable name that was requested.
        expected: String,
        /// The variable names that are available.
        available: Vec<String>,
    },
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for EikonalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EikonalError::InvalidGridSize { axis, size } => {
                write!(
                    f,
                    "invalid grid size: axis {} has size {} (must be nonzero)",
                    axis, size
                )
            }
            EikonalError::InvalidGridSpacing { axis, spacing } => {
                write!(
                    f,
                    "invalid grid spacing: axis {} has spacing {} (must be positive and finite)",
                    axis, spacing
                )
            }
            EikonalError::InvalidSpeed { index, value } => match index {
                Some(i) => write!(
                    f,
                    "invalid speed at index {}: {} (must be positive and finite)",
                    i, value
                ),
                None => write!(f, "invalid speed: {} (must be positive and finite)", value),
            },
            EikonalError::InvalidSlowness { index, value } => {
                write!(
                    f,
                    "invalid slowness at index {}: {} (must be positive and finite)",
                    index, value
                )
            }
            EikonalError::SpeedOutOfBounds { index } => {
                write!(f, "speed lookup outside speed grid: {:?}", index)
            }
            EikonalError::SeedMismatch { indices, distances } => {
                write!(
                    f,
                    "seed indices/distances size mismatch: {} indices, {} distances",
                    indices, distances
                )
            }
            EikonalError::SeedEmpty => write!(f, "empty seed list"),
            EikonalError::SeedOutOfBounds { index } => {
                write!(f, "seed index outside grid: {:?}", index)
            }
            EikonalError::SeedDuplicate { index } => {
                write!(f, "duplicate seed index: {:?}", index)
            }
            EikonalError::SeedDistanceRejected { distance } => {
                write!(f, "invalid seed distance: {}", distance)
            }
            EikonalError::WholeGridFrozen => write!(f, "whole grid frozen by seeds"),
            EikonalError::OpenComponent => {
                write!(
                    f,
                    "open connected component: component has a single dilation band"
                )
            }
            EikonalError::UnsolvableQuadratic => {
                write!(
                    f,
                    "unsolvable eikonal quadratic: negative discriminant or negative root"
                )
            }
            EikonalError::IncompleteMarch { unfrozen } => {
                write!(f, "incomplete march: {} cells left unfrozen", unfrozen)
            }
            EikonalError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            EikonalError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            EikonalError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            EikonalError::MatVariableNotFound {
                expected,
                available,
            } => {
                write!(
                    f,
                    "MAT variable '{}' not found; available variables: {:?}",
                    expected, available
                )
            }
            EikonalError::IoError(e) => write!(f, "I/O error: {}", e),
            EikonalError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EikonalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EikonalError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EikonalError {
    fn from(e: std::io::Error) -> Self {
        EikonalError::IoError(e)
    }
}

/// Convenience type alias for Results with EikonalError.
pub type Result<T> = std::result::Result<T, EikonalError>;
