// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Error types shared by the pool, mesh, vector and tessellator layers.

use thiserror::Error;

/// A pool could not provide another slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool allocation failed with {0} slots in use")]
    OutOfMemory(usize),
}

/// Failure of a mesh edit. Every Euler operator allocates, so exhaustion is
/// the only recoverable failure; topological misuse panics instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh storage exhausted: {0}")]
    OutOfMemory(#[from] PoolError),
}

/// Failure of a vector operation. The vector is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum VectorError {
    #[error("invalid target length: {0}")]
    InvalidLength(f64),
    #[error("vector ({x}, {y}) has no usable length")]
    Degenerate { x: f64, y: f64 },
    #[error("scale {length} / {current} underflows and no wide fallback is available")]
    ScaleUnderflow { length: f64, current: f64 },
}

/// The tessellator's error enumeration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TessError {
    #[error("contour {contour}, point {index}: coordinate ({x}, {y}) is not finite")]
    NonFiniteCoordinate {
        contour: usize,
        index: usize,
        x: f64,
        y: f64,
    },
    #[error("contour {contour}, point {index}: coordinate ({x}, {y}) exceeds +/-{limit}")]
    CoordinateOutOfRange {
        contour: usize,
        index: usize,
        x: f64,
        y: f64,
        limit: f64,
    },
    #[error("bounds hint is empty or not finite")]
    InvalidBounds,
    #[error("contour {contour}: input point indices exceed u32")]
    TooManyPoints { contour: usize },
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl From<PoolError> for TessError {
    fn from(err: PoolError) -> Self {
        TessError::Mesh(MeshError::OutOfMemory(err))
    }
}

pub type TessResult<T> = Result<T, TessError>;
