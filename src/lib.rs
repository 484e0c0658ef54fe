// sweep-tess: sweep-line polygon tessellation on a half-edge mesh
// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! Tessellation of closed 2D contours into non-overlapping polygons.
//!
//! Contours may self-intersect and nest. Which parts are filled is decided
//! by a [`FillRule`] over winding numbers; the output is a
//! [`Tessellation`] of triangles, monotone or convex polygons, or boundary
//! loops, depending on the [`OutputKind`].
//!
//! Arithmetic runs on `f32` by default, or on 16.16 fixed point with the
//! `fixed-point` feature. See [`Real`].

pub mod active_region;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod pool;
pub mod priorityq;
pub mod scalar;
mod sweep;
pub mod tess;
pub mod vector;

pub use crate::error::{MeshError, PoolError, TessError, TessResult, VectorError};
pub use crate::scalar::{Real, Scalar};
pub use crate::tess::{
    Bounds, FillRule, OutputKind, Polygons, TessOptions, Tessellation, Tessellator, Triangles,
};
pub use crate::vector::{point, Point, RotateDirection, Vector};
