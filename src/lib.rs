//! 2D constrained Delaunay triangulation with alpha-shape filtering.
//!
//! Takes an unordered set of 3-space points (used as-is in the xy-plane, or
//! projected through an explicit or best-fitting plane), triangulates them
//! incrementally inside an eight-point bounding ring, optionally embeds
//! constraint polylines and classifies against constraint polygons, and
//! optionally filters the result down to its alpha shape.
//!
//! ```
//! use planar_delaunay::{triangulate, DelaunayOptions};
//!
//! let points = [
//!   [0.0, 0.0, 0.0],
//!   [1.0, 0.0, 0.0],
//!   [1.0, 1.0, 0.0],
//!   [0.0, 1.0, 0.0],
//! ];
//! let result = triangulate(&points, &DelaunayOptions::default());
//! assert_eq!(result.triangles.len(), 2);
//! assert_eq!(result.duplicate_points, 0);
//! ```
//!
//! The triangulator is floating-point throughout. Degenerate input does not
//! fail a run: duplicate points and unresolvable locations are skipped and
//! counted, constraint edges that cannot be embedded are reported through
//! [`Triangulation::unrecovered_edges`], and every warning goes through the
//! [`log`] facade.

mod config;
mod constraint;
pub mod geometry;
mod mesh;
mod projection;
mod triangulation;

pub use config::{DelaunayOptions, ProjectionPlaneMode};
pub use constraint::ConstraintSet;
pub use mesh::{IndexEdge, PointId};
pub use projection::PlaneTransform;
pub use triangulation::{triangulate, triangulate_with, Observer, Triangulation};
