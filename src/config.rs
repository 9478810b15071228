//! Triangulation configuration.

use crate::projection::PlaneTransform;

/// How input points are mapped onto the triangulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionPlaneMode {
  /// Use the x and y coordinates as-is; z is carried through untouched.
  #[default]
  Xy,
  /// Compute a least-squares plane through the input and triangulate in its
  /// frame. Ignored when an explicit transform is supplied.
  BestFittingPlane,
}

/// Options controlling a triangulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct DelaunayOptions {
  /// Circumradius cutoff for the alpha-shape filter; `0.0` disables it.
  pub alpha: f64,
  /// Multiplier on the input diagonal for edge-proximity and duplicate
  /// detection.
  pub tolerance: f64,
  /// Bounding-ring radius as a multiple of the input diagonal.
  pub offset: f64,
  /// Keep the triangles incident to the bounding ring in the output. Only
  /// honored when no projection transform is in play; otherwise the ring
  /// points cannot appear in the output point set.
  pub bounding_triangulation: bool,
  /// Visit input points in a reproducible pseudo-shuffled order instead of
  /// natural order. Avoids pathological walk costs on spatially sorted
  /// input.
  pub random_point_insertion: bool,
  pub projection_plane_mode: ProjectionPlaneMode,
  /// Explicit plane transform; wins over
  /// [`ProjectionPlaneMode::BestFittingPlane`].
  pub transform: Option<PlaneTransform>,
}

impl Default for DelaunayOptions {
  fn default() -> DelaunayOptions {
    DelaunayOptions {
      alpha: 0.0,
      tolerance: 1e-5,
      offset: 1.0,
      bounding_triangulation: false,
      random_point_insertion: false,
      projection_plane_mode: ProjectionPlaneMode::Xy,
      transform: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let opts = DelaunayOptions::default();
    assert_eq!(opts.alpha, 0.0);
    assert_eq!(opts.tolerance, 1e-5);
    assert_eq!(opts.offset, 1.0);
    assert!(!opts.bounding_triangulation);
    assert!(!opts.random_point_insertion);
    assert_eq!(opts.projection_plane_mode, ProjectionPlaneMode::Xy);
    assert!(opts.transform.is_none());
  }
}
