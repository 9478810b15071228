//! Constraint input: polylines whose edges must appear in the triangulation,
//! and polygons which additionally classify triangles as inside or outside.

use std::collections::HashSet;

use crate::mesh::{IndexEdge, PointId};

/// Indexed constraint polylines and polygons over the input point set.
///
/// Indices refer to the same point array passed to
/// [`triangulate_with`](crate::triangulate_with). Polygons are implicitly
/// closed; the first polygon is the outer boundary, later ones carve holes.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
  polylines: Vec<Vec<PointId>>,
  polygons: Vec<Vec<PointId>>,
}

impl ConstraintSet {
  pub fn new() -> ConstraintSet {
    ConstraintSet::default()
  }

  pub fn add_polyline<I>(&mut self, ids: I)
  where
    I: IntoIterator<Item = usize>,
  {
    self.polylines.push(ids.into_iter().map(PointId).collect());
  }

  pub fn add_polygon<I>(&mut self, ids: I)
  where
    I: IntoIterator<Item = usize>,
  {
    self.polygons.push(ids.into_iter().map(PointId).collect());
  }

  pub fn is_empty(&self) -> bool {
    self.polylines.is_empty() && self.polygons.is_empty()
  }

  pub(crate) fn has_polygons(&self) -> bool {
    self.polygons.iter().any(|ring| ring.len() >= 3)
  }

  pub(crate) fn polygons(&self) -> &[Vec<PointId>] {
    &self.polygons
  }

  /// Every constraint edge: consecutive polyline pairs plus the closed rings
  /// of each polygon.
  pub(crate) fn edges(&self) -> Vec<(PointId, PointId)> {
    let mut out = Vec::new();
    for line in &self.polylines {
      for pair in line.windows(2) {
        out.push((pair[0], pair[1]));
      }
    }
    for ring in &self.polygons {
      out.extend(ring_edges(ring));
    }
    out
  }

  /// The undirected edge set, used to stop the polygon flood fill.
  pub(crate) fn edge_set(&self) -> HashSet<IndexEdge> {
    self
      .edges()
      .into_iter()
      .map(|(a, b)| IndexEdge::new(a, b))
      .collect()
  }
}

/// Consecutive pairs of a closed ring, wrapping around at the end.
pub(crate) fn ring_edges(ring: &[PointId]) -> impl Iterator<Item = (PointId, PointId)> + '_ {
  (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn polyline_edges_are_open() {
    let mut cs = ConstraintSet::new();
    cs.add_polyline([0, 1, 2]);
    assert_eq!(
      cs.edges(),
      vec![(PointId(0), PointId(1)), (PointId(1), PointId(2))]
    );
  }

  #[test]
  fn polygon_edges_wrap() {
    let mut cs = ConstraintSet::new();
    cs.add_polygon([0, 1, 2]);
    let edges = cs.edges();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[2], (PointId(2), PointId(0)));
  }

  #[test]
  fn edge_set_is_undirected() {
    let mut cs = ConstraintSet::new();
    cs.add_polyline([3, 1]);
    let set = cs.edge_set();
    assert!(set.contains(&IndexEdge::new(PointId(1), PointId(3))));
  }
}
