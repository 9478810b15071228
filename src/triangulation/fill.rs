//! Interior/exterior classification against constraint polygons.

use log::warn;

use crate::constraint::{ring_edges, ConstraintSet};
use crate::geometry::dot2;
use crate::mesh::{IndexEdge, TriIdx};

use super::Triangulator;

impl Triangulator {
  /// Flood-fills the outside mark from each polygon boundary.
  ///
  /// For every polygon edge, the incident triangle on the outward side is
  /// marked discarded (0) and the one on the inward side tentatively kept
  /// (-1). The discard mark then floods across every edge that is not a
  /// constraint, claiming all still-unvisited (1) triangles. Whatever is
  /// left tentative after all polygons is inside.
  ///
  /// A polygon with an unrecovered edge cannot separate inside from outside
  /// and is skipped whole.
  pub(crate) fn fill_polygons(&mut self, constraints: &ConstraintSet, tri_use: &mut [i8]) {
    let constraint_edges = constraints.edge_set();
    let mut nbrs = Vec::new();

    for ring in constraints.polygons() {
      if ring.len() < 3 {
        continue;
      }
      if let Some((a, b)) = ring_edges(ring).find(|&(a, b)| !self.mesh.is_edge(a, b)) {
        warn!(
          "polygon edge ({:?}, {:?}) is missing from the mesh; interior classification for this polygon is skipped",
          a, b
        );
        continue;
      }

      for (p1, p2) in ring_edges(ring) {
        let x1 = self.points[p1.0];
        let x2 = self.points[p2.0];
        // Outward side of the edge: its vector crossed with +z.
        let outside = [x2[1] - x1[1], -(x2[0] - x1[0])];
        self.mesh.cell_edge_neighbors(None, p1, p2, &mut nbrs);
        for &nei in &nbrs {
          let Some(p3) = self.mesh.opposite_vertex(nei, p1, p2) else {
            continue;
          };
          let x3 = self.points[p3.0];
          let out = dot2(outside, [x3[0] - x1[0], x3[1] - x1[1]]) > 0.0;
          tri_use[nei.0] = if out { 0 } else { -1 };
        }
      }

      // Flood the outside mark; tentative (-1) cells block it.
      let mut stack: Vec<TriIdx> = (0..tri_use.len())
        .filter(|&i| tri_use[i] == 0)
        .map(TriIdx)
        .collect();
      while let Some(t) = stack.pop() {
        let pts = self.mesh.cell_points(t);
        for j in 0..3 {
          let a = pts[j];
          let b = pts[(j + 1) % 3];
          if constraint_edges.contains(&IndexEdge::new(a, b)) {
            continue;
          }
          self.mesh.cell_edge_neighbors(Some(t), a, b, &mut nbrs);
          for &nb in &nbrs {
            if tri_use[nb.0] == 1 {
              tri_use[nb.0] = 0;
              stack.push(nb);
            }
          }
        }
      }
    }

    for mark in tri_use.iter_mut() {
      if *mark == -1 {
        *mark = 1;
      }
    }
  }
}
