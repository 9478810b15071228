//! Constraint edge recovery.
//!
//! A constraint edge that the Delaunay triangulation did not produce is
//! carved in by hand: march across the triangles the edge would cross (its
//! "influence region"), split the region boundary into the chains left and
//! right of the edge, retriangulate each chain, and swap the new triangles
//! in for the crossed ones. Every failure mode is detected before the first
//! mesh edit, so a failed recovery leaves the mesh untouched.

use std::collections::HashSet;

use log::warn;
use thiserror::Error;

use crate::constraint::ConstraintSet;
use crate::geometry::{cross2, dot2, normalize2, point_in_triangle};
use crate::mesh::{IndexEdge, PointId};

use super::Triangulator;

#[derive(Debug, Error)]
pub(crate) enum RecoverError {
  #[error("constraint endpoints are coincident")]
  CoincidentEndpoints,
  #[error("no triangle at the start vertex crosses toward the end vertex")]
  NoStartingTriangle,
  #[error("non-manifold edge inside the influence region")]
  NonManifoldEdge,
  #[error("influence region does not close at the end vertex")]
  RegionNotClosed,
  #[error("influence chain could not be triangulated")]
  ChainTriangulation,
  #[error("replacement triangle count does not match the region")]
  CountMismatch,
}

impl Triangulator {
  /// Embeds every constraint edge that the triangulation is missing.
  /// Failures are logged and counted; the mesh is left unchanged for the
  /// affected edge.
  pub(crate) fn recover_constraints(&mut self, constraints: &ConstraintSet) {
    let n = self.n_input;
    for (a, b) in constraints.edges() {
      if a.0 >= n || b.0 >= n || a == b {
        warn!("constraint edge ({:?}, {:?}) does not name two distinct input points", a, b);
        self.unrecovered_edges += 1;
        continue;
      }
      if self.mesh.is_edge(a, b) {
        continue;
      }
      if let Err(err) = self.recover_edge(a, b) {
        warn!("constraint edge ({:?}, {:?}) not recovered: {}", a, b, err);
        self.unrecovered_edges += 1;
      }
    }
  }

  fn recover_edge(&mut self, p1: PointId, p2: PointId) -> Result<(), RecoverError> {
    let x1 = self.points[p1.0];
    let x2 = self.points[p2.0];

    // Vertical split plane containing the edge; its 2D normal separates the
    // left chain (positive side) from the right chain.
    let mut split = [-(x2[1] - x1[1]), x2[0] - x1[0]];
    if normalize2(&mut split) <= self.tol {
      return Err(RecoverError::CoincidentEndpoints);
    }
    let dir = [x2[0] - x1[0], x2[1] - x1[1]];
    let side = |points: &[[f64; 3]], p: PointId| {
      let x = points[p.0];
      dot2(split, [x[0] - x1[0], x[1] - x1[1]])
    };

    // Starting triangle: incident to p1, cut by the split plane, and cut on
    // the p2 side of p1.
    let mut start = None;
    for &t in self.mesh.point_cells(p1) {
      let pts = self.mesh.cell_points(t);
      let Some(j) = pts.iter().position(|&p| p == p1) else {
        continue;
      };
      let va = pts[(j + 1) % 3];
      let vb = pts[(j + 2) % 3];
      let da = side(&self.points, va);
      let db = side(&self.points, vb);
      if da * db >= 0.0 {
        continue;
      }
      // Where the far edge crosses the constraint line, relative to p1.
      let xa = self.points[va.0];
      let xb = self.points[vb.0];
      let s = da / (da - db);
      let cx = [xa[0] + s * (xb[0] - xa[0]), xa[1] + s * (xb[1] - xa[1])];
      if dot2(dir, [cx[0] - x1[0], cx[1] - x1[1]]) <= 0.0 {
        continue;
      }
      start = Some(if da > 0.0 { (t, va, vb) } else { (t, vb, va) });
      break;
    }
    let Some((t0, mut pos, mut neg)) = start else {
      return Err(RecoverError::NoStartingTriangle);
    };

    // March across edge-adjacent triangles toward p2, splitting the far
    // vertices onto the chains by their side of the split plane.
    let mut region = vec![t0];
    let mut left = vec![p1, pos];
    let mut right = vec![p1, neg];
    let mut current = t0;
    let mut nbrs = Vec::new();
    let limit = self.mesh.num_cells();
    loop {
      if region.len() > limit {
        return Err(RecoverError::RegionNotClosed);
      }
      self.mesh.cell_edge_neighbors(Some(current), pos, neg, &mut nbrs);
      if nbrs.len() != 1 {
        return Err(RecoverError::NonManifoldEdge);
      }
      let next = nbrs[0];
      region.push(next);
      let Some(v3) = self.mesh.opposite_vertex(next, pos, neg) else {
        return Err(RecoverError::NonManifoldEdge);
      };
      if v3 == p2 {
        left.push(p2);
        right.push(p2);
        break;
      }
      if side(&self.points, v3) > 0.0 {
        left.push(v3);
        pos = v3;
      } else {
        right.push(v3);
        neg = v3;
      }
      current = next;
    }

    // Retriangulate both chains before touching the mesh.
    let left_tris = self
      .triangulate_chain(&left)
      .ok_or(RecoverError::ChainTriangulation)?;
    let right_tris = self
      .triangulate_chain(&right)
      .ok_or(RecoverError::ChainTriangulation)?;
    if left_tris.len() + right_tris.len() != region.len() {
      return Err(RecoverError::CountMismatch);
    }

    // Swap the replacement triangles in for the crossed ones.
    for (i, &t) in region.iter().enumerate() {
      let nodes = if i < left_tris.len() {
        left_tris[i]
      } else {
        right_tris[i - left_tris.len()]
      };
      self.mesh.remove_cell_reference(t);
      self.mesh.replace_linked_cell(t, nodes);
    }

    // One bounded flip pass over the interior edges of the replacements.
    // The first flip invalidates the gathered cell/vertex pairs, so stop
    // there; the suspects would have to be rediscovered.
    let mut boundary: HashSet<IndexEdge> = HashSet::new();
    for chain in [&left, &right] {
      for pair in chain.windows(2) {
        boundary.insert(IndexEdge::new(pair[0], pair[1]));
      }
    }
    boundary.insert(IndexEdge::new(p1, p2));
    'suspects: for &t in &region {
      let pts = self.mesh.cell_points(t);
      for j in 0..3 {
        let a = pts[j];
        let b = pts[(j + 1) % 3];
        if boundary.contains(&IndexEdge::new(a, b)) {
          continue;
        }
        let c = pts[(j + 2) % 3];
        let xc = self.points[c.0];
        if self.check_edge(c, xc, a, b, t, false, 1) {
          break 'suspects;
        }
      }
    }
    Ok(())
  }

  /// Ear-clips a chain polygon (the constraint edge closes it) into
  /// `chain.len() - 2` triangles. Returns `None` if the chain is too short
  /// or degenerate enough that no ear exists.
  fn triangulate_chain(&self, chain: &[PointId]) -> Option<Vec<[PointId; 3]>> {
    if chain.len() < 3 {
      return None;
    }
    // Work in counter-clockwise order.
    let mut area2 = 0.0;
    for i in 0..chain.len() {
      let p = self.points[chain[i].0];
      let q = self.points[chain[(i + 1) % chain.len()].0];
      area2 += cross2([p[0], p[1]], [q[0], q[1]]);
    }
    let mut ids: Vec<PointId> = chain.to_vec();
    if area2 < 0.0 {
      ids.reverse();
    }

    let mut tris = Vec::with_capacity(ids.len() - 2);
    'clip: while ids.len() > 3 {
      let m = ids.len();
      for i in 0..m {
        let a = ids[(i + m - 1) % m];
        let b = ids[i];
        let c = ids[(i + 1) % m];
        let xa = self.points[a.0];
        let xb = self.points[b.0];
        let xc = self.points[c.0];
        if cross2([xb[0] - xa[0], xb[1] - xa[1]], [xc[0] - xb[0], xc[1] - xb[1]]) <= 0.0 {
          continue;
        }
        let blocked = ids.iter().any(|&q| {
          q != a && q != b && q != c && point_in_triangle(self.points[q.0], xa, xb, xc, 0.0)
        });
        if blocked {
          continue;
        }
        tris.push([a, b, c]);
        ids.remove(i);
        continue 'clip;
      }
      return None;
    }
    let xa = self.points[ids[0].0];
    let xb = self.points[ids[1].0];
    let xc = self.points[ids[2].0];
    if cross2([xb[0] - xa[0], xb[1] - xa[1]], [xc[0] - xb[0], xc[1] - xb[1]]) <= 0.0 {
      return None;
    }
    tris.push([ids[0], ids[1], ids[2]]);
    Some(tris)
  }
}
