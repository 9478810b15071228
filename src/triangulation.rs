//! The triangulation driver.
//!
//! Pipeline: project the input onto the triangulation plane, bootstrap a
//! bounding-ring mesh, insert every input point incrementally, recover
//! constraint edges, classify triangles against constraint polygons, apply
//! the alpha filter, then assemble the output.

mod alpha;
mod fill;
mod insert;
mod recover;

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::config::{DelaunayOptions, ProjectionPlaneMode};
use crate::constraint::ConstraintSet;
use crate::geometry::{dot3, triangle_normal};
use crate::mesh::{Mesh, PointId, TriIdx};
use crate::projection::PlaneTransform;

/// Number of auxiliary points on the bounding ring.
const RING_POINTS: usize = 8;

/// How often the insertion loop reports progress and polls the abort flag.
const POLL_INTERVAL: usize = 1000;

/// Cooperative hooks into a triangulation run.
///
/// `abort` is polled every 1000 points; once it reads `true` the inserter
/// stops cleanly and the partial mesh flows through the remaining stages.
/// `progress` receives the fraction of points inserted.
#[derive(Default)]
pub struct Observer<'a> {
  pub abort: Option<&'a AtomicBool>,
  pub progress: Option<&'a mut dyn FnMut(f64)>,
}

/// Result of a triangulation run.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
  /// Output point coordinates. Equal to the input points, except when the
  /// bounding triangulation is kept (and no transform applied), in which
  /// case the eight ring points follow the input points.
  pub points: Vec<[f64; 3]>,
  /// Surviving triangles as indices into `points`.
  pub triangles: Vec<[PointId; 3]>,
  /// Edges salvaged by the alpha filter from removed triangles.
  pub lines: Vec<[PointId; 2]>,
  /// Points left unconnected by the alpha filter.
  pub vertices: Vec<PointId>,
  /// Input points skipped because they coincide with an earlier point.
  pub duplicate_points: usize,
  /// Points skipped because location failed to resolve.
  pub degeneracies: usize,
  /// Constraint edges that could not be embedded in the mesh.
  pub unrecovered_edges: usize,
  /// The projection applied to the input, if any.
  pub transform: Option<PlaneTransform>,
}

/// Triangulates a point set with default collaborators: no constraints, no
/// cancellation, no progress reporting.
pub fn triangulate(points: &[[f64; 3]], options: &DelaunayOptions) -> Triangulation {
  triangulate_with(points, options, None, &mut Observer::default())
}

/// Triangulates a point set, optionally embedding constraint edges and
/// classifying against constraint polygons.
///
/// Fewer than three input points produce an empty (but successful) result.
/// Degenerate input (duplicate points, unresolvable locations, constraint
/// edges that cannot be recovered) is skipped, counted, and logged; it
/// never fails the run.
pub fn triangulate_with(
  points: &[[f64; 3]],
  options: &DelaunayOptions,
  constraints: Option<&ConstraintSet>,
  observer: &mut Observer<'_>,
) -> Triangulation {
  let n = points.len();
  if n < 3 {
    debug!("fewer than 3 input points; emitting an empty triangulation");
    return Triangulation {
      points: points.to_vec(),
      ..Triangulation::default()
    };
  }

  // Projection onto the triangulation plane.
  let transform = match (options.transform, options.projection_plane_mode) {
    (Some(t), ProjectionPlaneMode::BestFittingPlane) => {
      warn!("an explicit transform is set; ignoring the best-fitting-plane mode");
      Some(t)
    }
    (Some(t), ProjectionPlaneMode::Xy) => Some(t),
    (None, ProjectionPlaneMode::BestFittingPlane) => {
      Some(PlaneTransform::best_fitting_plane(points))
    }
    (None, ProjectionPlaneMode::Xy) => None,
  };
  let working: Vec<[f64; 3]> = match &transform {
    Some(t) => points.iter().map(|p| t.apply(p)).collect(),
    None => points.to_vec(),
  };

  let bounding = if options.bounding_triangulation && transform.is_some() {
    warn!("bounding triangulation cannot retain ring points under a projection transform; dropping them");
    false
  } else {
    options.bounding_triangulation
  };

  // Bounds of the projected input; the ring is placed around their center.
  let mut lo = working[0];
  let mut hi = working[0];
  for p in &working {
    for i in 0..3 {
      lo[i] = lo[i].min(p[i]);
      hi[i] = hi[i].max(p[i]);
    }
  }
  let center = [
    (lo[0] + hi[0]) / 2.0,
    (lo[1] + hi[1]) / 2.0,
    (lo[2] + hi[2]) / 2.0,
  ];
  let length = ((hi[0] - lo[0]).powi(2) + (hi[1] - lo[1]).powi(2) + (hi[2] - lo[2]).powi(2)).sqrt();
  let tol = length * options.tolerance;
  let radius = options.offset * length;

  let mut run = Triangulator::new(&working, center, radius, tol, options.alpha);

  // Insert every input point. The permuted order breaks up spatial locality
  // without a random source, and visits each index exactly once.
  let (step, offset) = if options.random_point_insertion {
    (coprime_step(n), n / 2)
  } else {
    (1, 0)
  };
  let mut aborted = false;
  for k in 0..n {
    if k % POLL_INTERVAL == 0 {
      if let Some(progress) = observer.progress.as_mut() {
        progress(k as f64 / n as f64);
      }
      if observer.abort.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
        debug!("triangulation aborted after {} of {} points", k, n);
        aborted = true;
        break;
      }
    }
    let pt = ((step as u128 * k as u128 + offset as u128) % n as u128) as usize;
    run.insert_point(PointId(pt));
  }
  if let Some(progress) = observer.progress.as_mut() {
    progress(1.0);
  }

  if let Some(cs) = constraints {
    if !aborted {
      run.recover_constraints(cs);
    }
  }

  // Classification: 1 = keep, 0 = discard, -1 = tentatively inside (used by
  // the polygon fill only).
  let ncells = run.mesh.num_cells();
  let mut tri_use: Vec<i8> = vec![1; ncells];
  if !bounding {
    for r in 0..RING_POINTS {
      for &c in run.mesh.point_cells(PointId(n + r)) {
        tri_use[c.0] = 0;
      }
    }
  }

  if let Some(cs) = constraints {
    if !aborted && cs.has_polygons() {
      run.fill_polygons(cs, &mut tri_use);
    }
  }

  let (lines, vertices) = if options.alpha > 0.0 {
    run.apply_alpha(bounding, &mut tri_use)
  } else {
    (Vec::new(), Vec::new())
  };

  if options.alpha <= 0.0 && !bounding && constraints.is_none() {
    run.rescue_orphans(&mut tri_use);
  }

  let triangles = (0..ncells)
    .filter(|&i| tri_use[i] == 1)
    .map(|i| run.mesh.cell_points(TriIdx(i)))
    .collect();
  let out_points = if bounding {
    run.points
  } else {
    points.to_vec()
  };

  Triangulation {
    points: out_points,
    triangles,
    lines,
    vertices,
    duplicate_points: run.duplicate_points,
    degeneracies: run.degeneracies,
    unrecovered_edges: run.unrecovered_edges,
    transform,
  }
}

/// Working state of one triangulation run.
pub(crate) struct Triangulator {
  /// Projected input points followed by the eight ring points.
  points: Vec<[f64; 3]>,
  n_input: usize,
  mesh: Mesh,
  /// Edge-proximity and duplicate threshold, `length * tolerance factor`.
  tol: f64,
  alpha: f64,
  /// Circumcircles above this are numerically meaningless near the ring.
  bounding_radius2: f64,
  /// Walk start: the cell touched by the last successful insertion.
  current: TriIdx,
  duplicate_points: usize,
  degeneracies: usize,
  unrecovered_edges: usize,
}

impl Triangulator {
  fn new(
    projected: &[[f64; 3]],
    center: [f64; 3],
    radius: f64,
    tol: f64,
    alpha: f64,
  ) -> Triangulator {
    let n = projected.len();
    let mut points = Vec::with_capacity(n + RING_POINTS);
    points.extend_from_slice(projected);
    for i in 0..RING_POINTS {
      let angle = i as f64 * std::f64::consts::FRAC_PI_4;
      points.push([
        center[0] + radius * angle.cos(),
        center[1] + radius * angle.sin(),
        center[2],
      ]);
    }

    // Fan the ring octagon into six seed triangles.
    let mut mesh = Mesh::with_capacity(n + RING_POINTS, 2 * n + RING_POINTS);
    for i in 1..RING_POINTS - 1 {
      mesh.insert_linked_cell([PointId(n), PointId(n + i), PointId(n + i + 1)]);
    }

    Triangulator {
      points,
      n_input: n,
      mesh,
      tol,
      alpha,
      bounding_radius2: 4.0 * radius * radius,
      current: TriIdx(0),
      duplicate_points: 0,
      degeneracies: 0,
      unrecovered_edges: 0,
    }
  }

  /// Reconnects input points that lost every incident triangle to the
  /// ring-dropping pass.
  ///
  /// Such a point sits in a sliver between the hull of its neighbors and the
  /// ring: every triangle around it touches a ring point. Swapping the far
  /// diagonal of one of those triangles against its neighbor re-attaches the
  /// point, at the cost of a locally non-Delaunay edge. Only runs when
  /// nothing else (alpha, constraints, kept ring) gives the point a home.
  fn rescue_orphans(&mut self, tri_use: &mut [i8]) {
    let n = self.n_input;
    for pt in 0..n {
      let pid = PointId(pt);
      let cells = self.mesh.point_cells(pid).to_vec();
      if cells.is_empty() || cells.iter().any(|c| tri_use[c.0] == 1) {
        continue;
      }
      for &tri1 in &cells {
        let pts = self.mesh.cell_points(tri1);
        let Some(j) = pts.iter().position(|&p| p == pid) else {
          continue;
        };
        // Far edge of this triangle, in cyclic order after the point.
        let p1 = pts[(j + 1) % 3];
        let p2 = pts[(j + 2) % 3];
        if p1.0 >= n || p2.0 >= n {
          continue;
        }
        let Some(nei) = self.mesh.edge_neighbor(tri1, p1, p2) else {
          continue;
        };
        let Some(p3) = self.mesh.opposite_vertex(nei, p1, p2) else {
          continue;
        };
        if p3.0 >= n {
          continue;
        }
        // Swap only if the two candidate triangles agree on orientation,
        // i.e. the quad (pt, p1, p3, p2) is convex.
        let x = self.points[pt];
        let n1 = triangle_normal(x, self.points[p1.0], self.points[p3.0]);
        let n2 = triangle_normal(x, self.points[p3.0], self.points[p2.0]);
        if dot3(n1, n2) < 0.0 {
          continue;
        }
        self.mesh.remove_reference(p2, tri1);
        self.mesh.remove_reference(p1, nei);
        self.mesh.add_reference(p3, tri1);
        self.mesh.add_reference(pid, nei);
        self.mesh.replace_cell(tri1, [pid, p1, p3]);
        self.mesh.replace_cell(nei, [pid, p3, p2]);
        tri_use[tri1.0] = 1;
        tri_use[nei.0] = 1;
        break;
      }
    }
  }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
  while b != 0 {
    let t = a % b;
    a = b;
    b = t;
  }
  a
}

/// Smallest step at or above `n / 2 + 1` that is coprime with `n`, so that
/// `(step * k + n / 2) % n` enumerates `0..n` exactly once.
fn coprime_step(n: usize) -> usize {
  let mut p = n / 2 + 1;
  while gcd(p, n) != 1 {
    p += 1;
  }
  p
}
