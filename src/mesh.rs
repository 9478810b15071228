//! Mutable planar triangle complex.
//!
//! Triangles and their incident-cell lists reference each other, so the mesh
//! is an arena: cells are addressed by [`TriIdx`], points by [`PointId`], and
//! a `point -> cells` side table keeps the back references. Cell ids are
//! stable across in-place replacement; cells are never deleted, only
//! rewritten.
//!
//! The low-level edit operations ([`Mesh::replace_cell`],
//! [`Mesh::remove_reference`], [`Mesh::add_reference`]) deliberately split
//! the two sides of the incidence relation: the insertion and flip code
//! retires and adds exactly the references that change, which is cheaper
//! than rebuilding the lists of all three vertices per edit.

use std::fmt;

/// Index of a point. Input points come first; the eight bounding-ring points
/// occupy the indices at and above the input count.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub usize);

impl PointId {
  pub fn usize(self) -> usize {
    self.0
  }
}

impl From<PointId> for usize {
  fn from(id: PointId) -> usize {
    id.0
  }
}

impl fmt::Debug for PointId {
  fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
    write!(fmt, "v{}", self.0)
  }
}

/// Index of a triangle cell.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriIdx(pub usize);

impl fmt::Debug for TriIdx {
  fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
    write!(fmt, "t{}", self.0)
  }
}

/// Undirected edge between two point indices, stored normalized.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexEdge {
  pub min: PointId,
  pub max: PointId,
}

impl IndexEdge {
  pub fn new(a: PointId, b: PointId) -> IndexEdge {
    IndexEdge {
      min: std::cmp::min(a, b),
      max: std::cmp::max(a, b),
    }
  }
}

impl fmt::Debug for IndexEdge {
  fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
    fmt
      .debug_tuple("IndexEdge")
      .field(&self.min)
      .field(&self.max)
      .finish()
  }
}

#[derive(Debug, Clone)]
pub(crate) struct Mesh {
  cells: Vec<[PointId; 3]>,
  links: Vec<Vec<TriIdx>>,
}

impl Mesh {
  /// An empty mesh over `num_points` addressable points. `cells_hint` is the
  /// expected final cell count (roughly twice the point count for a planar
  /// Delaunay triangulation).
  pub fn with_capacity(num_points: usize, cells_hint: usize) -> Mesh {
    Mesh {
      cells: Vec::with_capacity(cells_hint),
      links: vec![Vec::new(); num_points],
    }
  }

  pub fn num_cells(&self) -> usize {
    self.cells.len()
  }

  pub fn cell_points(&self, t: TriIdx) -> [PointId; 3] {
    self.cells[t.0]
  }

  pub fn point_cells(&self, v: PointId) -> &[TriIdx] {
    &self.links[v.0]
  }

  /// The vertex of `t` that is on neither end of the edge `(a, b)`.
  pub fn opposite_vertex(&self, t: TriIdx, a: PointId, b: PointId) -> Option<PointId> {
    self.cells[t.0].iter().copied().find(|&v| v != a && v != b)
  }

  pub fn is_edge(&self, a: PointId, b: PointId) -> bool {
    self.links[a.0].iter().any(|&t| self.cells[t.0].contains(&b))
  }

  /// All cells sharing the edge `(a, b)`, except `exclude`. A manifold mesh
  /// yields zero or one entries when excluding a cell on the edge.
  pub fn cell_edge_neighbors(
    &self,
    exclude: Option<TriIdx>,
    a: PointId,
    b: PointId,
    out: &mut Vec<TriIdx>,
  ) {
    out.clear();
    for &t in &self.links[a.0] {
      if Some(t) != exclude && self.cells[t.0].contains(&b) {
        out.push(t);
      }
    }
  }

  /// First cell other than `t` sharing the edge `(a, b)`, or `None` on a
  /// boundary edge.
  pub fn edge_neighbor(&self, t: TriIdx, a: PointId, b: PointId) -> Option<TriIdx> {
    self
      .links[a.0]
      .iter()
      .copied()
      .find(|&c| c != t && self.cells[c.0].contains(&b))
  }

  /// Rewrites the vertices of `t` without touching the incidence lists; the
  /// caller retires and adds the references that changed.
  pub fn replace_cell(&mut self, t: TriIdx, pts: [PointId; 3]) {
    self.cells[t.0] = pts;
  }

  /// Appends a new cell and registers it with all three vertices.
  pub fn insert_linked_cell(&mut self, pts: [PointId; 3]) -> TriIdx {
    let t = TriIdx(self.cells.len());
    self.cells.push(pts);
    for p in pts {
      self.links[p.0].push(t);
    }
    t
  }

  /// Rewrites `t` and registers it with all three new vertices. The old
  /// references must already have been retired via
  /// [`Mesh::remove_cell_reference`].
  pub fn replace_linked_cell(&mut self, t: TriIdx, pts: [PointId; 3]) {
    self.cells[t.0] = pts;
    for p in pts {
      self.links[p.0].push(t);
    }
  }

  /// Retires the references from all three current vertices of `t`.
  pub fn remove_cell_reference(&mut self, t: TriIdx) {
    for p in self.cells[t.0] {
      self.remove_reference(p, t);
    }
  }

  pub fn remove_reference(&mut self, v: PointId, t: TriIdx) {
    let list = &mut self.links[v.0];
    if let Some(pos) = list.iter().position(|&c| c == t) {
      list.swap_remove(pos);
    }
  }

  pub fn add_reference(&mut self, v: PointId, t: TriIdx) {
    self.links[v.0].push(t);
  }

  /// Growth hint for a vertex about to gain `extra` incident cells.
  pub fn reserve_links(&mut self, v: PointId, extra: usize) {
    self.links[v.0].reserve(extra);
  }
}
