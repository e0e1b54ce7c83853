//! Arbitrary clip shapes.

/// How the vertices of a [`Silhouette`] form triangles.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Topology {
  /// Every three vertices form a triangle.
  Triangles,
  /// Every vertex forms a triangle with the two previous ones.
  TriangleStrip,
  /// Every vertex forms a triangle with the previous one and the first one.
  TriangleFan,
}

/// Immutable 2D geometry in model space, used as a clip shape.
///
/// Overlapping triangles are combined with even-odd semantics: a point is inside the silhouette
/// if it is covered an odd number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct Silhouette {
  vertices: Vec<[f32; 2]>,
  topology: Topology,
}

impl Silhouette {
  pub fn new(vertices: Vec<[f32; 2]>, topology: Topology) -> Self {
    Silhouette { vertices, topology }
  }

  pub fn vertices(&self) -> &[[f32; 2]] {
    &self.vertices
  }

  pub fn topology(&self) -> Topology {
    self.topology
  }

  /// Bounding box as `[x0, y0, x1, y1]`, or `None` without vertices.
  pub fn bounds(&self) -> Option<[f32; 4]> {
    let (first, rest) = self.vertices.split_first()?;

    Some(rest.iter().fold(
      [first[0], first[1], first[0], first[1]],
      |[x0, y0, x1, y1], [x, y]| [x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y)],
    ))
  }
}
