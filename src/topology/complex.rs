//! Simplicial Complexes: Vertices, Edges and Triangles
//!
//! A complex is stored per dimension. Each simplex knows its boundary as
//! indices into the dimension below, and the complex derives the inverse
//! relation (the coboundary) once at construction:
//!
//! - vertex `v` → edges containing `v`
//! - edge `e` → triangles containing `e`
//!
//! Vertex positions are the rows of an `Array2<f64>`; the position of any
//! higher simplex is the mean of its vertices.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, VineyardError};

/// Highest simplex dimension the core handles (triangles).
pub const MAX_DIM: usize = 2;

/// Unique identifier of a simplex: its dimension plus its index within
/// that dimension. Ordered by `(dim, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimplexId {
    pub dim: usize,
    pub index: usize,
}

impl SimplexId {
    pub fn new(dim: usize, index: usize) -> Self {
        Self { dim, index }
    }

    pub fn vertex(index: usize) -> Self {
        Self::new(0, index)
    }

    pub fn edge(index: usize) -> Self {
        Self::new(1, index)
    }

    pub fn triangle(index: usize) -> Self {
        Self::new(2, index)
    }
}

impl std::fmt::Display for SimplexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.dim {
            0 => "v",
            1 => "e",
            2 => "t",
            _ => "s",
        };
        write!(f, "{}{}", tag, self.index)
    }
}

/// A simplex with its faces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplex {
    pub dim: usize,
    /// Position within its dimension
    pub index: usize,
    /// Indices of the faces (dimension `dim - 1`); empty for vertices
    pub boundary: Vec<usize>,
}

impl Simplex {
    pub fn id(&self) -> SimplexId {
        SimplexId::new(self.dim, self.index)
    }
}

/// A validated simplicial complex of dimension at most two
#[derive(Debug, Clone)]
pub struct Complex {
    /// Vertex positions, one row per vertex
    points: Array2<f64>,
    /// Simplices per dimension; index == position
    simplices: [Vec<Simplex>; MAX_DIM + 1],
    /// `coboundary[d][i]`: indices of the (d+1)-simplices having simplex
    /// `(d, i)` as a face
    coboundary: [Vec<Vec<usize>>; MAX_DIM],
}

impl Complex {
    /// Build a complex from vertex positions, edges given by vertex pairs and
    /// triangles given by edge triples.
    pub fn new(
        points: Array2<f64>,
        edges: &[[usize; 2]],
        triangles: &[[usize; 3]],
    ) -> Result<Self> {
        let n_vertices = points.nrows();

        let vertices: Vec<Simplex> = (0..n_vertices)
            .map(|index| Simplex { dim: 0, index, boundary: Vec::new() })
            .collect();

        let mut seen_edges: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edge_list = Vec::with_capacity(edges.len());
        for (index, &[a, b]) in edges.iter().enumerate() {
            if a >= n_vertices || b >= n_vertices {
                return Err(VineyardError::MalformedComplex(format!(
                    "edge {} refers to vertex {} but there are {} vertices",
                    index,
                    a.max(b),
                    n_vertices
                )));
            }
            if a == b {
                return Err(VineyardError::MalformedComplex(format!(
                    "edge {} is a loop at vertex {}",
                    index, a
                )));
            }
            if let Some(previous) = seen_edges.insert((a.min(b), a.max(b)), index) {
                return Err(VineyardError::MalformedComplex(format!(
                    "edges {} and {} join the same vertices",
                    previous, index
                )));
            }
            edge_list.push(Simplex { dim: 1, index, boundary: vec![a, b] });
        }

        let mut triangle_list = Vec::with_capacity(triangles.len());
        for (index, face) in triangles.iter().enumerate() {
            Self::validate_triangle(index, face, &edge_list)?;
            triangle_list.push(Simplex { dim: 2, index, boundary: face.to_vec() });
        }

        let mut coboundary = [vec![Vec::new(); n_vertices], vec![Vec::new(); edge_list.len()]];
        for edge in &edge_list {
            for &v in &edge.boundary {
                coboundary[0][v].push(edge.index);
            }
        }
        for triangle in &triangle_list {
            for &e in &triangle.boundary {
                coboundary[1][e].push(triangle.index);
            }
        }

        Ok(Self {
            points,
            simplices: [vertices, edge_list, triangle_list],
            coboundary,
        })
    }

    /// Build a complex from vertex positions and triangles given by vertex
    /// triples. Edges are derived from the triangles in first-seen order.
    pub fn from_triangles(points: Array2<f64>, faces: &[[usize; 3]]) -> Result<Self> {
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<[usize; 2]> = Vec::new();
        let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(faces.len());

        for (t, &[a, b, c]) in faces.iter().enumerate() {
            if a == b || b == c || a == c {
                return Err(VineyardError::MalformedComplex(format!(
                    "face {} repeats a vertex",
                    t
                )));
            }
            let mut face = [0usize; 3];
            for (slot, (u, w)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
                let key = (u.min(w), u.max(w));
                let e = *edge_index.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edges.len() - 1
                });
                face[slot] = e;
            }
            triangles.push(face);
        }

        Self::new(points, &edges, &triangles)
    }

    /// A closed polygon: vertex `i` is joined to vertex `i + 1 (mod n)`.
    pub fn cycle(points: Array2<f64>) -> Result<Self> {
        let n = points.nrows();
        if n < 3 {
            return Err(VineyardError::MalformedComplex(format!(
                "a cycle needs at least 3 vertices, got {}",
                n
            )));
        }
        let edges: Vec<[usize; 2]> = (0..n).map(|i| [i, (i + 1) % n]).collect();
        Self::new(points, &edges, &[])
    }

    fn validate_triangle(index: usize, face: &[usize; 3], edges: &[Simplex]) -> Result<()> {
        let distinct: BTreeSet<usize> = face.iter().copied().collect();
        if distinct.len() != 3 {
            return Err(VineyardError::MalformedComplex(format!(
                "triangle {} repeats an edge",
                index
            )));
        }

        let mut vertex_count: HashMap<usize, usize> = HashMap::new();
        for &e in face {
            let edge = edges.get(e).ok_or_else(|| {
                VineyardError::MalformedComplex(format!(
                    "triangle {} refers to edge {} but there are {} edges",
                    index,
                    e,
                    edges.len()
                ))
            })?;
            for &v in &edge.boundary {
                *vertex_count.entry(v).or_insert(0) += 1;
            }
        }

        if vertex_count.len() != 3 || vertex_count.values().any(|&c| c != 2) {
            return Err(VineyardError::MalformedComplex(format!(
                "edges {:?} of triangle {} do not close up",
                face, index
            )));
        }
        Ok(())
    }

    /// Dimension of the space the vertices live in
    pub fn ambient_dim(&self) -> usize {
        self.points.ncols()
    }

    pub fn n_vertices(&self) -> usize {
        self.simplices[0].len()
    }

    pub fn n_edges(&self) -> usize {
        self.simplices[1].len()
    }

    pub fn n_triangles(&self) -> usize {
        self.simplices[2].len()
    }

    /// Total number of simplices over all dimensions
    pub fn len(&self) -> usize {
        self.simplices.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simplices of one dimension; empty above `MAX_DIM`
    pub fn simplices(&self, dim: usize) -> &[Simplex] {
        self.simplices.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn simplex(&self, id: SimplexId) -> Option<&Simplex> {
        self.simplices.get(id.dim).and_then(|s| s.get(id.index))
    }

    /// All simplex ids in `(dim, index)` order
    pub fn ids(&self) -> impl Iterator<Item = SimplexId> + '_ {
        self.simplices.iter().flat_map(|s| s.iter().map(Simplex::id))
    }

    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn position(&self, vertex: usize) -> ArrayView1<'_, f64> {
        self.points.row(vertex)
    }

    /// Indices of the simplices one dimension up that contain `id`
    pub fn coboundary(&self, id: SimplexId) -> &[usize] {
        self.coboundary
            .get(id.dim)
            .and_then(|c| c.get(id.index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sorted vertex indices spanning the simplex
    pub fn vertices_of(&self, id: SimplexId) -> Vec<usize> {
        let mut frontier = vec![id];
        let mut vertices = BTreeSet::new();
        while let Some(s) = frontier.pop() {
            if s.dim == 0 {
                vertices.insert(s.index);
                continue;
            }
            if let Some(simplex) = self.simplex(s) {
                frontier.extend(simplex.boundary.iter().map(|&b| SimplexId::new(s.dim - 1, b)));
            }
        }
        vertices.into_iter().collect()
    }

    /// Barycenter of the simplex
    pub fn center(&self, id: SimplexId) -> Array1<f64> {
        let vertices = self.vertices_of(id);
        if vertices.is_empty() {
            return Array1::zeros(self.ambient_dim());
        }
        let selected = self.points.select(Axis(0), &vertices);
        selected.sum_axis(Axis(0)) / vertices.len() as f64
    }

    /// Squared Euclidean distance from `point` to every vertex
    pub fn squared_distances(&self, point: ArrayView1<f64>) -> Result<Vec<f64>> {
        let dim = self.ambient_dim();
        if point.len() != dim {
            return Err(VineyardError::PointDimension { expected: dim, found: point.len() });
        }

        let n = self.n_vertices();
        let mut distances = Vec::with_capacity(n);
        for i in 0..n {
            let mut dist_sq = 0.0;
            for d in 0..dim {
                let diff = self.points[[i, d]] - point[d];
                dist_sq += diff * diff;
            }
            distances.push(dist_sq);
        }
        Ok(distances)
    }

    /// Entrance values of every simplex for a filtration centered at `point`:
    /// squared distance for vertices, max over the faces above that.
    pub fn entrance_values(&self, point: ArrayView1<f64>) -> Result<[Vec<f64>; MAX_DIM + 1]> {
        let vertex_values = self.squared_distances(point)?;
        let edge_values = Self::max_over_faces(&self.simplices[1], &vertex_values);
        let triangle_values = Self::max_over_faces(&self.simplices[2], &edge_values);
        Ok([vertex_values, edge_values, triangle_values])
    }

    fn max_over_faces(simplices: &[Simplex], face_values: &[f64]) -> Vec<f64> {
        simplices
            .iter()
            .map(|s| {
                s.boundary
                    .iter()
                    .map(|&b| face_values[b])
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn square() -> Complex {
        let points = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        Complex::cycle(points).unwrap()
    }

    #[test]
    fn test_cycle_coboundary() {
        let c = square();
        assert_eq!(c.n_vertices(), 4);
        assert_eq!(c.n_edges(), 4);
        assert_eq!(c.len(), 8);
        // vertex 0 sits on the closing edge 3 and on edge 0
        let mut cob = c.coboundary(SimplexId::vertex(0)).to_vec();
        cob.sort();
        assert_eq!(cob, vec![0, 3]);
        assert!(c.coboundary(SimplexId::edge(0)).is_empty());
    }

    #[test]
    fn test_from_triangles_shares_edges() {
        let points = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let c = Complex::from_triangles(points, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        assert_eq!(c.n_edges(), 5);
        assert_eq!(c.n_triangles(), 2);

        // the diagonal 0-2 bounds both triangles
        let diagonal = c
            .simplices(1)
            .iter()
            .find(|e| e.boundary == vec![0, 2])
            .unwrap();
        assert_eq!(c.coboundary(diagonal.id()).len(), 2);
        assert_eq!(c.vertices_of(SimplexId::triangle(1)), vec![0, 2, 3]);
    }

    #[test]
    fn test_rejects_open_triangle() {
        let points = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let edges = [[0, 1], [1, 2], [2, 3]];
        let err = Complex::new(points, &edges, &[[0, 1, 2]]).unwrap_err();
        assert!(matches!(err, VineyardError::MalformedComplex(_)));
    }

    #[test]
    fn test_rejects_dangling_edge() {
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        let err = Complex::new(points, &[[0, 5]], &[]).unwrap_err();
        assert!(matches!(err, VineyardError::MalformedComplex(_)));
    }

    #[test]
    fn test_center_and_entrance_values() {
        let points = array![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];
        let c = Complex::from_triangles(points, &[[0, 1, 2]]).unwrap();

        let center = c.center(SimplexId::triangle(0));
        assert!((center[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((center[1] - 2.0 / 3.0).abs() < 1e-12);

        let values = c.entrance_values(array![0.0, 0.0].view()).unwrap();
        assert_eq!(values[0], vec![0.0, 4.0, 4.0]);
        assert!(values[1].iter().all(|&v| (v - 4.0).abs() < 1e-12));
        assert_eq!(values[2], vec![4.0]);
    }

    #[test]
    fn test_point_dimension_checked() {
        let c = square();
        let err = c.squared_distances(array![0.0, 0.0, 0.0].view()).unwrap_err();
        assert!(matches!(err, VineyardError::PointDimension { expected: 2, found: 3 }));
    }
}
