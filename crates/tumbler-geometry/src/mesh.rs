use std::cmp::Ordering;

use cgmath::EuclideanSpace;
use tumbler_base::{Error, Result, ensure_positive};

use crate::bounds::Aabb;
use crate::ray::{Ray, ray_intersect_triangle};
use crate::Point3;

const BVH_LEAF_SIZE: usize = 8;

/// Indexed triangle mesh with a bounding volume hierarchy for ray picking.
#[derive(Clone, Debug)]
pub struct TriMesh {
    positions: Vec<Point3>,
    triangles: Vec<[usize; 3]>,
    bounds: Option<Aabb>,
    bvh_nodes: Vec<BvhNode>,
    bvh_indices: Vec<usize>,
}

impl TriMesh {
    pub fn new(positions: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        for (idx, tri) in triangles.iter().enumerate() {
            if let Some(bad) = tri.iter().find(|&&v| v >= positions.len()) {
                return Err(Error::InvalidParameter(format!(
                    "triangle {idx} references vertex {bad}, mesh has {} vertices",
                    positions.len()
                )));
            }
        }
        if positions.iter().any(|p| !crate::is_finite_point(*p)) {
            return Err(Error::InvalidParameter(
                "mesh positions must be finite".to_string(),
            ));
        }

        let bounds = Aabb::from_points(positions.iter().copied());
        let (bvh_nodes, bvh_indices) = build_bvh(&positions, &triangles);
        Ok(Self {
            positions,
            triangles,
            bounds,
            bvh_nodes,
            bvh_indices,
        })
    }

    /// Closed box spanning `a` and `b`; every extent must be positive.
    pub fn cuboid(a: Point3, b: Point3) -> Result<Self> {
        let bounds = Aabb::new(a, b);
        let size = bounds.size();
        ensure_positive("width", size.x)?;
        ensure_positive("height", size.y)?;
        ensure_positive("depth", size.z)?;

        let positions = bounds.corners().to_vec();
        let triangles = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 6, 2],
            [3, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self::new(positions, triangles)
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// Nearest hit along `ray` as `(t, point)`.
    pub fn ray_pick(&self, ray: &Ray) -> Option<(f64, Point3)> {
        if self.triangles.is_empty() {
            return None;
        }
        if self.bvh_nodes.is_empty() {
            return self.ray_pick_linear(ray);
        }

        let mut best_t = f64::INFINITY;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.bvh_nodes[node_idx];
            if node.bounds.ray_interval(ray, best_t).is_none() {
                continue;
            }

            if node.count > 0 {
                for &tri_idx in &self.bvh_indices[node.start..node.start + node.count] {
                    if let Some(t) = self.intersect(ray, tri_idx) {
                        best_t = best_t.min(t);
                    }
                }
                continue;
            }

            let enter = |child: Option<usize>| {
                child.and_then(|idx| {
                    self.bvh_nodes[idx]
                        .bounds
                        .ray_interval(ray, best_t)
                        .map(|(tmin, _)| (idx, tmin))
                })
            };
            match (enter(node.left), enter(node.right)) {
                (Some((left_idx, left_t)), Some((right_idx, right_t))) => {
                    // Nearer child on top of the stack.
                    if left_t <= right_t {
                        stack.push(right_idx);
                        stack.push(left_idx);
                    } else {
                        stack.push(left_idx);
                        stack.push(right_idx);
                    }
                }
                (Some((left_idx, _)), None) => stack.push(left_idx),
                (None, Some((right_idx, _))) => stack.push(right_idx),
                (None, None) => {}
            }
        }

        best_t
            .is_finite()
            .then(|| (best_t, ray.at(best_t)))
    }

    fn ray_pick_linear(&self, ray: &Ray) -> Option<(f64, Point3)> {
        (0..self.triangles.len())
            .filter_map(|idx| self.intersect(ray, idx))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .map(|t| (t, ray.at(t)))
    }

    fn intersect(&self, ray: &Ray, tri_idx: usize) -> Option<f64> {
        let tri = self.triangles[tri_idx];
        ray_intersect_triangle(
            ray,
            self.positions[tri[0]],
            self.positions[tri[1]],
            self.positions[tri[2]],
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct BvhNode {
    bounds: Aabb,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

fn build_bvh(positions: &[Point3], triangles: &[[usize; 3]]) -> (Vec<BvhNode>, Vec<usize>) {
    if triangles.is_empty() || positions.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut tri_bounds = Vec::with_capacity(triangles.len());
    let mut centroids = Vec::with_capacity(triangles.len());
    for tri in triangles {
        let corners = [positions[tri[0]], positions[tri[1]], positions[tri[2]]];
        if let Some(bounds) = Aabb::from_points(corners) {
            tri_bounds.push(bounds);
        }
        centroids.push(Point3::centroid(&corners));
    }

    let mut indices: Vec<usize> = (0..triangles.len()).collect();
    let mut nodes = Vec::new();
    let mut out_indices = Vec::with_capacity(triangles.len());
    build_bvh_node(
        &mut indices,
        &tri_bounds,
        &centroids,
        &mut nodes,
        &mut out_indices,
    );
    (nodes, out_indices)
}

fn build_bvh_node(
    indices: &mut [usize],
    tri_bounds: &[Aabb],
    centroids: &[Point3],
    nodes: &mut Vec<BvhNode>,
    out_indices: &mut Vec<usize>,
) -> usize {
    let node_index = nodes.len();
    let bounds = indices
        .iter()
        .map(|&idx| tri_bounds[idx])
        .reduce(Aabb::union)
        .unwrap_or(tri_bounds[0]);
    nodes.push(BvhNode {
        bounds,
        left: None,
        right: None,
        start: 0,
        count: 0,
    });

    if indices.len() <= BVH_LEAF_SIZE {
        nodes[node_index].start = out_indices.len();
        nodes[node_index].count = indices.len();
        out_indices.extend_from_slice(indices);
        return node_index;
    }

    let spread = Aabb::from_points(indices.iter().map(|&idx| centroids[idx]))
        .map(|b| b.size())
        .unwrap_or_else(|| bounds.size());
    let axis = if spread.x >= spread.y && spread.x >= spread.z {
        0
    } else if spread.y >= spread.z {
        1
    } else {
        2
    };
    indices.sort_unstable_by(|a, b| {
        centroids[*a][axis]
            .partial_cmp(&centroids[*b][axis])
            .unwrap_or(Ordering::Equal)
    });
    let mid = indices.len() / 2;
    let (left, right) = indices.split_at_mut(mid);
    let left_idx = build_bvh_node(left, tri_bounds, centroids, nodes, out_indices);
    let right_idx = build_bvh_node(right, tri_bounds, centroids, nodes, out_indices);
    nodes[node_index].left = Some(left_idx);
    nodes[node_index].right = Some(right_idx);
    node_index
}
