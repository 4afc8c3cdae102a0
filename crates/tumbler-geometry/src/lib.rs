pub mod bounds;
pub mod mesh;
pub mod ray;

pub use cgmath::{EuclideanSpace, InnerSpace, Rad, Rotation, Rotation3};

pub use bounds::Aabb;
pub use mesh::TriMesh;
pub use ray::{Ray, ray_intersect_triangle};

pub type Point2 = cgmath::Point2<f64>;
pub type Point3 = cgmath::Point3<f64>;
pub type Vector2 = cgmath::Vector2<f64>;
pub type Vector3 = cgmath::Vector3<f64>;
pub type Quaternion = cgmath::Quaternion<f64>;
pub type Matrix3 = cgmath::Matrix3<f64>;

pub fn world_up() -> Vector3 {
    Vector3::unit_y()
}

pub fn component_min(a: Point3, b: Point3) -> Point3 {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

pub fn component_max(a: Point3, b: Point3) -> Point3 {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

/// Unit vector along `v`, or `None` when `v` is shorter than `eps` or not finite.
pub fn try_normalize(v: Vector3, eps: f64) -> Option<Vector3> {
    let len = v.magnitude();
    if !len.is_finite() || len <= eps {
        None
    } else {
        Some(v / len)
    }
}

pub fn is_finite_point(p: Point3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

pub fn point_from_array(values: [f64; 3]) -> Point3 {
    Point3::new(values[0], values[1], values[2])
}

pub fn point_to_array(point: Point3) -> [f64; 3] {
    [point.x, point.y, point.z]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_normalize_rejects_short_vectors() {
        assert!(try_normalize(Vector3::new(0.0, 0.0, 0.0), 1.0e-9).is_none());
        assert!(try_normalize(Vector3::new(f64::NAN, 0.0, 0.0), 1.0e-9).is_none());
        let unit = try_normalize(Vector3::new(3.0, 0.0, 4.0), 1.0e-9);
        assert!(matches!(unit, Some(v) if (v.magnitude() - 1.0).abs() < 1.0e-12));
    }

    #[test]
    fn component_min_max() {
        let a = Point3::new(1.0, -2.0, 3.0);
        let b = Point3::new(-1.0, 2.0, 3.5);
        assert_eq!(component_min(a, b), Point3::new(-1.0, -2.0, 3.0));
        assert_eq!(component_max(a, b), Point3::new(1.0, 2.0, 3.5));
    }
}
