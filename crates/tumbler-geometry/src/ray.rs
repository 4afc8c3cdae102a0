use cgmath::InnerSpace;

use crate::{Point3, Vector3, try_normalize};

const RAY_EPS: f64 = 1.0e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Point3,
    dir: Vector3,
}

impl Ray {
    /// Builds a ray with a unit direction; `None` when `dir` is degenerate.
    pub fn new(origin: Point3, dir: Vector3) -> Option<Self> {
        let dir = try_normalize(dir, RAY_EPS)?;
        Some(Self { origin, dir })
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn dir(&self) -> Vector3 {
        self.dir
    }

    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.dir * t
    }
}

pub fn ray_intersect_triangle(ray: &Ray, a: Point3, b: Point3, c: Point3) -> Option<f64> {
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = ray.dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < RAY_EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = ray.dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    if t > RAY_EPS { Some(t) } else { None }
}
