use cgmath::{EuclideanSpace, InnerSpace};

use crate::{Point3, Ray, Vector3, component_max, component_min};

/// Axis-aligned bounding box. `min <= max` holds componentwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: component_min(a, b),
            max: component_max(a, b),
        }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.min = component_min(bounds.min, p);
            bounds.max = component_max(bounds.max, p);
        }
        Some(bounds)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: component_min(self.min, other.min),
            max: component_max(self.max, other.max),
        }
    }

    pub fn merge(acc: Option<Self>, other: Option<Self>) -> Option<Self> {
        match (acc, other) {
            (None, some) => some,
            (Some(acc), None) => Some(acc),
            (Some(acc), Some(other)) => Some(acc.union(other)),
        }
    }

    pub fn center(&self) -> Point3 {
        Point3::from_vec((self.min.to_vec() + self.max.to_vec()) * 0.5)
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Half the diagonal: radius of the sphere through all corners.
    pub fn radius(&self) -> f64 {
        self.size().magnitude() * 0.5
    }

    pub fn contains(&self, p: Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ]
    }

    /// Parametric entry/exit of `ray` clipped to `[0, max_t]`.
    pub fn ray_interval(&self, ray: &Ray, max_t: f64) -> Option<(f64, f64)> {
        let origin = ray.origin();
        let dir = ray.dir();
        let mut tmin: f64 = 0.0;
        let mut tmax: f64 = max_t;

        let mut check_axis = |origin: f64, dir: f64, min: f64, max: f64| -> bool {
            if dir.abs() <= 1.0e-9 {
                return origin >= min && origin <= max;
            }
            let inv = 1.0 / dir;
            let t1 = (min - origin) * inv;
            let t2 = (max - origin) * inv;
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
            tmax >= tmin
        };

        if !check_axis(origin.x, dir.x, self.min.x, self.max.x) {
            return None;
        }
        if !check_axis(origin.y, dir.y, self.min.y, self.max.y) {
            return None;
        }
        if !check_axis(origin.z, dir.z, self.min.z, self.max.z) {
            return None;
        }
        if tmax < 0.0 {
            return None;
        }
        Some((tmin, tmax))
    }
}
