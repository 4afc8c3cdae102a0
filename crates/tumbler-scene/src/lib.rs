//! Pickable scene geometry and the ray-intersection service the camera rig
//! queries for pivot placement and framing.

pub mod document;

use tracing::debug;
use tumbler_base::{Error, Guid, Result};
use tumbler_geometry::{Aabb, Point3, Ray, TriMesh};

pub use document::{ObjectSpec, SceneDocument, ShapeSpec};

/// Nearest-hit and bounds queries against whatever geometry is on screen.
pub trait SceneQuery {
    /// Closest intersection of `ray` with visible geometry.
    fn raycast(&self, ray: &Ray) -> Option<RayHit>;

    fn object_bounds(&self, id: Guid) -> Option<Aabb>;

    /// Union of the bounds of every visible object.
    fn bounds(&self) -> Option<Aabb>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub object: Guid,
    pub distance: f64,
    pub point: Point3,
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: Guid,
    pub name: String,
    pub visible: bool,
    pub mesh: TriMesh,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: TriMesh) -> Self {
        Self {
            id: Guid::new(),
            name: name.into(),
            visible: true,
            mesh,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: SceneObject) -> Guid {
        let id = object.id;
        debug!(%id, name = %object.name, "scene object added");
        self.objects.push(object);
        id
    }

    pub fn add(&mut self, name: impl Into<String>, mesh: TriMesh) -> Guid {
        self.insert(SceneObject::new(name, mesh))
    }

    pub fn remove(&mut self, id: Guid) -> Result<SceneObject> {
        let idx = self.index_of(id)?;
        Ok(self.objects.remove(idx))
    }

    pub fn set_visible(&mut self, id: Guid, visible: bool) -> Result<()> {
        let idx = self.index_of(id)?;
        self.objects[idx].visible = visible;
        Ok(())
    }

    pub fn get(&self, id: Guid) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn index_of(&self, id: Guid) -> Result<usize> {
        self.objects
            .iter()
            .position(|object| object.id == id)
            .ok_or(Error::UnknownObject(id))
    }

    fn visible(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|object| object.visible)
    }
}

impl SceneQuery for Scene {
    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for object in self.visible() {
            let Some((distance, point)) = object.mesh.ray_pick(ray) else {
                continue;
            };
            match best {
                Some(hit) if distance >= hit.distance => {}
                _ => {
                    best = Some(RayHit {
                        object: object.id,
                        distance,
                        point,
                    })
                }
            }
        }
        best
    }

    fn object_bounds(&self, id: Guid) -> Option<Aabb> {
        self.get(id).and_then(|object| object.mesh.bounds())
    }

    fn bounds(&self) -> Option<Aabb> {
        self.visible()
            .map(|object| object.mesh.bounds())
            .fold(None, Aabb::merge)
    }
}
