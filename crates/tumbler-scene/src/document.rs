use std::path::Path;

use serde::{Deserialize, Serialize};
use tumbler_base::Result;
use tumbler_geometry::{TriMesh, point_from_array};

use crate::{Scene, SceneObject};

/// On-disk scene description used by the replay tool and tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub shape: ShapeSpec,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeSpec {
    Box {
        min: [f64; 3],
        max: [f64; 3],
    },
    Mesh {
        positions: Vec<[f64; 3]>,
        triangles: Vec<[usize; 3]>,
    },
}

fn default_visible() -> bool {
    true
}

impl ShapeSpec {
    pub fn to_mesh(&self) -> Result<TriMesh> {
        match self {
            Self::Box { min, max } => TriMesh::cuboid(point_from_array(*min), point_from_array(*max)),
            Self::Mesh {
                positions,
                triangles,
            } => TriMesh::new(
                positions.iter().copied().map(point_from_array).collect(),
                triangles.clone(),
            ),
        }
    }
}

impl SceneDocument {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn build(&self) -> Result<Scene> {
        let mut scene = Scene::new();
        for spec in &self.objects {
            let mut object = SceneObject::new(spec.name.clone(), spec.shape.to_mesh()?);
            object.visible = spec.visible;
            scene.insert(object);
        }
        Ok(scene)
    }
}
