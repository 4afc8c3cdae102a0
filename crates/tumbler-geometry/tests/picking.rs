use tumbler_base::Result;
use tumbler_geometry::{Point3, Ray, TriMesh, Vector3};

fn terrain(cells: usize, height: impl Fn(usize, usize) -> f64) -> Result<TriMesh> {
    let mut positions = Vec::new();
    for j in 0..=cells {
        for i in 0..=cells {
            positions.push(Point3::new(i as f64, height(i, j), j as f64));
        }
    }
    let stride = cells + 1;
    let mut triangles = Vec::new();
    for j in 0..cells {
        for i in 0..cells {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }
    TriMesh::new(positions, triangles)
}

fn down_ray(x: f64, z: f64) -> Ray {
    match Ray::new(Point3::new(x, 50.0, z), Vector3::new(0.0, -1.0, 0.0)) {
        Some(ray) => ray,
        None => panic!("valid ray"),
    }
}

#[test]
fn bvh_pick_finds_flat_ground() -> Result<()> {
    let mesh = terrain(16, |_, _| 2.0)?;
    assert_eq!(mesh.triangles().len(), 16 * 16 * 2);

    for (x, z) in [(0.4, 0.3), (7.25, 3.6), (15.8, 15.1)] {
        let Some((t, point)) = mesh.ray_pick(&down_ray(x, z)) else {
            panic!("expected hit at ({x}, {z})");
        };
        assert!((t - 48.0).abs() < 1.0e-9);
        assert!((point.x - x).abs() < 1.0e-9);
        assert!((point.y - 2.0).abs() < 1.0e-9);
    }
    Ok(())
}

#[test]
fn bvh_pick_returns_nearest_of_stacked_layers() -> Result<()> {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();
    for layer in 0..20 {
        let y = layer as f64;
        let base = positions.len();
        positions.push(Point3::new(-1.0, y, -1.0));
        positions.push(Point3::new(3.0, y, -1.0));
        positions.push(Point3::new(-1.0, y, 3.0));
        triangles.push([base, base + 1, base + 2]);
    }
    let mesh = TriMesh::new(positions, triangles)?;

    let Some((_, point)) = mesh.ray_pick(&down_ray(0.0, 0.0)) else {
        panic!("expected hit");
    };
    assert!((point.y - 19.0).abs() < 1.0e-9);
    Ok(())
}

#[test]
fn pick_outside_mesh_misses() -> Result<()> {
    let mesh = terrain(4, |i, j| (i + j) as f64 * 0.1)?;
    assert!(mesh.ray_pick(&down_ray(-3.0, 2.0)).is_none());
    assert!(mesh.ray_pick(&down_ray(2.0, 9.0)).is_none());
    Ok(())
}
