use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use glam::DVec3;

use crate::{
    boxes::{Box3d, BoxMode, BoxOrigin, Boxes3d},
    pointcloud::PointCloud,
    transforms::heading_to_rotation,
};

/// Error types for the OBJ module.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    Io(#[from] std::io::Error),

    /// The boxes still use the bottom-center origin
    #[error("Boxes must be gravity-centered before mesh export")]
    NotGravityCentered,

    /// Only z-up boxes are exported as meshes
    #[error("Mesh export does not support boxes in {0} coordinates")]
    UnsupportedMode(BoxMode),
}

// Vertex i of the unit box has x = bit 2, y = bit 1 and z = bit 0 of i.
const MESH_UNIT_VERTICES: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
];

// Counter-clockwise seen from outside, 0-based.
const MESH_FACES: [[usize; 3]; 12] = [
    [1, 3, 0],
    [4, 1, 0],
    [0, 3, 2],
    [2, 4, 0],
    [1, 7, 3],
    [5, 1, 4],
    [5, 7, 1],
    [3, 7, 2],
    [6, 4, 2],
    [2, 7, 6],
    [6, 5, 4],
    [7, 5, 6],
];

/// A triangle mesh with 0-based face indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriMesh {
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Append another mesh, offsetting its face indices.
    pub fn append(&mut self, other: &TriMesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| f.map(|i| i + offset)));
    }
}

/// Build the closed 8-vertex, 12-triangle prism of a gravity-centered z-up box.
///
/// # Arguments
///
/// * `b` - The box, with its center at the centroid and heading about +Z.
///
/// # Returns
///
/// The mesh of the box.
pub fn oriented_box_mesh(b: &Box3d) -> TriMesh {
    let rotation = heading_to_rotation(b.heading);
    let center = DVec3::from_array(b.center);
    let extents = DVec3::from_array(b.extents);

    let vertices = MESH_UNIT_VERTICES
        .iter()
        .map(|v| {
            let local = (DVec3::from_array(*v) - 0.5) * extents;
            (rotation * local + center).to_array()
        })
        .collect();

    TriMesh {
        vertices,
        faces: MESH_FACES.to_vec(),
    }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>, ObjError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write a point cloud as OBJ vertices.
///
/// Each point becomes a `v x y z` line; clouds with colors get `v x y z r g b`.
///
/// # Arguments
///
/// * `path` - The output file, overwritten if it exists.
/// * `cloud` - The points to write.
pub fn write_points_obj(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<(), ObjError> {
    let path = path.as_ref();
    let mut writer = create_writer(path)?;

    match cloud.colors() {
        Some(colors) => {
            for (p, c) in cloud.points().iter().zip(colors) {
                writeln!(
                    writer,
                    "v {:.6} {:.6} {:.6} {} {} {}",
                    p[0], p[1], p[2], c[0], c[1], c[2]
                )?;
            }
        }
        None => {
            for p in cloud.points() {
                writeln!(writer, "v {:.6} {:.6} {:.6}", p[0], p[1], p[2])?;
            }
        }
    }
    writer.flush()?;

    log::debug!("wrote {} points to {}", cloud.len(), path.display());

    Ok(())
}

/// Write a triangle mesh as OBJ, with 1-based face indices.
pub fn write_mesh_obj(path: impl AsRef<Path>, mesh: &TriMesh) -> Result<(), ObjError> {
    let mut writer = create_writer(path.as_ref())?;

    for v in &mesh.vertices {
        writeln!(writer, "v {:.8} {:.8} {:.8}", v[0], v[1], v[2])?;
    }
    for f in &mesh.faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    writer.flush()?;

    Ok(())
}

/// Build the merged mesh of a box set.
///
/// An empty set yields a single degenerate box at the origin so the file is never empty.
pub fn boxes_mesh(boxes: &Boxes3d) -> Result<TriMesh, ObjError> {
    if boxes.mode() == BoxMode::Camera {
        return Err(ObjError::UnsupportedMode(boxes.mode()));
    }
    if boxes.origin() != BoxOrigin::GravityCenter {
        return Err(ObjError::NotGravityCentered);
    }

    let placeholder = [Box3d::default()];
    let items = if boxes.is_empty() {
        &placeholder[..]
    } else {
        boxes.boxes()
    };

    let mut mesh = TriMesh::default();
    for b in items {
        mesh.append(&oriented_box_mesh(b));
    }
    Ok(mesh)
}

/// Export oriented boxes as one OBJ mesh, 8 vertices and 12 triangles per box.
///
/// # Arguments
///
/// * `path` - The output file, overwritten if it exists.
/// * `boxes` - Gravity-centered boxes in LiDAR or depth coordinates.
///
/// Example:
///
/// ```no_run
/// use bevlens_3d::boxes::{BoxMode, BoxOrigin, Boxes3d};
/// use bevlens_3d::io::obj::write_boxes_obj;
///
/// let boxes = Boxes3d::from_rows(&[[0.0, 0.0, 0.0, 4.0, 2.0, 1.5, 0.3]], BoxMode::Lidar, BoxOrigin::BottomCenter)
///     .unwrap()
///     .into_gravity_center();
/// write_boxes_obj("/tmp/scene/scene_gt.obj", &boxes).unwrap();
/// ```
pub fn write_boxes_obj(path: impl AsRef<Path>, boxes: &Boxes3d) -> Result<(), ObjError> {
    let mesh = boxes_mesh(boxes)?;
    write_mesh_obj(path.as_ref(), &mesh)?;

    log::debug!(
        "wrote {} boxes to {}",
        boxes.len().max(1),
        path.as_ref().display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signed_volume(mesh: &TriMesh) -> f64 {
        mesh.faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| DVec3::from_array(mesh.vertices[i]));
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    #[test]
    fn test_box_mesh_is_closed_and_outward() {
        let b = Box3d::new([1.0, -2.0, 0.5], [4.0, 2.0, 1.0], 0.7);
        let mesh = oriented_box_mesh(&b);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
        // positive volume means the normals point outwards
        assert_relative_eq!(signed_volume(&mesh), 8.0, epsilon = 1e-9);

        // every undirected edge is shared by exactly two faces
        let mut edges = std::collections::HashMap::new();
        for f in &mesh.faces {
            for k in 0..3 {
                let (a, b) = (f[k], f[(k + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
    }

    #[test]
    fn test_box_mesh_heading() {
        let b = Box3d::new([0.0, 0.0, 0.0], [2.0, 4.0, 2.0], std::f64::consts::FRAC_PI_2);
        let mesh = oriented_box_mesh(&b);
        // the 4 m side now runs along x
        let xs: Vec<f64> = mesh.vertices.iter().map(|v| v[0]).collect();
        let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
        assert_relative_eq!(max_x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_write_empty_boxes() -> Result<(), ObjError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("nested").join("empty_gt.obj");

        let boxes = Boxes3d::new(vec![], BoxMode::Lidar, BoxOrigin::GravityCenter);
        write_boxes_obj(&path, &boxes)?;

        let text = std::fs::read_to_string(&path)?;
        let vertices: Vec<&str> = text.lines().filter(|l| l.starts_with("v ")).collect();
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(vertices.len(), 8);
        assert_eq!(faces.len(), 12);
        for line in vertices {
            for token in line.split_whitespace().skip(1) {
                assert_eq!(token.parse::<f64>().ok(), Some(0.0));
            }
        }
        assert_eq!(faces[0], "f 2 4 1");
        Ok(())
    }

    #[test]
    fn test_write_boxes_face_offsets() -> Result<(), ObjError> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("two_gt.obj");

        let boxes = Boxes3d::new(
            vec![
                Box3d::new([0.0, 0.0, 0.5], [1.0, 1.0, 1.0], 0.0),
                Box3d::new([5.0, 0.0, 0.5], [1.0, 1.0, 1.0], 0.0),
            ],
            BoxMode::Depth,
            BoxOrigin::GravityCenter,
        );
        write_boxes_obj(&path, &boxes)?;

        let text = std::fs::read_to_string(&path)?;
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces.len(), 24);
        assert_eq!(faces[12], "f 10 12 9");
        assert_eq!(text.lines().next(), Some("v -0.50000000 -0.50000000 0.00000000"));
        Ok(())
    }

    #[test]
    fn test_write_boxes_rejects_bottom_center() {
        let boxes = Boxes3d::new(vec![Box3d::default()], BoxMode::Lidar, BoxOrigin::BottomCenter);
        let res = boxes_mesh(&boxes);
        assert!(matches!(res, Err(ObjError::NotGravityCentered)));

        let boxes = Boxes3d::new(vec![Box3d::default()], BoxMode::Camera, BoxOrigin::GravityCenter);
        let res = boxes_mesh(&boxes);
        assert!(matches!(res, Err(ObjError::UnsupportedMode(BoxMode::Camera))));
    }

    #[test]
    fn test_write_points() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;

        let cloud = PointCloud::from_rows(&[1.0, 2.0, 3.0, 0.5], 4)?;
        let path = tmp_dir.path().join("points.obj");
        write_points_obj(&path, &cloud)?;
        assert_eq!(std::fs::read_to_string(&path)?, "v 1.000000 2.000000 3.000000\n");

        let cloud = PointCloud::from_rows(&[1.0, -2.5, 0.125, 255.0, 128.9, 0.0], 6)?;
        write_points_obj(&path, &cloud)?;
        assert_eq!(
            std::fs::read_to_string(&path)?,
            "v 1.000000 -2.500000 0.125000 255 128 0\n"
        );
        Ok(())
    }
}
