/// Wavefront OBJ writer for point clouds and oriented boxes.
pub mod obj;
