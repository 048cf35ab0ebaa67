pub mod delaunay;
pub mod mesh_overlay;
pub mod onnx_face_mesh_provider;
