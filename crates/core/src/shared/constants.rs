pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Face mesh landmark model. No download source; must be cached or bundled.
pub const FACE_MESH_MODEL_NAME: &str = "face_landmark.onnx";

/// Directory name under the platform cache dir.
pub const APP_DIR_NAME: &str = "Scanlab";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const EMOTION_OUTPUT_SUFFIX: &str = "_processed";
pub const REGION_OUTPUT_SUFFIX: &str = "_tumor_processed";
