/// Two-stage face mesh landmark provider using ONNX Runtime via `ort`.
///
/// Stage one finds the most confident face with the YOLO face model
/// (letterbox preprocessing). Stage two crops an enlarged square around it,
/// runs the face mesh model, and maps the landmarks back to normalized image
/// coordinates.
use std::path::Path;

use crate::emotion::domain::landmark_provider::LandmarkProvider;
use crate::emotion::domain::landmark_set::{LandmarkSet, Point2, FACE_MESH_POINTS};
use crate::shared::frame::Frame;

/// Fallback model input resolutions when the model doesn't specify dimensions.
const DEFAULT_FACE_INPUT_SIZE: u32 = 640;
const DEFAULT_MESH_INPUT_SIZE: u32 = 192;

/// Default minimum face detection confidence.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Face box enlargement before cropping for the mesh model.
const ROI_SCALE: f64 = 1.5;

/// Face-presence probability below which the mesh result is discarded.
const FACE_PRESENCE_THRESH: f32 = 0.5;

/// Axis-aligned face box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FaceBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Square crop window in frame pixel coordinates; may extend past the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SquareRoi {
    x: f64,
    y: f64,
    side: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TensorLayout {
    size: u32,
    channels_first: bool,
}

pub struct OnnxFaceMeshProvider {
    face_session: ort::session::Session,
    mesh_session: ort::session::Session,
    confidence: f64,
    face_input_size: u32,
    mesh_layout: TensorLayout,
}

impl OnnxFaceMeshProvider {
    /// Load both models and read their input resolutions.
    ///
    /// The face model is expected as NCHW; the mesh model may be NCHW or
    /// NHWC, detected from whichever axis holds 3 channels.
    pub fn new(
        face_model_path: &Path,
        mesh_model_path: &Path,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let face_session = ort::session::Session::builder()?.commit_from_file(face_model_path)?;
        let mesh_session = ort::session::Session::builder()?.commit_from_file(mesh_model_path)?;

        let face_input_size = input_shape(&face_session)
            .and_then(|shape| layout_from_shape(&shape))
            .map(|l| l.size)
            .unwrap_or(DEFAULT_FACE_INPUT_SIZE);
        let mesh_layout = input_shape(&mesh_session)
            .and_then(|shape| layout_from_shape(&shape))
            .unwrap_or(TensorLayout {
                size: DEFAULT_MESH_INPUT_SIZE,
                channels_first: false,
            });

        log::info!(
            "Loaded face mesh provider (face input {face_input_size}px, mesh input {}px, {})",
            mesh_layout.size,
            if mesh_layout.channels_first { "NCHW" } else { "NHWC" }
        );

        Ok(Self {
            face_session,
            mesh_session,
            confidence,
            face_input_size,
            mesh_layout,
        })
    }

    fn detect_face(&mut self, frame: &Frame) -> Result<Option<FaceBox>, Box<dyn std::error::Error>> {
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.face_input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.face_session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        parse_best_face(data, &shape, self.confidence, scale, pad_x, pad_y)
    }

    fn run_mesh(
        &mut self,
        frame: &Frame,
        roi: SquareRoi,
    ) -> Result<Option<Vec<Point2>>, Box<dyn std::error::Error>> {
        let input_tensor = crop_resize(frame, roi, self.mesh_layout);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.mesh_session.run(ort::inputs![input_value])?;

        let mut coords: Option<Vec<f32>> = None;
        let mut presence: Option<f32> = None;
        for i in 0..outputs.len() {
            let tensor = outputs[i].try_extract_array::<f32>()?;
            let values: Vec<f32> = tensor.iter().copied().collect();
            if values.len() >= FACE_MESH_POINTS * 3 && coords.is_none() {
                coords = Some(values);
            } else if values.len() == 1 {
                presence = Some(sigmoid(values[0]));
            }
        }

        if let Some(score) = presence {
            log::debug!("Face presence score {score:.3}");
            if score < FACE_PRESENCE_THRESH {
                return Ok(None);
            }
        }

        let coords = coords.ok_or("Face mesh model produced no landmark output")?;
        Ok(Some(map_landmarks(
            &coords,
            roi,
            self.mesh_layout.size,
            frame.width(),
            frame.height(),
        )))
    }
}

impl LandmarkProvider for OnnxFaceMeshProvider {
    fn extract_landmarks(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>> {
        let Some(face) = self.detect_face(frame)? else {
            log::debug!("No face above confidence {}", self.confidence);
            return Ok(None);
        };
        log::debug!(
            "Face at ({:.0}, {:.0})-({:.0}, {:.0}), confidence {:.2}",
            face.x1,
            face.y1,
            face.x2,
            face.y2,
            face.confidence
        );

        let roi = square_roi(&face, ROI_SCALE);
        match self.run_mesh(frame, roi)? {
            Some(points) => Ok(Some(LandmarkSet::new(points)?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------------

fn input_shape(session: &ort::session::Session) -> Option<Vec<i64>> {
    session.inputs().first().and_then(|input| {
        if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
            Some(shape.iter().copied().collect())
        } else {
            None
        }
    })
}

/// Reads a square input size and channel order from an `[N, C, H, W]` or
/// `[N, H, W, C]` shape. Dynamic (non-positive) sizes yield `None`.
fn layout_from_shape(shape: &[i64]) -> Option<TensorLayout> {
    if shape.len() != 4 {
        return None;
    }
    let (channels_first, size) = if shape[1] == 3 {
        (true, shape[2])
    } else if shape[3] == 3 {
        (false, shape[1])
    } else {
        return None;
    };
    (size > 0).then_some(TensorLayout {
        size: size as u32,
        channels_first,
    })
}

// ---------------------------------------------------------------------------
// Face detection
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padding filled with 114/255 gray, YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

/// Picks the single most confident face at or above `confidence`.
///
/// YOLO output is `[1, features, detections]` (transposed) or
/// `[1, detections, features]`; rows start with `[cx, cy, w, h, conf]`.
fn parse_best_face(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
) -> Result<Option<FaceBox>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected face model output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(format!("Face model output too small for shape {shape:?}").into());
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    let best = (0..num_dets)
        .filter(|&i| value(i, 4) >= confidence)
        .max_by(|&a, &b| {
            value(a, 4)
                .partial_cmp(&value(b, 4))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    Ok(best.map(|i| {
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        FaceBox {
            x1: ((cx - w / 2.0) - pad_x as f64) / scale,
            y1: ((cy - h / 2.0) - pad_y as f64) / scale,
            x2: ((cx + w / 2.0) - pad_x as f64) / scale,
            y2: ((cy + h / 2.0) - pad_y as f64) / scale,
            confidence: value(i, 4),
        }
    }))
}

// ---------------------------------------------------------------------------
// Mesh stage
// ---------------------------------------------------------------------------

/// Square window centered on the face, `scale` times its longer side.
fn square_roi(face: &FaceBox, scale: f64) -> SquareRoi {
    let cx = (face.x1 + face.x2) / 2.0;
    let cy = (face.y1 + face.y2) / 2.0;
    let side = (face.x2 - face.x1).max(face.y2 - face.y1).max(1.0) * scale;
    SquareRoi {
        x: cx - side / 2.0,
        y: cy - side / 2.0,
        side,
    }
}

/// Bilinear crop-and-resize of `roi` into a `[0, 1]` float tensor.
///
/// Samples outside the frame are black.
fn crop_resize(frame: &Frame, roi: SquareRoi, layout: TensorLayout) -> ndarray::Array4<f32> {
    let size = layout.size as usize;
    let mut tensor = if layout.channels_first {
        ndarray::Array4::<f32>::zeros((1, 3, size, size))
    } else {
        ndarray::Array4::<f32>::zeros((1, size, size, 3))
    };

    let src = frame.as_ndarray();
    let fw = frame.width() as isize;
    let fh = frame.height() as isize;
    let step = roi.side / size as f64;

    let sample = |x: isize, y: isize, c: usize| -> f32 {
        if x < 0 || y < 0 || x >= fw || y >= fh {
            0.0
        } else {
            src[[y as usize, x as usize, c]] as f32
        }
    };

    for ty in 0..size {
        let sy = roi.y + (ty as f64 + 0.5) * step - 0.5;
        let y0 = sy.floor();
        let fy = (sy - y0) as f32;
        for tx in 0..size {
            let sx = roi.x + (tx as f64 + 0.5) * step - 0.5;
            let x0 = sx.floor();
            let fx = (sx - x0) as f32;
            let (x0, y0) = (x0 as isize, y0 as isize);

            for c in 0..3 {
                let v = sample(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
                    + sample(x0 + 1, y0, c) * fx * (1.0 - fy)
                    + sample(x0, y0 + 1, c) * (1.0 - fx) * fy
                    + sample(x0 + 1, y0 + 1, c) * fx * fy;
                let v = v / 255.0;
                if layout.channels_first {
                    tensor[[0, c, ty, tx]] = v;
                } else {
                    tensor[[0, ty, tx, c]] = v;
                }
            }
        }
    }

    tensor
}

/// Maps `[x, y, z]` triples in mesh-input pixels to normalized image points.
fn map_landmarks(
    coords: &[f32],
    roi: SquareRoi,
    input_size: u32,
    frame_width: u32,
    frame_height: u32,
) -> Vec<Point2> {
    let unit = roi.side / input_size as f64;
    coords
        .chunks_exact(3)
        .map(|xyz| {
            let px = roi.x + xyz[0] as f64 * unit;
            let py = roi.y + xyz[1] as f64 * unit;
            Point2::new(px / frame_width as f64, py / frame_height as f64)
        })
        .collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
