use image::Rgb;

use crate::emotion::domain::landmark_overlay::LandmarkOverlay;
use crate::emotion::domain::landmark_set::LandmarkSet;
use crate::emotion::domain::mesh_topology::{CONTOUR_GROUPS, TESSELATION_COLOR};
use crate::shared::drawing::draw_thick_line_mut;
use crate::shared::frame::Frame;

use super::delaunay::triangulate_edges;

const TESSELATION_THICKNESS: u32 = 1;
const CONTOUR_THICKNESS: u32 = 2;

/// Draws the full face mesh: triangulated tessellation first, then the
/// colored feature contours on top.
///
/// The tessellation is a Delaunay triangulation of the projected landmarks,
/// recomputed per face.
pub struct FaceMeshOverlay;

impl FaceMeshOverlay {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FaceMeshOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkOverlay for FaceMeshOverlay {
    fn draw(
        &self,
        frame: &mut Frame,
        landmarks: &LandmarkSet,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut img = frame
            .to_rgb_image()
            .ok_or("Face mesh overlay requires an RGB frame")?;
        let pixels = landmarks.to_pixels(frame.width(), frame.height());

        let mesh_edges = triangulate_edges(&pixels);
        for &(a, b) in &mesh_edges {
            draw_thick_line_mut(
                &mut img,
                pixels[a],
                pixels[b],
                TESSELATION_THICKNESS,
                Rgb(TESSELATION_COLOR),
            );
        }

        for group in &CONTOUR_GROUPS {
            for &(a, b) in group.edges {
                // Landmark sets may be shorter than the full mesh
                if let (Some(&p), Some(&q)) = (pixels.get(a), pixels.get(b)) {
                    draw_thick_line_mut(&mut img, p, q, CONTOUR_THICKNESS, Rgb(group.color));
                }
            }
        }

        log::debug!(
            "Drew face mesh: {} tessellation edges over {} landmarks",
            mesh_edges.len(),
            pixels.len()
        );
        *frame = Frame::from_rgb_image(img);
        Ok(())
    }
}
