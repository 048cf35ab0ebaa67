use image::{GrayImage, Rgb};
use imageproc::contours::{find_contours, BorderType};

use crate::region::domain::region_candidate::{largest, RegionCandidate};
use crate::region::domain::region_detector::{RegionDetection, RegionDetector};
use crate::shared::drawing::draw_polyline_mut;
use crate::shared::frame::Frame;

use super::gaussian::{gaussian_kernel_1d, separable_gaussian_blur_with_kernel};
use super::heatmap::{blend, jet_image};

pub const KERNEL_SIZE: usize = 15;
/// Absolute floor of the binarization threshold.
pub const THRESHOLD_FLOOR: f64 = 200.0;
/// Threshold as a fraction of the brightest blurred value.
pub const THRESHOLD_FRACTION: f64 = 0.8;
/// Regions with area at or below this many square pixels are ignored.
pub const MIN_AREA: f64 = 100.0;

const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CONTOUR_THICKNESS: u32 = 2;
const IMAGE_WEIGHT: f32 = 0.7;
const HEATMAP_WEIGHT: f32 = 0.3;

/// Finds the largest bright blob with a dynamic threshold over a blurred
/// luma field.
///
/// A qualifying region is outlined in red on the frame, which is then blended
/// with a JET heat map of the blurred field.
pub struct ThresholdRegionDetector {
    kernel: Vec<f32>,
}

impl ThresholdRegionDetector {
    pub fn new() -> Self {
        Self {
            kernel: gaussian_kernel_1d(KERNEL_SIZE),
        }
    }
}

impl Default for ThresholdRegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionDetector for ThresholdRegionDetector {
    fn detect(&self, frame: &mut Frame) -> Result<RegionDetection, Box<dyn std::error::Error>> {
        let img = frame.to_rgb_image().ok_or_else(|| {
            format!(
                "Region detection requires an RGB frame, got {} channels",
                frame.channels()
            )
        })?;
        let (width, height) = img.dimensions();

        let mut field = luma(&img);
        let mut temp = Vec::new();
        separable_gaussian_blur_with_kernel(
            &mut field,
            width as usize,
            height as usize,
            1,
            &self.kernel,
            &mut temp,
        );

        let max_value = field.iter().copied().max().unwrap_or(0) as f64;
        let threshold = binarization_threshold(max_value);
        let mask = binarize(&field, width, height, threshold)?;
        let candidates = outer_regions(&mask);
        log::debug!(
            "Blurred max {max_value}, threshold {threshold:.1}, {} outer region(s)",
            candidates.len()
        );

        let best = largest(&candidates).cloned();
        let qualifying = best.as_ref().filter(|c| c.area() > MIN_AREA);
        let detected = qualifying.is_some();

        if let Some(region) = qualifying {
            let mut annotated = img;
            let outline: Vec<(f32, f32)> = region
                .points()
                .iter()
                .map(|&(x, y)| (x as f32, y as f32))
                .collect();
            draw_polyline_mut(&mut annotated, &outline, true, CONTOUR_THICKNESS, CONTOUR_COLOR);

            let heat = jet_image(&field, width, height);
            let blended = blend(&annotated, &heat, IMAGE_WEIGHT, HEATMAP_WEIGHT)?;
            *frame = Frame::from_rgb_image(blended);
        }

        Ok(RegionDetection {
            detected,
            largest: best,
            threshold,
            max_value,
        })
    }
}

pub fn binarization_threshold(max_value: f64) -> f64 {
    THRESHOLD_FLOOR.max(THRESHOLD_FRACTION * max_value)
}

/// ITU-R BT.601 luma, rounded to 8 bits.
fn luma(img: &image::RgbImage) -> Vec<u8> {
    img.pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
                .round()
                .clamp(0.0, 255.0) as u8
        })
        .collect()
}

fn binarize(
    field: &[u8],
    width: u32,
    height: u32,
    threshold: f64,
) -> Result<GrayImage, Box<dyn std::error::Error>> {
    let data = field
        .iter()
        .map(|&v| if v as f64 >= threshold { 255 } else { 0 })
        .collect();
    GrayImage::from_raw(width, height, data).ok_or_else(|| "Blurred field size mismatch".into())
}

/// Outer boundaries of the mask's foreground blobs; holes are skipped.
fn outer_regions(mask: &GrayImage) -> Vec<RegionCandidate> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| RegionCandidate::new(c.points.iter().map(|p| (p.x, p.y)).collect()))
        .collect()
}
