use image::{Rgb, RgbImage};

/// JET pseudo-color for an 8-bit intensity: dark blue through cyan, yellow,
/// to dark red.
pub fn jet(value: u8) -> Rgb<u8> {
    let v = value as f32 / 255.0;
    let channel = |offset: f32| {
        let c = (1.5 - (4.0 * v - offset).abs()).clamp(0.0, 1.0);
        (c * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Color-maps a single-channel field of `width` × `height` values.
pub fn jet_image(field: &[u8], width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        jet(field[(y * width + x) as usize])
    })
}

/// Per-pixel `base_weight * base + overlay_weight * overlay`, rounded and
/// saturated. Both images must share dimensions.
pub fn blend(
    base: &RgbImage,
    overlay: &RgbImage,
    base_weight: f32,
    overlay_weight: f32,
) -> Result<RgbImage, Box<dyn std::error::Error>> {
    if base.dimensions() != overlay.dimensions() {
        return Err(format!(
            "Cannot blend {:?} image with {:?} overlay",
            base.dimensions(),
            overlay.dimensions()
        )
        .into());
    }
    let mut out = base.clone();
    for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
        for c in 0..3 {
            let v = base_weight * dst.0[c] as f32 + overlay_weight * src.0[c] as f32;
            dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(out)
}
