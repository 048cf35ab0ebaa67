use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

/// Draws a line `thickness` pixels wide by stamping offset 1px segments.
///
/// Segments are clipped to the image bounds.
pub fn draw_thick_line_mut(
    img: &mut RgbImage,
    from: (f32, f32),
    to: (f32, f32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let t = thickness.max(1) as i32;
    let lo = -(t - 1) / 2;
    let hi = t / 2;
    for dy in lo..=hi {
        for dx in lo..=hi {
            let (ox, oy) = (dx as f32, dy as f32);
            draw_line_segment_mut(img, (from.0 + ox, from.1 + oy), (to.0 + ox, to.1 + oy), color);
        }
    }
}

/// Draws consecutive segments through `points`, closing the loop if asked.
pub fn draw_polyline_mut(
    img: &mut RgbImage,
    points: &[(f32, f32)],
    closed: bool,
    thickness: u32,
    color: Rgb<u8>,
) {
    for pair in points.windows(2) {
        draw_thick_line_mut(img, pair[0], pair[1], thickness, color);
    }
    if closed && points.len() > 2 {
        draw_thick_line_mut(img, points[points.len() - 1], points[0], thickness, color);
    }
    if points.len() == 1 {
        draw_thick_line_mut(img, points[0], points[0], thickness, color);
    }
}
