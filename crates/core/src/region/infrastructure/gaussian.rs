/// Precompute a 1D Gaussian kernel of the given size.
///
/// `kernel_size` must be odd and >= 1. Sigma follows OpenCV's sigma=0
/// convention: `0.3 * ((kernel_size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = sigma_for(kernel_size);
    let half = (kernel_size / 2) as f64;
    let mut kernel_f64: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

pub fn sigma_for(kernel_size: usize) -> f64 {
    0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Mirror an out-of-range index back into `0..len` without repeating the
/// edge sample (`gfedcb|abcdefgh|gfedcba`).
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        i = if i < 0 { -i } else { 2 * last - i };
    }
    i as usize
}

/// Convenience wrapper that allocates its own kernel and temp buffer.
#[cfg(test)]
fn separable_gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel_size: usize,
) {
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let kernel = gaussian_kernel_1d(kernel_size);
    let mut temp = Vec::new();
    separable_gaussian_blur_with_kernel(data, width, height, channels, &kernel, &mut temp);
}

/// Apply a separable Gaussian blur using a pre-computed kernel, reusing `temp`.
///
/// Borders are mirrored with [`reflect_101`].
pub fn separable_gaussian_blur_with_kernel(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = (kernel_size / 2) as isize;

    let needed = width * height * channels;
    temp.resize(needed, 0.0);

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - half, width);
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as isize + k as isize - half, height);
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_kernel_sums_to_one() {
        let k = gaussian_kernel_1d(15);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let k = gaussian_kernel_1d(15);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sigma_for_fifteen() {
        assert_relative_eq!(sigma_for(15), 2.6, epsilon = 1e-9);
    }

    #[rstest]
    #[case(-1, 5, 1)]
    #[case(-3, 5, 3)]
    #[case(0, 5, 0)]
    #[case(4, 5, 4)]
    #[case(5, 5, 3)]
    #[case(7, 5, 1)]
    #[case(-9, 3, 1)]
    #[case(3, 1, 0)]
    fn test_reflect_101(#[case] index: isize, #[case] len: usize, #[case] expected: usize) {
        assert_eq!(reflect_101(index, len), expected);
    }

    #[test]
    fn test_blur_uniform_image_unchanged() {
        let mut data = vec![128u8; 20 * 20];
        separable_gaussian_blur(&mut data, 20, 20, 1, 15);
        assert!(data.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_blur_spreads_single_bright_pixel() {
        let mut data = vec![0u8; 21 * 21];
        let center = 10 * 21 + 10;
        data[center] = 255;

        separable_gaussian_blur(&mut data, 21, 21, 1, 15);

        assert!(data[center] < 255);
        assert!(data[center + 1] > 0);
        assert_eq!(data[center - 1], data[center + 1]);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let mut data = vec![90u8; 4 * 3 * 3];
        separable_gaussian_blur(&mut data, 4, 3, 3, 15);
        assert!(data.iter().all(|&v| v == 90));
    }

    #[test]
    fn test_kernel_size_1_is_identity() {
        let mut data: Vec<u8> = (0..25).collect();
        let original = data.clone();
        separable_gaussian_blur(&mut data, 5, 5, 1, 1);
        assert_eq!(data, original);
    }
}
