use ndarray::Array2;

/// Slider range shared by brightness and contrast.
pub const PARAM_RANGE: std::ops::RangeInclusive<i32> = -255..=255;

/// Brightness/contrast settings applied identically to all three planes.
///
/// `contrast` must stay below 259 (the contrast factor would divide by
/// zero there); the `[-255, 255]` range enforced here keeps well clear
/// of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayParams {
    pub brightness: i32,
    pub contrast: i32,
}

impl DisplayParams {
    pub fn new(brightness: i32, contrast: i32) -> Self {
        Self {
            brightness: brightness.clamp(-255, 255),
            contrast: contrast.clamp(-255, 255),
        }
    }

    pub fn apply(&self, image: &Array2<u8>) -> Array2<u8> {
        adjust(image, self.brightness, self.contrast)
    }
}

/// Remap an 8-bit image by brightness and contrast.
///
/// Per sample, in f32: add `brightness`, divide by 255 (a rescale, not a
/// clamp — this step applies even at brightness 0, so the function is not
/// a plain identity pass-through), then if `contrast != 0` apply the
/// photographic contrast curve
/// `factor * (v - 0.5) + 0.5` with
/// `factor = 259 * (contrast + 255) / (255 * (259 - contrast))`,
/// clamp to `[0, 1]`, scale by 255 and truncate back to `u8`.
///
/// Stateless and deterministic: equal inputs produce bit-identical
/// outputs.
pub fn adjust(image: &Array2<u8>, brightness: i32, contrast: i32) -> Array2<u8> {
    let factor = (contrast != 0)
        .then(|| (259.0 * (contrast as f32 + 255.0)) / (255.0 * (259.0 - contrast as f32)));
    image.mapv(|p| {
        let mut v = p as f32 + brightness as f32;
        v /= 255.0;
        if let Some(factor) = factor {
            v = factor * (v - 0.5) + 0.5;
        }
        (v.clamp(0.0, 1.0) * 255.0) as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array2};

    fn constant(value: u8) -> Array2<u8> {
        Array2::from_elem((3, 3), value)
    }

    fn gradient() -> Array2<u8> {
        Array::from_shape_fn((16, 16), |(r, c)| (r * 16 + c) as u8)
    }

    #[test]
    fn neutral_params_on_anchor_values() {
        // Hand-computed against the documented steps: v/255 rescales into
        // [0, 1] and the final scale restores the anchor points exactly.
        assert_eq!(adjust(&constant(0), 0, 0), constant(0));
        assert_eq!(adjust(&constant(128), 0, 0), constant(128));
        assert_eq!(adjust(&constant(255), 0, 0), constant(255));
    }

    #[test]
    fn brightness_saturates_at_range_ends() {
        assert_eq!(adjust(&gradient(), 255, 0), Array2::from_elem((16, 16), 255));
        assert_eq!(adjust(&gradient(), -255, 0), Array2::from_elem((16, 16), 0));
    }

    #[test]
    fn brightness_is_monotonic_at_zero_contrast() {
        let img = gradient();
        let mut prev = adjust(&img, -40, 0);
        for b in [-10, 0, 25, 90, 200] {
            let next = adjust(&img, b, 0);
            for (lo, hi) in prev.iter().zip(next.iter()) {
                assert!(hi >= lo);
            }
            prev = next;
        }
    }

    #[test]
    fn full_positive_contrast_pushes_to_extremes() {
        // contrast = 255 gives factor = 259*510 / (255*4) = 129.5.
        assert_eq!(adjust(&constant(0), 0, 255), constant(0));
        assert_eq!(adjust(&constant(255), 0, 255), constant(255));
        assert_eq!(adjust(&constant(128), 0, 255), constant(192));
    }

    #[test]
    fn full_negative_contrast_collapses_to_midgray() {
        // contrast = -255 gives factor = 0: every sample lands on 0.5,
        // which truncates to 127.
        for value in [0u8, 31, 128, 255] {
            assert_eq!(adjust(&constant(value), 0, -255), constant(127));
        }
    }

    #[test]
    fn adjustment_is_deterministic() {
        let img = gradient();
        assert_eq!(adjust(&img, 37, -81), adjust(&img, 37, -81));
    }

    #[test]
    fn params_clamp_to_slider_range() {
        let p = DisplayParams::new(400, -9000);
        assert_eq!(p.brightness, 255);
        assert_eq!(p.contrast, -255);
        assert_eq!(DisplayParams::default(), DisplayParams::new(0, 0));
    }
}
