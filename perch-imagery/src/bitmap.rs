use image::RgbaImage;
use image::imageops;

/// Captured pixels, always RGBA8.
pub type Bitmap = RgbaImage;

/// Alpha tolerance when judging a composite capture. A composite whose every
/// pixel stays at or below this opacity is treated as blank.
pub const COMPOSITE_MAX_ALPHA: f64 = 0.9;

/// Alpha tolerance for individual crops and per-item captures: only a fully
/// transparent image is rejected.
pub const CROP_MAX_ALPHA: f64 = 0.0;

/// Returns `true` if no pixel is more opaque than `max_alpha` (0.0–1.0).
///
/// An image without pixels is transparent.
pub fn is_transparent(bitmap: &Bitmap, max_alpha: f64) -> bool {
    let limit = (max_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    bitmap.pixels().all(|pixel| pixel.0[3] <= limit)
}

/// Copy `width` columns starting at `x`, clamped to the source bounds.
pub fn crop_columns(source: &Bitmap, x: u32, width: u32) -> Option<Bitmap> {
    if x >= source.width() {
        return None;
    }

    let width = width.min(source.width() - x);
    if width == 0 || source.height() == 0 {
        return None;
    }

    Some(imageops::crop_imm(source, x, 0, width, source.height()).to_image())
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::{
        COMPOSITE_MAX_ALPHA, CROP_MAX_ALPHA, crop_columns, is_transparent,
    };

    fn filled(width: u32, height: u32, alpha: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, alpha]))
    }

    #[test]
    fn given_fully_clear_image_then_transparent_at_any_tolerance() {
        let bitmap = filled(4, 2, 0);

        assert!(is_transparent(&bitmap, CROP_MAX_ALPHA));
        assert!(is_transparent(&bitmap, COMPOSITE_MAX_ALPHA));
    }

    #[test]
    fn given_faint_image_then_only_tolerant_check_calls_it_blank() {
        let bitmap = filled(4, 2, 200);

        assert!(!is_transparent(&bitmap, CROP_MAX_ALPHA));
        assert!(is_transparent(&bitmap, COMPOSITE_MAX_ALPHA));
    }

    #[test]
    fn given_single_opaque_pixel_then_not_transparent() {
        let mut bitmap = filled(4, 2, 0);
        bitmap.put_pixel(3, 1, Rgba([0, 0, 0, 255]));

        assert!(!is_transparent(&bitmap, COMPOSITE_MAX_ALPHA));
    }

    #[test]
    fn given_empty_image_then_transparent() {
        assert!(is_transparent(&RgbaImage::new(0, 0), CROP_MAX_ALPHA));
    }

    #[test]
    fn given_crop_past_right_edge_then_width_is_clamped() {
        let bitmap = filled(10, 3, 255);

        let crop = crop_columns(&bitmap, 6, 8).expect("crop should exist");

        assert_eq!(crop.dimensions(), (4, 3));
        assert!(crop_columns(&bitmap, 10, 2).is_none());
    }
}
