use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use perch_imagery::{
    COMPOSITE_MAX_ALPHA, CROP_MAX_ALPHA, crop_columns, is_transparent,
};

fn bench_composite_check(c: &mut Criterion) {
    // A retina-sized strip of faint pixels forces a full scan.
    let composite = RgbaImage::from_pixel(1200, 48, Rgba([0, 0, 0, 180]));

    c.bench_function("composite_is_transparent_full_scan", |b| {
        b.iter(|| black_box(is_transparent(&composite, COMPOSITE_MAX_ALPHA)));
    });
}

fn bench_crop_and_check(c: &mut Criterion) {
    let composite = RgbaImage::from_pixel(1200, 48, Rgba([20, 20, 20, 255]));

    c.bench_function("crop_forty_items", |b| {
        b.iter(|| {
            let mut kept = 0;
            for index in 0..40 {
                if let Some(crop) = crop_columns(&composite, index * 30, 30) {
                    if !is_transparent(&crop, CROP_MAX_ALPHA) {
                        kept += 1;
                    }
                }
            }
            black_box(kept);
        });
    });
}

criterion_group!(imagery, bench_composite_check, bench_crop_and_check);
criterion_main!(imagery);
