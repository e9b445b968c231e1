use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC1, CV_8UC3},
    imgproc::{rectangle, FILLED, LINE_8},
    prelude::*,
};
use rubbing_scan::{BorderFill, CropMode, RasterInput, SegmentConfig, Segmenter};

/// A4 page at 150 dpi with a grid of six outlines and their numerals
fn synthetic_page(mat_type: i32) -> Mat {
    let mut page = Mat::new_rows_cols_with_default(1754, 1240, mat_type, Scalar::all(255.0)).unwrap();
    for row in 0..3 {
        for col in 0..2 {
            let x = 100 + col * 560;
            let y = 100 + row * 540;
            rectangle(&mut page, Rect::new(x, y, 440, 380), Scalar::all(0.0), 6, LINE_8, 0).unwrap();
            rectangle(&mut page, Rect::new(x + 200, y + 430, 30, 20), Scalar::all(0.0), FILLED, LINE_8, 0)
                .unwrap();
        }
    }
    page
}

fn benchmark_segmentation(c: &mut Criterion) {
    let gray = synthetic_page(CV_8UC1);
    let color = synthetic_page(CV_8UC3);

    let rect = Segmenter::new(SegmentConfig::default()).unwrap();
    let poly = Segmenter::new(SegmentConfig::new(
        (200, 150),
        CropMode::Polygon,
        BorderFill::Transparent,
    ))
    .unwrap();

    c.bench_function("segment_gray_rect_white", |b| {
        b.iter(|| {
            let input = RasterInput::Array(gray.try_clone().unwrap());
            black_box(rect.segment(input).unwrap())
        })
    });

    c.bench_function("segment_color_poly_transparent", |b| {
        b.iter(|| {
            let input = RasterInput::Array(color.try_clone().unwrap());
            black_box(poly.segment(input).unwrap())
        })
    });
}

criterion_group!(benches, benchmark_segmentation);
criterion_main!(benches);
