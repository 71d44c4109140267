mod common;

use common::{footprint_from_spans, image_from_rows, masked_image};
use umbra_core::footprint::{Footprint, HeavyFootprint, SpanSet};
use umbra_core::geom::{Box2I, Span};
use umbra_core::image::MaskedImage;

#[test]
fn test_area_and_bbox() {
    let foot = footprint_from_spans(&[(0, 0, 4), (2, 3, 3)]);
    assert_eq!(foot.area(), 6);
    assert_eq!(foot.bbox(), Box2I::from_min_max(0, 0, 4, 2));
}

#[test]
fn test_edge_pixels_of_footprint_with_hole() {
    // 3x3 square minus its centre: every remaining pixel is an edge pixel.
    let foot = footprint_from_spans(&[(0, 0, 2), (1, 0, 0), (1, 2, 2), (2, 0, 2)]);
    let edges = foot.spans().edge_pixels();
    assert_eq!(edges.area(), 8);
    assert!(!edges.contains(1, 1));
}

#[test]
fn test_spanset_stamp_clips_to_image() {
    let spans = SpanSet::from_spans(vec![Span::new(0, -2, 4), Span::new(9, 0, 1)]);
    let mut img = umbra_core::image::Image::<u16>::zeros(Box2I::new(0, 0, 3, 2));
    spans.stamp(&mut img, 7);
    assert_eq!(img.get(0, 0), 7);
    assert_eq!(img.get(2, 0), 7);
    assert_eq!(img.get(0, 1), 0);
}

#[test]
fn test_heavy_reads_values_in_span_order() {
    let mut img = masked_image(image_from_rows(
        0,
        0,
        &[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]],
    ));
    img.mask.set(1, 0, 0b10);
    img.variance.set(1, 0, 0.25);

    let foot = footprint_from_spans(&[(0, 0, 2), (1, 1, 1)]);
    let heavy = HeavyFootprint::from_masked_image(foot, &img).unwrap();

    assert_eq!(heavy.image_array(), &[1.0, 2.0, 3.0, 5.0]);
    assert_eq!(heavy.mask_array(), &[0, 0b10, 0, 0]);
    assert_eq!(heavy.variance_array(), &[1.0, 0.25, 1.0, 1.0]);
    assert!((heavy.total_flux() - 11.0).abs() < 1e-6);
}

#[test]
fn test_heavy_round_trip_through_insert() {
    let img = masked_image(image_from_rows(
        0,
        0,
        &[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]],
    ));
    let foot = footprint_from_spans(&[(0, 1, 2), (1, 0, 1)]);
    let heavy = HeavyFootprint::from_masked_image(foot, &img).unwrap();

    let mut blank = MaskedImage::<f32>::new(img.bbox());
    heavy.insert_into(&mut blank);
    for (x, y) in heavy.footprint().spans().pixels() {
        assert_eq!(blank.image.get(x, y), img.image.get(x, y));
    }
    // Pixels outside the footprint stay blank.
    assert_eq!(blank.image.get(0, 0), 0.0);
    assert_eq!(blank.image.get(2, 1), 0.0);
}

#[test]
fn test_heavy_requires_containing_image() {
    let img = masked_image(image_from_rows(0, 0, &[&[1.0, 2.0]]));
    let foot = footprint_from_spans(&[(0, 0, 4)]);
    assert!(HeavyFootprint::from_masked_image(foot, &img).is_err());
}

#[test]
fn test_derived_footprint_starts_without_peaks() {
    let foot = Footprint::with_schema(
        SpanSet::from_spans(vec![Span::new(0, 0, 1)]),
        Default::default(),
    );
    assert!(foot.peaks().is_empty());
    assert_eq!(foot.area(), 2);
}
