mod common;

use common::{footprint_from_spans, image_from_rows};
use umbra_core::deblend::{get_significant_edge_pixels, has_significant_flux_at_edge};
use umbra_core::footprint::PeakSchema;
use umbra_core::geom::Span;

#[test]
fn test_flux_at_edge_is_detected() {
    // 3x3 footprint; every pixel but the centre is an edge pixel.
    let foot = footprint_from_spans(&[(0, 0, 2), (1, 0, 2), (2, 0, 2)]);
    let img = image_from_rows(
        0,
        0,
        &[
            &[0.0, 0.0, 0.0],
            &[0.0, 9.0, 0.0],
            &[0.0, 0.0, 5.0],
        ],
    );
    // Bright centre alone does not count.
    assert!(!has_significant_flux_at_edge(&img, &foot, 6.0));
    // The corner pixel qualifies at a lower threshold; the test is >=.
    assert!(has_significant_flux_at_edge(&img, &foot, 5.0));
    assert!(has_significant_flux_at_edge(&img, &foot, 1.0));
}

#[test]
fn test_single_row_is_all_edge() {
    let foot = footprint_from_spans(&[(0, 0, 4)]);
    let img = image_from_rows(0, 0, &[&[0.0, 0.0, 0.0, 2.0, 0.0]]);
    assert!(has_significant_flux_at_edge(&img, &foot, 2.0));
    assert!(!has_significant_flux_at_edge(&img, &foot, 2.5));
}

#[test]
fn test_significant_edge_pixels_group_into_runs() {
    let foot = footprint_from_spans(&[(0, 0, 4)]);
    let img = image_from_rows(0, 0, &[&[5.0, 5.0, 0.0, 5.0, 0.0]]);
    let out = get_significant_edge_pixels(&img, &foot, 1.0);
    assert_eq!(out.spans().spans(), &[Span::new(0, 0, 1), Span::new(0, 3, 3)]);
}

#[test]
fn test_interior_pixels_are_ignored() {
    let foot = footprint_from_spans(&[(0, 0, 2), (1, 0, 2), (2, 0, 2)]);
    let img = image_from_rows(
        0,
        0,
        &[
            &[0.0, 0.0, 0.0],
            &[0.0, 9.0, 0.0],
            &[0.0, 0.0, 0.0],
        ],
    );
    let out = get_significant_edge_pixels(&img, &foot, 1.0);
    assert!(out.is_empty());
}

#[test]
fn test_edge_footprint_carries_schema() {
    let mut foot = footprint_from_spans(&[(0, 0, 4)]);
    foot.set_peak_schema(PeakSchema::new(vec!["id".into()]));
    let img = image_from_rows(0, 0, &[&[5.0, 0.0, 0.0, 0.0, 0.0]]);
    let out = get_significant_edge_pixels(&img, &foot, 1.0);
    assert_eq!(out.peak_schema(), foot.peak_schema());
}
