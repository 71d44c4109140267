mod common;

use common::{footprint_from_spans, pixel_set};
use umbra_core::deblend::symmetrize_footprint;
use umbra_core::footprint::{Footprint, PeakSchema, SpanSet};
use umbra_core::geom::Span;

/// Brute-force reference: pixels of `foot` whose mirror through (cx, cy)
/// is also a member.
fn naive_symmetrize(foot: &Footprint, cx: i32, cy: i32) -> Vec<(i32, i32)> {
    let mut px: Vec<(i32, i32)> = foot
        .spans()
        .pixels()
        .filter(|&(x, y)| foot.contains(2 * cx - x, 2 * cy - y))
        .collect();
    px.sort_by_key(|&(x, y)| (y, x));
    px
}

#[test]
fn test_single_span_symmetric_about_center() {
    // Seed: span y=0, x in [0,4], peak (2,0) is its own mirror image.
    let foot = footprint_from_spans(&[(0, 0, 4)]);
    let sym = symmetrize_footprint(&foot, 2, 0).unwrap();
    assert_eq!(sym.spans().spans(), &[Span::new(0, 0, 4)]);
}

#[test]
fn test_off_center_peak_clips_span() {
    let foot = footprint_from_spans(&[(0, 0, 4)]);
    let sym = symmetrize_footprint(&foot, 1, 0).unwrap();
    assert_eq!(sym.spans().spans(), &[Span::new(0, 0, 2)]);
}

#[test]
fn test_unmirrored_row_is_dropped() {
    // Seed: two rows, peak on the lower one; row y=1 has no mirror row
    // y=-1 in the footprint and must vanish.
    let foot = footprint_from_spans(&[(0, 0, 2), (1, 0, 2)]);
    let sym = symmetrize_footprint(&foot, 1, 0).unwrap();
    assert_eq!(sym.spans().spans(), &[Span::new(0, 0, 2)]);
}

#[test]
fn test_peak_on_first_pixel_of_first_span() {
    let foot = footprint_from_spans(&[(0, 2, 5)]);
    let sym = symmetrize_footprint(&foot, 2, 0).unwrap();
    assert_eq!(sym.spans().spans(), &[Span::new(0, 2, 2)]);
}

#[test]
fn test_peak_outside_footprint_returns_none() {
    let foot = footprint_from_spans(&[(0, 0, 4), (1, 0, 4)]);
    assert!(symmetrize_footprint(&foot, 7, 0).is_none());
    assert!(symmetrize_footprint(&foot, 2, 5).is_none());
}

#[test]
fn test_empty_footprint_returns_none() {
    let foot = Footprint::new(SpanSet::new());
    assert!(symmetrize_footprint(&foot, 0, 0).is_none());
}

#[test]
fn test_matches_brute_force_on_ragged_footprint() {
    let foot = footprint_from_spans(&[
        (0, 0, 4),
        (1, 2, 7),
        (2, 0, 1),
        (2, 4, 6),
        (3, 3, 3),
        (4, 0, 5),
    ]);
    let (cx, cy) = (4, 2);
    assert!(foot.contains(cx, cy));
    let sym = symmetrize_footprint(&foot, cx, cy).unwrap();
    assert_eq!(pixel_set(&sym), naive_symmetrize(&foot, cx, cy));
}

#[test]
fn test_output_is_symmetric_about_peak() {
    let foot = footprint_from_spans(&[(0, 1, 6), (1, 0, 3), (1, 5, 8), (2, 2, 6), (3, 2, 4)]);
    let (cx, cy) = (3, 1);
    let sym = symmetrize_footprint(&foot, cx, cy).unwrap();
    for (x, y) in sym.spans().pixels() {
        assert!(
            sym.contains(2 * cx - x, 2 * cy - y),
            "pixel ({x},{y}) has no mirror in the symmetrized footprint"
        );
    }
}

#[test]
fn test_symmetrize_is_idempotent() {
    let foot = footprint_from_spans(&[(0, 0, 4), (1, 2, 7), (2, 0, 1), (2, 4, 6), (3, 0, 5)]);
    let (cx, cy) = (4, 1);
    assert!(foot.contains(cx, cy));
    let once = symmetrize_footprint(&foot, cx, cy).unwrap();
    let twice = symmetrize_footprint(&once, cx, cy).unwrap();
    assert_eq!(once.spans().spans(), twice.spans().spans());
}

#[test]
fn test_peak_schema_is_inherited() {
    let mut foot = footprint_from_spans(&[(0, 0, 4)]);
    foot.set_peak_schema(PeakSchema::new(vec!["id".into(), "flux".into()]));
    let sym = symmetrize_footprint(&foot, 2, 0).unwrap();
    assert_eq!(sym.peak_schema(), foot.peak_schema());
    assert!(sym.peaks().is_empty());
}
