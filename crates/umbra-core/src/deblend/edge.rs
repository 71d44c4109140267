use num_traits::Float;

use crate::footprint::{Footprint, SpanSet};
use crate::geom::Span;
use crate::image::Image;

/// True if any edge pixel of `sfoot` (a member pixel whose 4-neighbourhood
/// includes a non-member) has an image value at or above `thresh`.
///
/// Significant flux on a template's edge usually means its symmetric
/// partner pixels fell outside the footprint, e.g. clipped by an image
/// boundary.
pub fn has_significant_flux_at_edge<T: Float>(
    img: &Image<T>,
    sfoot: &Footprint,
    thresh: T,
) -> bool {
    let edges = sfoot.spans().edge_pixels();
    for sp in edges.iter() {
        for x in sp.x0..=sp.x1 {
            if img.get(x, sp.y) >= thresh {
                return true;
            }
        }
    }
    false
}

/// The edge pixels of `sfoot` whose image value is at or above `thresh`,
/// with consecutive qualifying pixels on a row grouped into single spans.
///
/// The result carries `sfoot`'s peak schema and no peaks.
pub fn get_significant_edge_pixels<T: Float>(
    img: &Image<T>,
    sfoot: &Footprint,
    thresh: T,
) -> Footprint {
    let mut runs: Vec<Span> = Vec::new();
    for sp in sfoot.spans().edge_pixels().iter() {
        let mut run_start: Option<i32> = None;
        for x in sp.x0..=sp.x1 {
            if img.get(x, sp.y) >= thresh {
                run_start.get_or_insert(x);
            } else if let Some(start) = run_start.take() {
                runs.push(Span::new(sp.y, start, x - 1));
            }
        }
        if let Some(start) = run_start {
            runs.push(Span::new(sp.y, start, sp.x1));
        }
    }
    Footprint::with_schema(SpanSet::from_spans(runs), sfoot.peak_schema().clone())
}
