use tracing::{debug, warn};

use crate::footprint::{Footprint, SpanSet};
use crate::geom::Span;

/// A cursor over an ordered span slice that reports span extents in
/// peak-relative coordinates.
///
/// A forward cursor walks toward greater (y, x); a backward cursor walks
/// toward lesser. The backward cursor mirrors its x extents through the
/// peak, so both cursors advance "rightward" in mirrored coordinates and
/// the overlap search below reads the same for either direction.
#[derive(Clone, Copy)]
struct MirrorCursor<'a> {
    spans: &'a [Span],
    idx: isize,
    cx: i32,
    cy: i32,
    forward: bool,
}

impl<'a> MirrorCursor<'a> {
    fn new(spans: &'a [Span], idx: usize, cx: i32, cy: i32, forward: bool) -> Self {
        Self {
            spans,
            idx: idx as isize,
            cx,
            cy,
            forward,
        }
    }

    fn not_done(&self) -> bool {
        if self.forward {
            self.idx < self.spans.len() as isize
        } else {
            self.idx >= 0
        }
    }

    fn advance(&mut self) {
        self.idx += if self.forward { 1 } else { -1 };
    }

    fn at(&self, other: &MirrorCursor<'_>) -> bool {
        self.idx == other.idx
    }

    fn span(&self) -> &Span {
        &self.spans[self.idx as usize]
    }

    /// Low edge of the span, in mirrored peak-relative x.
    fn dxlo(&self) -> i32 {
        if self.forward {
            self.span().x0 - self.cx
        } else {
            self.cx - self.span().x1
        }
    }

    /// High edge of the span, in mirrored peak-relative x.
    fn dxhi(&self) -> i32 {
        if self.forward {
            self.span().x1 - self.cx
        } else {
            self.cx - self.span().x0
        }
    }

    /// Row distance from the peak.
    fn dy(&self) -> i32 {
        (self.span().y - self.cy).abs()
    }
}

/// Locate the index of the span containing `(cx, cy)`, or `None` with a
/// warning if the peak lies outside the footprint.
fn find_peak_span(spans: &[Span], cx: i32, cy: i32) -> Option<usize> {
    if spans.is_empty() {
        warn!("failed to find span containing ({cx},{cy}): footprint is empty");
        return None;
    }
    let target = Span::new(cy, cx, cx);
    // First span strictly greater than the single-pixel target; the
    // containing span, if any, is at idx-1, or at idx when the peak sits on
    // the first pixel of a longer span.
    let idx = spans.partition_point(|s| *s <= target);
    if idx == 0 {
        if spans[0].contains(cx, cy) {
            return Some(0);
        }
        warn!("failed to find span containing ({cx},{cy}): before the beginning of this footprint");
        return None;
    }
    if spans[idx - 1].contains(cx, cy) {
        return Some(idx - 1);
    }
    if idx < spans.len() && spans[idx].contains(cx, cy) {
        return Some(idx);
    }
    let near = spans[idx - 1];
    warn!(
        "failed to find span containing ({cx},{cy}): nearest is y={}, x=[{},{}]",
        near.y, near.x0, near.x1
    );
    None
}

/// The AND of a footprint and its 180-degree rotation about `(cx, cy)`:
/// the pixel set `{ (x, y) in foot : (2cx - x, 2cy - y) in foot }`.
///
/// Returns `None` (after logging a warning) when the peak does not lie
/// inside the footprint. The result carries the parent's peak schema and
/// no peaks.
///
/// Linear in the number of spans: a forward and a backward cursor start at
/// the peak span and sweep outward row pair by row pair, emitting the
/// overlap of each mirrored span pair.
pub fn symmetrize_footprint(foot: &Footprint, cx: i32, cy: i32) -> Option<Footprint> {
    let spans = foot.spans().spans();
    let peak_idx = find_peak_span(spans, cx, cy)?;
    let sp = &spans[peak_idx];
    debug!(
        "span containing ({cx},{cy}): (x=[{},{}], y={})",
        sp.x0, sp.x1, sp.y
    );

    let mut fwd = MirrorCursor::new(spans, peak_idx, cx, cy, true);
    let mut back = MirrorCursor::new(spans, peak_idx, cx, cy, false);

    let mut dy = 0;
    let mut out: Vec<Span> = Vec::new();
    while fwd.not_done() && back.not_done() {
        let fy = cy + dy;
        let by = cy - dy;
        let fdxlo = fwd.dxlo();
        let bdxlo = back.dxlo();

        // End of the current row in each direction: the first span whose
        // row distance differs from dy.
        let mut fend = fwd;
        while fend.not_done() && fend.dy() == dy {
            fend.advance();
        }
        let mut bend = back;
        while bend.not_done() && bend.dy() == dy {
            bend.advance();
        }

        // Skip spans wholly left (in mirrored coordinates) of the partner.
        if bdxlo > fdxlo {
            while !fwd.at(&fend) && fwd.dxhi() < bdxlo {
                fwd.advance();
            }
        } else if fdxlo > bdxlo {
            while !back.at(&bend) && back.dxhi() < fdxlo {
                back.advance();
            }
        }

        if fwd.at(&fend) || back.at(&bend) {
            // No overlapping pair left in this row.
            fwd = fend;
            back = bend;
            dy += 1;
            continue;
        }

        // The overlapping part, if any.
        let dxlo = fwd.dxlo().max(back.dxlo());
        let dxhi = fwd.dxhi().min(back.dxhi());
        if dxlo <= dxhi {
            out.push(Span::new(fy, cx + dxlo, cx + dxhi));
            out.push(Span::new(by, cx - dxhi, cx - dxlo));
        }

        // Advance whichever span ends first; the forward cursor on a tie.
        if fwd.dxhi() <= back.dxhi() {
            fwd.advance();
        } else {
            back.advance();
        }

        if fwd.at(&fend) || back.at(&bend) {
            fwd = fend;
            back = bend;
            dy += 1;
        }
    }

    Some(Footprint::with_schema(
        SpanSet::from_spans(out),
        foot.peak_schema().clone(),
    ))
}
