use num_traits::Float;
use tracing::debug;

use crate::error::{Result, UmbraError};
use crate::footprint::{Footprint, Peak, SpanSet};
use crate::geom::Span;
use crate::image::{Image, MaskedImage};

use super::symmetrize::symmetrize_footprint;

/// Output of `build_symmetric_template`.
#[derive(Clone, Debug)]
pub struct TemplateResult<T> {
    /// The symmetric template pixels, over `footprint`'s bounding box.
    pub image: Image<T>,
    /// The symmetrized (and possibly edge-patched) footprint.
    pub footprint: Footprint,
    /// True if the footprint touched EDGE-masked pixels and patching ran.
    pub patched_edges: bool,
}

/// Build a symmetric template for one peak.
///
/// Every mirror pair of pixels in the symmetrized footprint receives the
/// smaller of the two input values, so
/// `out(c + d) = out(c - d) = min(in(c + d), in(c - d))`. With `min_zero`
/// the result is additionally clamped to zero from below.
///
/// With `patch_edge`, a footprint containing EDGE-masked pixels is grown
/// back over the spans whose mirrors fall outside the parent footprint's
/// bounding box, and the raw image values are kept there. The EDGE plane is
/// resolved by name and must be defined on the mask when this path runs.
///
/// Returns `Ok(None)` when the peak does not lie inside the footprint (no
/// symmetric template is available). `sigma1` is accepted for call
/// compatibility and currently unused.
pub fn build_symmetric_template<T: Float>(
    img: &MaskedImage<T>,
    foot: &Footprint,
    peak: &Peak,
    _sigma1: f64,
    min_zero: bool,
    patch_edge: bool,
) -> Result<Option<TemplateResult<T>>> {
    let cx = peak.ix;
    let cy = peak.iy;

    if !img.bbox().contains_box(&foot.bbox()) {
        return Err(UmbraError::Bounds(format!(
            "image {:?} too small for footprint {:?}",
            img.bbox(),
            foot.bbox()
        )));
    }

    let mut sfoot = match symmetrize_footprint(foot, cx, cy) {
        Some(f) => f,
        None => return Ok(None),
    };

    if !img.bbox().contains_box(&sfoot.bbox()) {
        return Err(UmbraError::Bounds(format!(
            "image {:?} too small for symmetrized footprint {:?}",
            img.bbox(),
            sfoot.bbox()
        )));
    }

    // Does the footprint touch an EDGE pixel?
    let mut touches_edge = false;
    if patch_edge {
        let edge_bit = img.mask.plane_bit_mask("EDGE")?;
        'scan: for sp in foot.spans().iter() {
            for x in sp.x0..=sp.x1 {
                if img.mask.get(x, sp.y) & edge_bit != 0 {
                    touches_edge = true;
                    break 'scan;
                }
            }
        }
        if touches_edge {
            debug!("footprint includes an EDGE pixel");
        }
    }

    let mut target = Image::<T>::zeros(sfoot.bbox());

    // Walk the symmetrized spans inward from both ends; by construction the
    // k-th span from the front mirrors the k-th span from the back.
    let spans = sfoot.spans().spans();
    if !spans.is_empty() {
        let mut f = 0;
        let mut b = spans.len() - 1;
        loop {
            let fs = spans[f];
            let bs = spans[b];
            let mut bx = bs.x1;
            for fx in fs.x0..=fs.x1 {
                let pix_f = img.image.get(fx, fs.y);
                let pix_b = img.image.get(bx, bs.y);
                let mut pix = pix_f.min(pix_b);
                if min_zero {
                    pix = pix.max(T::zero());
                }
                target.set(fx, fs.y, pix);
                target.set(bx, bs.y, pix);
                bx -= 1;
            }
            if f == b {
                break;
            }
            f += 1;
            b -= 1;
            if f > b {
                break;
            }
        }
    }

    if touches_edge {
        // Find spans whose mirrors fall outside the parent footprint's
        // bounding box, grow the template to include them, and keep the raw
        // image pixels there.
        let imbb = foot.bbox();
        let mut bb = sfoot.bbox();

        for sp in foot.spans().iter() {
            let ym = 2 * cy - sp.y;
            if !imbb.contains(2 * cx - sp.x0, ym) {
                bb.include(sp.x0, sp.y);
            }
            if !imbb.contains(2 * cx - sp.x1, ym) {
                bb.include(sp.x1, sp.y);
            }
        }
        debug!(
            "edge patching grows template bbox to [{},{}]x[{},{}]",
            bb.min_x(),
            bb.max_x(),
            bb.min_y(),
            bb.max_y()
        );

        let mut patched = Image::<T>::zeros(bb);
        for sp in sfoot.spans().iter() {
            for x in sp.x0..=sp.x1 {
                patched.set(x, sp.y, target.get(x, sp.y));
            }
        }

        let mut new_spans: Vec<Span> = sfoot.spans().spans().to_vec();
        for sp in foot.spans().iter() {
            let y = sp.y;
            let ym = 2 * cy - y;
            let in0 = imbb.contains(2 * cx - sp.x0, ym);
            let in1 = imbb.contains(2 * cx - sp.x1, ym);
            if in0 && in1 {
                continue;
            }
            // Clip to the subsegment whose mirror is out of bounds. Mirrored
            // x decreases as x increases, so an in-bounds low endpoint means
            // the out-of-bounds part starts where the mirror first walks off
            // the low edge, and vice versa.
            let mut x0 = sp.x0;
            let mut x1 = sp.x1;
            if in0 {
                x0 = 2 * cx - (imbb.min_x() - 1);
            }
            if in1 {
                x1 = 2 * cx - (imbb.max_x() + 1);
            }
            for x in x0..=x1 {
                patched.set(x, y, img.image.get(x, y));
            }
            new_spans.push(Span::new(y, x0, x1));
        }
        sfoot.set_spans(SpanSet::from_spans(new_spans));
        target = patched;
    }

    Ok(Some(TemplateResult {
        image: target,
        footprint: sfoot,
        patched_edges: touches_edge,
    }))
}
