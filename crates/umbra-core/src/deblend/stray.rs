use num_traits::Float;

use crate::consts::NEAREST_NONE;
use crate::error::Result;
use crate::footprint::{Footprint, HeavyFootprint, PeakSchema, SpanSet};
use crate::geom::Span;
use crate::image::{Image, MaskPixel, MaskedImage};

use super::chamfer::nearest_footprint;
use super::options::{
    STRAYFLUX_NEAREST_FOOTPRINT, STRAYFLUX_R_TO_FOOTPRINT, STRAYFLUX_TO_POINT_SOURCES_ALWAYS,
    STRAYFLUX_TO_POINT_SOURCES_WHEN_NECESSARY,
};

/// 1/(1+r^2) weight of a pixel against the nearest span of a footprint.
///
/// The per-span distance decomposes into the x gap to the span's range
/// (zero when the span covers the pixel's column) and the row offset.
fn contrib_r_to_footprint(x: i32, y: i32, tfoot: &Footprint) -> f64 {
    let mut minr2 = 1e12;
    for sp in tfoot.spans().iter() {
        let mindx = if sp.x0 - x >= 0 {
            // Span to the right of the pixel.
            sp.x0 - x
        } else if x - sp.x1 >= 0 {
            // Span to the left.
            x - sp.x1
        } else {
            0
        };
        let dy = sp.y - y;
        minr2 = minr2.min((mindx * mindx + dy * dy) as f64);
    }
    1.0 / (1.0 + minr2)
}

/// Per-pixel accumulators for one template's stray flux, kept strictly in
/// span iteration order so the final HeavyFootprint arrays line up with
/// its spans.
struct StrayAccumulator<T> {
    spans: Vec<Span>,
    image: Vec<T>,
    mask: Vec<MaskPixel>,
    variance: Vec<T>,
}

impl<T> Default for StrayAccumulator<T> {
    fn default() -> Self {
        Self {
            spans: Vec::new(),
            image: Vec::new(),
            mask: Vec::new(),
            variance: Vec::new(),
        }
    }
}

impl<T: Float> StrayAccumulator<T> {
    fn push(&mut self, x: i32, y: i32, value: T, mask: MaskPixel, variance: T) {
        self.spans.push(Span::new(y, x, x));
        self.image.push(value);
        self.mask.push(mask);
        self.variance.push(variance);
    }

    /// Finalise spans and values together; `None` if nothing was assigned.
    fn into_heavy(self, schema: &PeakSchema) -> Result<Option<HeavyFootprint<T>>> {
        if self.spans.is_empty() {
            return Ok(None);
        }
        let foot = Footprint::with_schema(
            SpanSet::from_sorted_disjoint(self.spans),
            schema.clone(),
        );
        HeavyFootprint::from_parts(foot, self.image, self.mask, self.variance).map(Some)
    }
}

/// Distribute stray flux: positive parent pixels no template covers.
///
/// For each stray pixel, per-template contributions follow exactly one
/// policy (`STRAYFLUX_NEAREST_FOOTPRINT`, `STRAYFLUX_R_TO_FOOTPRINT`, or
/// the default 1/(1+r^2) to each peak), point sources are gated by the
/// `..._ALWAYS` / `..._WHEN_NECESSARY` bits, and contributions below
/// `clip_stray_flux_fraction` of the total are dropped. Each retained
/// template receives its proportional share of the pixel, with parent mask
/// and variance carried along.
///
/// Returns one `Option<HeavyFootprint>` per template; `None` where nothing
/// was assigned. Spans and value arrays are built together, pixel by
/// pixel, so array index k always corresponds to the k-th span.
#[allow(clippy::too_many_arguments)]
pub fn find_stray_flux<T: Float>(
    foot: &Footprint,
    tsum: &Image<T>,
    img: &MaskedImage<T>,
    options: u32,
    tfoots: &[Footprint],
    ispsf: &[bool],
    pkx: &[i32],
    pky: &[i32],
    clip_stray_flux_fraction: f64,
) -> Result<Vec<Option<HeavyFootprint<T>>>> {
    let n = tfoots.len();
    let always = options & STRAYFLUX_TO_POINT_SOURCES_ALWAYS != 0;

    let mut accs: Vec<StrayAccumulator<T>> = (0..n).map(|_| StrayAccumulator::default()).collect();

    // Map of which footprint is closest to each pixel, if requested. Unless
    // point sources always participate, they are replaced by an empty
    // footprint first so stray flux maps only to extended sources.
    let nearest = if options & STRAYFLUX_NEAREST_FOOTPRINT != 0 {
        let empty = Footprint::with_schema(SpanSet::new(), foot.peak_schema().clone());
        let footlist: Vec<&Footprint> = if !always && !ispsf.is_empty() {
            tfoots
                .iter()
                .enumerate()
                .map(|(i, f)| if ispsf[i] { &empty } else { f })
                .collect()
        } else {
            tfoots.iter().collect()
        };
        let (argmin, _dist) = nearest_footprint(&footlist, tsum.bbox());
        Some(argmin)
    } else {
        None
    };

    let mut contrib = vec![0.0f64; n];
    let is_psf = |i: usize| !ispsf.is_empty() && ispsf[i];

    for sp in foot.spans().iter() {
        let y = sp.y;
        for x in sp.x0..=sp.x1 {
            let in_pix = img.image.get(x, y);
            // Skip pixels claimed by a template or without positive flux.
            if tsum.get(x, y) > T::zero() || in_pix <= T::zero() {
                continue;
            }

            if options & STRAYFLUX_R_TO_FOOTPRINT != 0 {
                // Materialised just in time below.
                contrib.iter_mut().for_each(|c| *c = -1.0);
            } else if let Some(argmin) = &nearest {
                contrib.iter_mut().for_each(|c| *c = 0.0);
                let i = argmin.get(x, y);
                if i != NEAREST_NONE {
                    contrib[i as usize] = 1.0;
                }
            } else {
                for (i, c) in contrib.iter_mut().enumerate() {
                    let dx = (pkx[i] - x) as f64;
                    let dy = (pky[i] - y) as f64;
                    *c = 1.0 / (1.0 + dx * dx + dy * dy);
                }
            }

            // Round 1: point sources sit out unless always included.
            let mut ptsrcs = always;
            let mut csum = 0.0;
            for i in 0..n {
                if !ptsrcs && is_psf(i) {
                    continue;
                }
                if contrib[i] == -1.0 {
                    contrib[i] = contrib_r_to_footprint(x, y, &tfoots[i]);
                }
                csum += contrib[i];
            }
            if csum == 0.0 && options & STRAYFLUX_TO_POINT_SOURCES_WHEN_NECESSARY != 0 {
                // No extended sources took anything; let point sources in.
                ptsrcs = true;
                for i in 0..n {
                    if contrib[i] == -1.0 {
                        contrib[i] = contrib_r_to_footprint(x, y, &tfoots[i]);
                    }
                    csum += contrib[i];
                }
            }

            // Round 2: drop small contributions and re-normalise.
            let strayclip = clip_stray_flux_fraction * csum;
            csum = 0.0;
            for i in 0..n {
                if !ptsrcs && is_psf(i) {
                    contrib[i] = 0.0;
                    continue;
                }
                if contrib[i] < strayclip {
                    contrib[i] = 0.0;
                    continue;
                }
                csum += contrib[i];
            }

            for i in 0..n {
                if contrib[i] == 0.0 {
                    continue;
                }
                let share = contrib[i] / csum * in_pix.to_f64().unwrap_or(0.0);
                let share = T::from(share).unwrap_or_else(T::zero);
                accs[i].push(x, y, share, img.mask.get(x, y), img.variance.get(x, y));
            }
        }
    }

    accs.into_iter()
        .map(|acc| acc.into_heavy(foot.peak_schema()))
        .collect()
}
