use num_traits::Float;

use crate::error::{Result, UmbraError};
use crate::footprint::{Footprint, HeavyFootprint};
use crate::image::{Image, MaskedImage};

use super::options::ASSIGN_STRAYFLUX;
use super::stray::find_stray_flux;

/// Result of `apportion_flux`: one flux portion per template, plus the
/// stray flux assigned to each template when the stray pass ran (empty
/// otherwise).
#[derive(Debug)]
pub struct ApportionResult<T> {
    pub portions: Vec<MaskedImage<T>>,
    pub strays: Vec<Option<HeavyFootprint<T>>>,
}

/// Accumulate `tsum += max(0, timg)` for every template, over the
/// intersection of each template's bbox with `tsum`'s.
///
/// Templates may extend beyond the parent footprint when their edges were
/// ramped; the clip makes that explicit.
pub fn sum_templates<T: Float>(timgs: &[Image<T>], tsum: &mut Image<T>) {
    let sumbb = tsum.bbox();
    for timg in timgs {
        let tbb = timg.bbox().clipped(&sumbb);
        for y in tbb.min_y()..=tbb.max_y() {
            for x in tbb.min_x()..=tbb.max_x() {
                let v = timg.get(x, y).max(T::zero());
                let acc = tsum.get(x, y) + v;
                tsum.set(x, y, acc);
            }
        }
    }
}

/// Split the parent flux inside `foot` among the templates.
///
/// At every pixel where the template sum is positive, template `i` receives
/// `parent * max(0, timg_i) / tsum`; mask and variance are carried over
/// from the parent. Pixels the templates do not cover are left at zero and
/// handled by the stray flux pass when `ASSIGN_STRAYFLUX` is set in
/// `options`.
///
/// `tsum`, if supplied, must contain the parent footprint and is filled
/// with the template sum as an extra output; otherwise one is allocated
/// over the footprint's bounding box internally.
///
/// `ispsf` may be empty; when nonempty it, `pkx` and `pky` must match the
/// template count (checked only when the stray pass runs, which is the
/// only consumer).
#[allow(clippy::too_many_arguments)]
pub fn apportion_flux<T: Float>(
    img: &MaskedImage<T>,
    foot: &Footprint,
    timgs: &[Image<T>],
    tfoots: &[Footprint],
    tsum: Option<&mut Image<T>>,
    ispsf: &[bool],
    pkx: &[i32],
    pky: &[i32],
    options: u32,
    clip_stray_flux_fraction: f64,
) -> Result<ApportionResult<T>> {
    if timgs.len() != tfoots.len() {
        return Err(UmbraError::LengthMismatch {
            what: "template images vs template footprints",
            got: timgs.len(),
            expected: tfoots.len(),
        });
    }
    for (timg, tfoot) in timgs.iter().zip(tfoots) {
        if !timg.bbox().contains_box(&tfoot.bbox()) {
            return Err(UmbraError::Bounds(format!(
                "template image {:?} must contain template footprint {:?}",
                timg.bbox(),
                tfoot.bbox()
            )));
        }
    }
    if !img.bbox().contains_box(&foot.bbox()) {
        return Err(UmbraError::Bounds(format!(
            "image {:?} must contain parent footprint {:?}",
            img.bbox(),
            foot.bbox()
        )));
    }

    let mut local_tsum;
    let tsum: &mut Image<T> = match tsum {
        Some(t) => {
            if !t.bbox().contains_box(&foot.bbox()) {
                return Err(UmbraError::Bounds(format!(
                    "template sum image {:?} must contain parent footprint {:?}",
                    t.bbox(),
                    foot.bbox()
                )));
            }
            t
        }
        None => {
            local_tsum = Image::zeros(foot.bbox());
            &mut local_tsum
        }
    };

    sum_templates(timgs, tsum);

    let sumbb = tsum.bbox();
    let mut portions = Vec::with_capacity(timgs.len());
    for timg in timgs {
        // Fresh portion congruent with the template; uncovered pixels stay
        // at zero.
        let mut port = MaskedImage::<T>::with_planes(timg.bbox(), img.mask.planes().clone());

        let tbb = timg.bbox().clipped(&sumbb);
        for y in tbb.min_y()..=tbb.max_y() {
            for x in tbb.min_x()..=tbb.max_x() {
                let tsum_v = tsum.get(x, y);
                if tsum_v == T::zero() {
                    continue;
                }
                let frac = timg.get(x, y).max(T::zero()) / tsum_v;
                port.image.set(x, y, img.image.get(x, y) * frac);
                port.mask.set(x, y, img.mask.get(x, y));
                port.variance.set(x, y, img.variance.get(x, y));
            }
        }
        portions.push(port);
    }

    let mut strays = Vec::new();
    if options & ASSIGN_STRAYFLUX != 0 {
        if !ispsf.is_empty() && ispsf.len() != timgs.len() {
            return Err(UmbraError::LengthMismatch {
                what: "ispsf vs templates",
                got: ispsf.len(),
                expected: timgs.len(),
            });
        }
        if pkx.len() != timgs.len() || pky.len() != timgs.len() {
            return Err(UmbraError::LengthMismatch {
                what: "peak coordinates vs templates",
                got: pkx.len().max(pky.len()),
                expected: timgs.len(),
            });
        }
        strays = find_stray_flux(
            foot,
            tsum,
            img,
            options,
            tfoots,
            ispsf,
            pkx,
            pky,
            clip_stray_flux_fraction,
        )?;
    }

    Ok(ApportionResult { portions, strays })
}
