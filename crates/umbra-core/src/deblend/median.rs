use std::cmp::Ordering;

use num_traits::Float;

use crate::error::{Result, UmbraError};
use crate::image::Image;

/// Spatial box median filter.
///
/// Each interior output pixel is the median of the (2*halfsize+1)^2 input
/// pixels centred on it, selected with `select_nth_unstable_by` rather than
/// a full sort. Pixels within `halfsize` of any edge are copied unchanged
/// from the input.
///
/// `input` and `output` must be congruent.
pub fn median_filter<T: Float>(
    input: &Image<T>,
    output: &mut Image<T>,
    halfsize: usize,
) -> Result<()> {
    if input.bbox() != output.bbox() {
        return Err(UmbraError::Bounds(format!(
            "median filter input {:?} and output {:?} must be congruent",
            input.bbox(),
            output.bbox()
        )));
    }

    // Borders (and everything, until the interior loop overwrites it).
    output.assign(input);

    let w = input.width();
    let h = input.height();
    let s = 2 * halfsize + 1;
    let ss = s * s;
    if w < s || h < s {
        return Ok(());
    }

    let x0 = input.x0();
    let y0 = input.y0();
    let hs = halfsize as i32;
    let mut vals = vec![T::zero(); ss];

    for row in halfsize..h - halfsize {
        let y = y0 + row as i32;
        for col in halfsize..w - halfsize {
            let x = x0 + col as i32;
            let mut k = 0;
            for dy in -hs..=hs {
                for dx in -hs..=hs {
                    vals[k] = input.get(x + dx, y + dy);
                    k += 1;
                }
            }
            let (_, mid, _) = vals.select_nth_unstable_by(ss / 2, |a, b| {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            });
            output.set(x, y, *mid);
        }
    }

    Ok(())
}
