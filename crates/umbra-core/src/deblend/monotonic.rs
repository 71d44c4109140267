use num_traits::Float;

use crate::consts::{SHADOW_CHUNK, SHADOW_WEDGE_SLOPE};
use crate::footprint::Peak;
use crate::image::Image;

/// Force a template profile to decrease away from the peak.
///
/// Each pixel "casts a shadow" over a wedge of pixels farther from the peak
/// in the same direction, clamping them to at most its own value. Pixels
/// are visited in square rings of increasing Chebyshev radius. Shadowed
/// pixels only start shadowing after a full chunk of `SHADOW_CHUNK` rings:
/// the reads come from an auxiliary copy refreshed once per chunk, which
/// keeps the effective wedge from widening with every ring.
pub fn make_monotonic<T: Float>(img: &mut Image<T>, peak: &Peak) {
    let cx = peak.ix;
    let cy = peak.iy;
    let bbox = img.bbox();

    let mut shadowing = img.clone();

    // Largest horizontal/vertical pixel distance from the peak to the
    // image boundary.
    let dw = (cx - bbox.min_x()).max(bbox.min_x() + bbox.width() - cx);
    let dh = (cy - bbox.min_y()).max(bbox.min_y() + bbox.height() - cy);

    let s_max = dw.max(dh);
    let chunk = SHADOW_CHUNK;
    let a = SHADOW_WEDGE_SLOPE;

    let mut s = 0;
    while s < s_max {
        for p in 0..chunk {
            // Walk the ring of Chebyshev radius L counter-clockwise from
            // the bottom-right corner: up, left, down, right, changing
            // direction every 2L steps (8L pixels total).
            let l = s + p;
            let mut x = l;
            let mut y = -l;
            let mut dx = 0;
            let mut dy = 0;
            for i in 0..8 * l {
                if i % (2 * l) == 0 {
                    let leg = i / (2 * l);
                    dx = (leg % 2) * (-1 + 2 * (leg / 2));
                    dy = ((leg + 1) % 2) * (1 - 2 * (leg / 2));
                }

                let px = cx + x;
                let py = cy + y;
                if bbox.contains(px, py) {
                    // The pixel casting the shadow.
                    let pix = shadowing.get(px, py);

                    if dx == 0 {
                        // Vertical ring edge: x = +-L, never zero. The
                        // wedge covers slopes [y/x - a, y/x + a] over the
                        // next `chunk` columns outward.
                        let ds0 = y as f64 / x as f64 - a;
                        let ds1 = ds0 + 2.0 * a;
                        let xsign = if x > 0 { 1 } else { -1 };
                        for shx in 1..=chunk {
                            let psx = cx + x + xsign * shx;
                            if psx < bbox.min_x() || psx > bbox.max_x() {
                                continue;
                            }
                            let shy0 = (shx as f64 * ds0).round() as i32;
                            let shy1 = (shx as f64 * ds1).round() as i32;
                            for shy in shy0..=shy1 {
                                let psy = cy + y + xsign * shy;
                                if psy < bbox.min_y() || psy > bbox.max_y() {
                                    continue;
                                }
                                let clamped = img.get(psx, psy).min(pix);
                                img.set(psx, psy, clamped);
                            }
                        }
                    } else {
                        // Horizontal ring edge: y = +-L.
                        let ds0 = x as f64 / y as f64 - a;
                        let ds1 = ds0 + 2.0 * a;
                        let ysign = if y > 0 { 1 } else { -1 };
                        for shy in 1..=chunk {
                            let psy = cy + y + ysign * shy;
                            if psy < bbox.min_y() || psy > bbox.max_y() {
                                continue;
                            }
                            let shx0 = (shy as f64 * ds0).round() as i32;
                            let shx1 = (shy as f64 * ds1).round() as i32;
                            for shx in shx0..=shx1 {
                                let psx = cx + x + ysign * shx;
                                if psx < bbox.min_x() || psx > bbox.max_x() {
                                    continue;
                                }
                                let clamped = img.get(psx, psy).min(pix);
                                img.set(psx, psy, clamped);
                            }
                        }
                    }
                }

                x += dx;
                y += dy;
            }
        }
        // Updates from this chunk become shadowers for the next one.
        shadowing.assign(img);
        s += chunk;
    }
}
