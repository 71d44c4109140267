use crate::consts::NEAREST_NONE;
use crate::footprint::Footprint;
use crate::geom::Box2I;
use crate::image::Image;

/// Manhattan-distance nearest-footprint transform over `bbox`.
///
/// Returns `(argmin, dist)`: for every pixel of `bbox`, the index of the
/// closest footprint in `foots` (Manhattan metric) and the distance to it.
/// Pixels no footprint reaches carry `NEAREST_NONE` in `argmin`, which
/// cannot happen if any footprint is nonempty.
///
/// Two-pass chamfer: stamp every footprint, then relax from the north and
/// west neighbours in a forward raster scan and from the south and east
/// neighbours in a backward scan. Only strict improvements are adopted, so
/// ties resolve deterministically in that neighbour order.
pub fn nearest_footprint(foots: &[&Footprint], bbox: Box2I) -> (Image<u16>, Image<u16>) {
    debug_assert!(foots.len() < NEAREST_NONE as usize);

    let mut argmin = Image::<u16>::zeros(bbox);
    let mut dist = Image::<u16>::zeros(bbox);

    for (i, foot) in foots.iter().enumerate() {
        foot.spans().stamp(&mut argmin, i as u16);
        foot.spans().stamp(&mut dist, 1);
    }

    let width = bbox.width();
    let height = bbox.height();
    // Upper bound on any in-box Manhattan distance.
    let far = (width + height) as u16;

    // Forward: bottom-left to top-right.
    for y in bbox.min_y()..=bbox.max_y() {
        for x in bbox.min_x()..=bbox.max_x() {
            if dist.get(x, y) == 1 {
                // Stamped on the first pass; it is its own nearest pixel.
                dist.set(x, y, 0);
                continue;
            }
            let mut d = far;
            let mut a = NEAREST_NONE;
            if y > bbox.min_y() {
                let nd = dist.get(x, y - 1) + 1;
                if nd < d {
                    d = nd;
                    a = argmin.get(x, y - 1);
                }
            }
            if x > bbox.min_x() {
                let nd = dist.get(x - 1, y) + 1;
                if nd < d {
                    d = nd;
                    a = argmin.get(x - 1, y);
                }
            }
            dist.set(x, y, d);
            argmin.set(x, y, a);
        }
    }

    // Backward: top-right to bottom-left.
    for y in (bbox.min_y()..=bbox.max_y()).rev() {
        for x in (bbox.min_x()..=bbox.max_x()).rev() {
            if y < bbox.max_y() {
                let nd = dist.get(x, y + 1) + 1;
                if nd < dist.get(x, y) {
                    dist.set(x, y, nd);
                    argmin.set(x, y, argmin.get(x, y + 1));
                }
            }
            if x < bbox.max_x() {
                let nd = dist.get(x + 1, y) + 1;
                if nd < dist.get(x, y) {
                    dist.set(x, y, nd);
                    argmin.set(x, y, argmin.get(x + 1, y));
                }
            }
        }
    }

    (argmin, dist)
}
