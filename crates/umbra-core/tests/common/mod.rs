#![allow(dead_code)]

use umbra_core::footprint::{Footprint, SpanSet};
use umbra_core::geom::{Box2I, Span};
use umbra_core::image::{Image, MaskedImage};

/// Build a footprint from raw `(y, x0, x1)` span triples.
pub fn footprint_from_spans(raw: &[(i32, i32, i32)]) -> Footprint {
    Footprint::new(SpanSet::from_spans(
        raw.iter().map(|&(y, x0, x1)| Span::new(y, x0, x1)).collect(),
    ))
}

/// Build an f32 image from row slices; `rows[0]` is the row at `y0`.
pub fn image_from_rows(x0: i32, y0: i32, rows: &[&[f32]]) -> Image<f32> {
    let h = rows.len() as i32;
    let w = rows[0].len() as i32;
    let mut img = Image::zeros(Box2I::new(x0, y0, w, h));
    for (r, row) in rows.iter().enumerate() {
        assert_eq!(row.len() as i32, w, "ragged row data");
        for (c, &v) in row.iter().enumerate() {
            img.set(x0 + c as i32, y0 + r as i32, v);
        }
    }
    img
}

/// Wrap pixel data in a MaskedImage with an "EDGE" plane registered, zero
/// mask bits and unit variance.
pub fn masked_image(image: Image<f32>) -> MaskedImage<f32> {
    let bbox = image.bbox();
    let mut mi = MaskedImage::new(bbox);
    mi.image.assign(&image);
    mi.mask.add_plane("EDGE").expect("register EDGE plane");
    mi.variance.assign(&Image::filled(bbox, 1.0));
    mi
}

/// Pixel set of a footprint, sorted lexicographically by (y, x).
pub fn pixel_set(foot: &Footprint) -> Vec<(i32, i32)> {
    let mut px: Vec<(i32, i32)> = foot.spans().pixels().collect();
    px.sort_by_key(|&(x, y)| (y, x));
    px
}
