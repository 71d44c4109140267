use crate::error::{Result, UmbraError};
use crate::geom::{Box2I, Span};
use crate::image::{Image, MaskPixel, MaskedImage};

/// An ordered set of non-overlapping horizontal runs, sorted by `(y, x0)`.
///
/// Iteration yields rows in ascending y, columns in ascending x within a
/// row. The bounding box is cached at construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpanSet {
    spans: Vec<Span>,
    bbox: Box2I,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalise an arbitrary span list: sort lexicographically and merge
    /// overlapping or adjacent runs on the same row.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_unstable();
        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for sp in spans {
            match merged.last_mut() {
                Some(last) if last.y == sp.y && sp.x0 <= last.x1 + 1 => {
                    last.x1 = last.x1.max(sp.x1);
                }
                _ => merged.push(sp),
            }
        }
        Self::from_sorted_disjoint(merged)
    }

    /// Build from spans already in lexicographic order with no overlap.
    ///
    /// Unlike `from_spans`, adjacent runs are NOT merged; the given span
    /// decomposition is kept verbatim. Used where span order is coupled to
    /// parallel per-pixel arrays.
    pub fn from_sorted_disjoint(spans: Vec<Span>) -> Self {
        debug_assert!(
            spans.windows(2).all(|w| {
                w[0].y < w[1].y || (w[0].y == w[1].y && w[0].x1 < w[1].x0)
            }),
            "spans out of order or overlapping"
        );
        let mut bbox = Box2I::empty();
        for sp in &spans {
            bbox.include(sp.x0, sp.y);
            bbox.include(sp.x1, sp.y);
        }
        Self { spans, bbox }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total pixel count.
    pub fn area(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Tight enclosing rectangle.
    pub fn bbox(&self) -> Box2I {
        self.bbox
    }

    /// Membership test by binary search over the ordered span list.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let idx = self
            .spans
            .partition_point(|s| (s.y, s.x0) <= (y, x));
        idx > 0 && self.spans[idx - 1].contains(x, y)
    }

    /// Pixels in lexicographic iteration order.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.spans
            .iter()
            .flat_map(|s| (s.x0..=s.x1).map(move |x| (x, s.y)))
    }

    /// The subset of member pixels whose 4-neighbourhood includes a
    /// non-member, as a canonical SpanSet.
    pub fn edge_pixels(&self) -> SpanSet {
        let mut out: Vec<Span> = Vec::new();
        for sp in &self.spans {
            let y = sp.y;
            let mut run_start: Option<i32> = None;
            for x in sp.x0..=sp.x1 {
                let horiz_exposed = (x == sp.x0 && !self.contains(x - 1, y))
                    || (x == sp.x1 && !self.contains(x + 1, y));
                let is_edge =
                    horiz_exposed || !self.contains(x, y - 1) || !self.contains(x, y + 1);
                if is_edge {
                    run_start.get_or_insert(x);
                } else if let Some(start) = run_start.take() {
                    out.push(Span::new(y, start, x - 1));
                }
            }
            if let Some(start) = run_start {
                out.push(Span::new(y, start, sp.x1));
            }
        }
        SpanSet::from_spans(out)
    }

    /// Write `value` into `img` over every member pixel, clipped to the
    /// image bounds.
    pub fn stamp<T: Copy>(&self, img: &mut Image<T>, value: T) {
        let ibb = img.bbox();
        for sp in &self.spans {
            if sp.y < ibb.min_y() || sp.y > ibb.max_y() {
                continue;
            }
            let x0 = sp.x0.max(ibb.min_x());
            let x1 = sp.x1.min(ibb.max_x());
            for x in x0..=x1 {
                img.set(x, sp.y, value);
            }
        }
    }
}

/// An integer pixel location associated with a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peak {
    pub ix: i32,
    pub iy: i32,
}

impl Peak {
    pub fn new(ix: i32, iy: i32) -> Self {
        Self { ix, iy }
    }
}

/// Opaque descriptor of the per-peak record layout, propagated unchanged
/// from a parent footprint to footprints derived from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeakSchema {
    fields: Vec<String>,
}

impl PeakSchema {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// A detection region: a SpanSet plus the peaks found inside it.
#[derive(Clone, Debug, Default)]
pub struct Footprint {
    spans: SpanSet,
    peaks: Vec<Peak>,
    peak_schema: PeakSchema,
}

impl Footprint {
    pub fn new(spans: SpanSet) -> Self {
        Self {
            spans,
            peaks: Vec::new(),
            peak_schema: PeakSchema::default(),
        }
    }

    /// A footprint carrying a schema inherited from a parent.
    pub fn with_schema(spans: SpanSet, peak_schema: PeakSchema) -> Self {
        Self {
            spans,
            peaks: Vec::new(),
            peak_schema,
        }
    }

    pub fn spans(&self) -> &SpanSet {
        &self.spans
    }

    pub fn set_spans(&mut self, spans: SpanSet) {
        self.spans = spans;
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn add_peak(&mut self, peak: Peak) {
        self.peaks.push(peak);
    }

    pub fn peak_schema(&self) -> &PeakSchema {
        &self.peak_schema
    }

    pub fn set_peak_schema(&mut self, schema: PeakSchema) {
        self.peak_schema = schema;
    }

    pub fn bbox(&self) -> Box2I {
        self.spans.bbox()
    }

    pub fn area(&self) -> usize {
        self.spans.area()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.spans.contains(x, y)
    }
}

/// A footprint backed by flat per-pixel value arrays.
///
/// Element `k` of each array corresponds to the k-th pixel in lexicographic
/// span iteration; array lengths always equal the footprint area.
#[derive(Clone, Debug)]
pub struct HeavyFootprint<T> {
    footprint: Footprint,
    image: Vec<T>,
    mask: Vec<MaskPixel>,
    variance: Vec<T>,
}

impl<T: Copy> HeavyFootprint<T> {
    /// Assemble from a footprint and pre-filled arrays; array lengths must
    /// equal the footprint area.
    pub fn from_parts(
        footprint: Footprint,
        image: Vec<T>,
        mask: Vec<MaskPixel>,
        variance: Vec<T>,
    ) -> Result<Self> {
        let area = footprint.area();
        for (what, len) in [
            ("heavy footprint image array", image.len()),
            ("heavy footprint mask array", mask.len()),
            ("heavy footprint variance array", variance.len()),
        ] {
            if len != area {
                return Err(UmbraError::LengthMismatch {
                    what,
                    got: len,
                    expected: area,
                });
            }
        }
        Ok(Self {
            footprint,
            image,
            mask,
            variance,
        })
    }

    /// Read values out of `src` over the footprint, in span iteration order.
    pub fn from_masked_image(footprint: Footprint, src: &MaskedImage<T>) -> Result<Self> {
        if !src.bbox().contains_box(&footprint.bbox()) {
            return Err(UmbraError::Bounds(format!(
                "masked image {:?} does not contain footprint {:?}",
                src.bbox(),
                footprint.bbox()
            )));
        }
        let mut image = Vec::with_capacity(footprint.area());
        let mut mask = Vec::with_capacity(footprint.area());
        let mut variance = Vec::with_capacity(footprint.area());
        for (x, y) in footprint.spans().pixels() {
            image.push(src.image.get(x, y));
            mask.push(src.mask.get(x, y));
            variance.push(src.variance.get(x, y));
        }
        Self::from_parts(footprint, image, mask, variance)
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn image_array(&self) -> &[T] {
        &self.image
    }

    pub fn mask_array(&self) -> &[MaskPixel] {
        &self.mask
    }

    pub fn variance_array(&self) -> &[T] {
        &self.variance
    }

    /// Sum of the stored image values.
    pub fn total_flux(&self) -> T
    where
        T: num_traits::Float,
    {
        self.image
            .iter()
            .fold(T::zero(), |acc, &v| acc + v)
    }

    /// Write the stored values into `dst` over the footprint. Pixels outside
    /// `dst` are skipped; mask bits are ORed in.
    pub fn insert_into(&self, dst: &mut MaskedImage<T>) {
        let bbox = dst.bbox();
        for (k, (x, y)) in self.footprint.spans().pixels().enumerate() {
            if !bbox.contains(x, y) {
                continue;
            }
            dst.image.set(x, y, self.image[k]);
            let bits = dst.mask.get(x, y) | self.mask[k];
            dst.mask.set(x, y, bits);
            dst.variance.set(x, y, self.variance[k]);
        }
    }
}
