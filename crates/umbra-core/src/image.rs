use std::collections::BTreeMap;

use ndarray::Array2;
use num_traits::Zero;

use crate::consts::MAX_MASK_PLANES;
use crate::error::{Result, UmbraError};
use crate::geom::Box2I;

/// Bitfield pixel type of the mask plane.
pub type MaskPixel = u16;

/// A dense 2D pixel array with an integer origin.
///
/// Internal address `(row, col)` maps to external coordinate
/// `(x0 + col, y0 + row)`. All public accessors take external coordinates.
#[derive(Clone, Debug)]
pub struct Image<T> {
    /// Pixel data, row-major, shape = (height, width).
    data: Array2<T>,
    x0: i32,
    y0: i32,
}

impl<T: Copy> Image<T> {
    pub fn from_array(data: Array2<T>, x0: i32, y0: i32) -> Self {
        Self { data, x0, y0 }
    }

    /// Image covering `bbox`, every pixel set to `value`.
    pub fn filled(bbox: Box2I, value: T) -> Self {
        Self {
            data: Array2::from_elem((bbox.height() as usize, bbox.width() as usize), value),
            x0: bbox.min_x(),
            y0: bbox.min_y(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn x0(&self) -> i32 {
        self.x0
    }

    pub fn y0(&self) -> i32 {
        self.y0
    }

    pub fn bbox(&self) -> Box2I {
        Box2I::new(self.x0, self.y0, self.width() as i32, self.height() as i32)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bbox().contains(x, y)
    }

    pub fn get(&self, x: i32, y: i32) -> T {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: i32, y: i32, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Overwrite this image's pixels with `other`'s. Shapes must agree.
    pub fn assign(&mut self, other: &Image<T>) {
        self.data.assign(&other.data);
    }

    fn index(&self, x: i32, y: i32) -> (usize, usize) {
        debug_assert!(
            self.contains(x, y),
            "pixel ({x},{y}) outside image bbox {:?}",
            self.bbox()
        );
        ((y - self.y0) as usize, (x - self.x0) as usize)
    }
}

impl<T: Copy + Zero> Image<T> {
    /// Zero-filled image covering `bbox`.
    pub fn zeros(bbox: Box2I) -> Self {
        Self::filled(bbox, T::zero())
    }
}

/// A bitfield image with a registry of named planes.
///
/// Hosts define plane names (e.g. "EDGE"); lookups by undefined names fail
/// so that callers depending on a plane can surface a configuration error.
#[derive(Clone, Debug)]
pub struct Mask {
    data: Image<MaskPixel>,
    planes: BTreeMap<String, u32>,
}

impl Mask {
    pub fn new(bbox: Box2I) -> Self {
        Self {
            data: Image::zeros(bbox),
            planes: BTreeMap::new(),
        }
    }

    pub fn with_planes(bbox: Box2I, planes: BTreeMap<String, u32>) -> Self {
        Self {
            data: Image::zeros(bbox),
            planes,
        }
    }

    /// Register a named plane and return its bit mask. Re-registering an
    /// existing name returns the existing bit.
    pub fn add_plane(&mut self, name: &str) -> Result<MaskPixel> {
        if let Some(&bit) = self.planes.get(name) {
            return Ok(1 << bit);
        }
        let next = self.planes.len() as u32;
        if next >= MAX_MASK_PLANES {
            return Err(UmbraError::MaskPlaneLimit(name.to_string()));
        }
        self.planes.insert(name.to_string(), next);
        Ok(1 << next)
    }

    /// Bit mask of a named plane; `MissingMaskPlane` if undefined.
    pub fn plane_bit_mask(&self, name: &str) -> Result<MaskPixel> {
        self.planes
            .get(name)
            .map(|&bit| 1 << bit)
            .ok_or_else(|| UmbraError::MissingMaskPlane(name.to_string()))
    }

    pub fn planes(&self) -> &BTreeMap<String, u32> {
        &self.planes
    }

    pub fn image(&self) -> &Image<MaskPixel> {
        &self.data
    }

    pub fn image_mut(&mut self) -> &mut Image<MaskPixel> {
        &mut self.data
    }

    pub fn bbox(&self) -> Box2I {
        self.data.bbox()
    }

    pub fn get(&self, x: i32, y: i32) -> MaskPixel {
        self.data.get(x, y)
    }

    pub fn set(&mut self, x: i32, y: i32, value: MaskPixel) {
        self.data.set(x, y, value);
    }
}

/// Three aligned planes: pixel values, mask bits, and per-pixel variance.
#[derive(Clone, Debug)]
pub struct MaskedImage<T> {
    pub image: Image<T>,
    pub mask: Mask,
    pub variance: Image<T>,
}

impl<T: Copy + Zero> MaskedImage<T> {
    /// Zero-filled masked image covering `bbox` with an empty plane registry.
    pub fn new(bbox: Box2I) -> Self {
        Self {
            image: Image::zeros(bbox),
            mask: Mask::new(bbox),
            variance: Image::zeros(bbox),
        }
    }

    /// Like `new`, but carrying over a plane registry (e.g. the parent's).
    pub fn with_planes(bbox: Box2I, planes: BTreeMap<String, u32>) -> Self {
        Self {
            image: Image::zeros(bbox),
            mask: Mask::with_planes(bbox, planes),
            variance: Image::zeros(bbox),
        }
    }
}

impl<T: Copy> MaskedImage<T> {
    /// Assemble from existing planes; all three must be congruent.
    pub fn from_parts(image: Image<T>, mask: Mask, variance: Image<T>) -> Result<Self> {
        if image.bbox() != mask.bbox() || image.bbox() != variance.bbox() {
            return Err(UmbraError::Bounds(format!(
                "masked image planes disagree: image {:?}, mask {:?}, variance {:?}",
                image.bbox(),
                mask.bbox(),
                variance.bbox()
            )));
        }
        Ok(Self {
            image,
            mask,
            variance,
        })
    }

    pub fn bbox(&self) -> Box2I {
        self.image.bbox()
    }
}
