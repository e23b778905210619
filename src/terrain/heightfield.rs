use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::error::SurfaceError;

/// Height and texture information for one point of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Raw height, scaled by the surface height scale when meshed.
    pub height: f32,
    /// Texture atlas index.
    pub texture_index: i32,
    /// Amount of blending with the next atlas texture, 0..=1.
    pub blend: f32,
}

/// Grid of `SurfacePoint`s indexed `[x][y]`.
///
/// Storage is one flat column-major vector: point `(x, y)` lives at
/// `x * height + y`. Adjacency along both axes follows grid order.
///
/// The field is written by an external terrain generator between rebuilds.
/// Writing while a rebuild borrows the owning surface is impossible through
/// this API; changing dimensions is only possible through [`HeightField::resize`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    points: Vec<SurfacePoint>,
}

impl HeightField {
    pub fn new(width: usize, height: usize) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            points: vec![SurfacePoint::default(); width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of points, always `width * height`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| x * self.height + y)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&SurfacePoint> {
        self.offset(x, y).map(|i| &self.points[i])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut SurfacePoint> {
        self.offset(x, y).map(move |i| &mut self.points[i])
    }

    /// Overwrites one point. Returns `false` when `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, point: SurfacePoint) -> bool {
        match self.get_mut(x, y) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// Height at `(x, y)`. Callers must stay inside the grid.
    #[inline]
    pub(crate) fn height_at(&self, x: usize, y: usize) -> f32 {
        self.points[x * self.height + y].height
    }

    /// Columns of constant `x`, in ascending `x`.
    pub fn columns(&self) -> impl Iterator<Item = &[SurfacePoint]> {
        self.points.chunks_exact(self.height)
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut [SurfacePoint]> {
        self.points.chunks_exact_mut(self.height)
    }

    /// Visits every point with its grid coordinate, `x` outer and `y` inner.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(usize, usize, &mut SurfacePoint)) {
        for (x, column) in self.columns_mut().enumerate() {
            for (y, point) in column.iter_mut().enumerate() {
                f(x, y, point);
            }
        }
    }

    /// Truncates the grid to `new_width` x `new_height`, keeping the values
    /// at retained coordinates. Growing is rejected and leaves the grid as is.
    pub fn resize(&mut self, new_width: usize, new_height: usize) -> Result<(), SurfaceError> {
        if new_width == 0 || new_height == 0 {
            return Err(SurfaceError::InvalidDimensions {
                width: new_width,
                height: new_height,
            });
        }
        if new_width > self.width || new_height > self.height {
            return Err(SurfaceError::ResizeGrowth {
                width: self.width,
                height: self.height,
                new_width,
                new_height,
            });
        }

        // Destination offsets never pass their source, so compact in place.
        for x in 0..new_width {
            let src = x * self.height;
            let dst = x * new_height;
            self.points.copy_within(src..src + new_height, dst);
        }
        self.points.truncate(new_width * new_height);
        self.width = new_width;
        self.height = new_height;
        Ok(())
    }
}

impl Index<(usize, usize)> for HeightField {
    type Output = SurfacePoint;

    fn index(&self, (x, y): (usize, usize)) -> &SurfacePoint {
        match self.offset(x, y) {
            Some(i) => &self.points[i],
            None => panic!(
                "surface point ({x}, {y}) out of bounds for {}x{} grid",
                self.width, self.height
            ),
        }
    }
}

impl IndexMut<(usize, usize)> for HeightField {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut SurfacePoint {
        let (width, height) = (self.width, self.height);
        match self.offset(x, y) {
            Some(i) => &mut self.points[i],
            None => panic!("surface point ({x}, {y}) out of bounds for {width}x{height} grid"),
        }
    }
}
