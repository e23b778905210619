use serde::{Deserialize, Serialize};

use super::error::SurfaceError;

/// Inset applied to UVs lying on the outer edge of an atlas region so
/// bilinear sampling does not bleed into the neighbouring texture.
pub const SEAM_EPSILON: f32 = 0.001;

/// How one atlas texture is spread over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtlasParams {
    /// Number of grid cells one texture repeats across.
    pub spread: u32,
    /// Size of one texture relative to the whole atlas.
    pub atlas_ratio: f32,
}

/// Texture coordinates for the four vertices of a quad, in vertex order:
/// top-left, top-right, bottom-left, bottom-right.
pub type QuadUvs = [[f32; 2]; 4];

impl AtlasParams {
    pub fn new(spread: u32, atlas_ratio: f32) -> Result<Self, SurfaceError> {
        let params = Self { spread, atlas_ratio };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.spread == 0 {
            return Err(SurfaceError::InvalidSpread(self.spread));
        }
        // Also rejects NaN.
        if !(self.atlas_ratio > 0.0 && self.atlas_ratio <= 1.0) {
            return Err(SurfaceError::InvalidAtlasRatio(self.atlas_ratio));
        }
        Ok(())
    }

    /// Width of one repeated tile in atlas space.
    pub fn tile_width(&self) -> f32 {
        self.atlas_ratio / self.spread as f32
    }

    /// UV corners for the quad at grid `(x, y)` of a patch offset by `(xo, yo)`.
    ///
    /// The sub-tile is chosen by `(x + xo) mod spread` and
    /// `(y + yo) mod spread`, so neighbouring patches sharing a spread keep
    /// tiling continuously. Rows count down from the top of the region.
    pub fn pack_quad(&self, x: i64, y: i64, xo: i64, yo: i64) -> QuadUvs {
        let spread = i64::from(self.spread);
        let n = self.spread as f32;
        let r = self.atlas_ratio;

        let col = (x + xo).rem_euclid(spread);
        let row = spread - 1 - (y + yo).rem_euclid(spread);

        // Edges come from whole tile indices so the outer ones land
        // exactly on 0 and the ratio.
        let mut left = col as f32 / n * r;
        let mut right = (col + 1) as f32 / n * r;
        let mut bottom = row as f32 / n * r;
        let mut top = (row + 1) as f32 / n * r;

        if left == 0.0 {
            left += SEAM_EPSILON;
        }
        if right == r {
            right -= SEAM_EPSILON;
        }
        if bottom == 0.0 {
            bottom += SEAM_EPSILON;
        }
        if top == r {
            top -= SEAM_EPSILON;
        }

        [[left, top], [right, top], [left, bottom], [right, bottom]]
    }
}
