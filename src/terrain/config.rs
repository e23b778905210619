use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{validate_parameters, SurfaceError};
use super::surface::Surface;

/// Construction parameters for terrain surfaces.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    pub width: usize,
    pub height: usize,
    pub spread: u32,
    pub atlas_ratio: f32,
    pub height_scale: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 33,
            height: 33,
            spread: 4,
            atlas_ratio: 0.25,
            height_scale: 1.0,
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<(), SurfaceError> {
        validate_parameters(
            self.width,
            self.height,
            self.spread,
            self.atlas_ratio,
            self.height_scale,
        )
    }

    pub fn build(&self) -> Result<Surface, SurfaceError> {
        Surface::new(
            self.width,
            self.height,
            self.spread,
            self.atlas_ratio,
            self.height_scale,
        )
    }
}
