use thiserror::Error;

use super::atlas::AtlasParams;

/// Largest vertex count addressable by 16-bit triangle indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("surface dimensions must be at least 1x1 (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("texture spread must be a positive tile count (got {0})")]
    InvalidSpread(u32),
    #[error("atlas ratio must lie in (0, 1] (got {0})")]
    InvalidAtlasRatio(f32),
    #[error("height scale must be finite (got {0})")]
    InvalidHeightScale(f32),
    #[error("{vertices} vertices exceed the 16-bit index range of {max}")]
    CapacityExceeded { vertices: usize, max: usize },
    #[error("cannot grow surface from {width}x{height} to {new_width}x{new_height}")]
    ResizeGrowth {
        width: usize,
        height: usize,
        new_width: usize,
        new_height: usize,
    },
}

/// Vertices emitted for a `width` x `height` grid: four per quad.
pub fn vertex_count(width: usize, height: usize) -> usize {
    width.saturating_sub(1) * height.saturating_sub(1) * 4
}

/// Rejects grids whose vertex count would wrap the 16-bit index counter.
pub fn check_capacity(width: usize, height: usize) -> Result<(), SurfaceError> {
    let vertices = vertex_count(width, height);
    if vertices > MAX_VERTICES {
        return Err(SurfaceError::CapacityExceeded {
            vertices,
            max: MAX_VERTICES,
        });
    }
    Ok(())
}

/// Construction checks shared by `Surface::new` and `SurfaceConfig::validate`,
/// in order: dimensions, spread, atlas ratio, height scale, capacity.
pub fn validate_parameters(
    width: usize,
    height: usize,
    spread: u32,
    atlas_ratio: f32,
    height_scale: f32,
) -> Result<(), SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::InvalidDimensions { width, height });
    }
    AtlasParams { spread, atlas_ratio }.validate()?;
    if !height_scale.is_finite() {
        return Err(SurfaceError::InvalidHeightScale(height_scale));
    }
    check_capacity(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_boundary() {
        // 128x128 quads is exactly 65536 vertices.
        assert!(check_capacity(129, 129).is_ok());
        assert_eq!(
            check_capacity(130, 129),
            Err(SurfaceError::CapacityExceeded {
                vertices: 129 * 128 * 4,
                max: MAX_VERTICES
            })
        );
    }

    #[test]
    fn parameters_checked_in_order() {
        assert_eq!(
            validate_parameters(0, 0, 0, 0.0, f32::NAN),
            Err(SurfaceError::InvalidDimensions { width: 0, height: 0 })
        );
        assert_eq!(
            validate_parameters(3, 3, 0, 0.0, f32::NAN),
            Err(SurfaceError::InvalidSpread(0))
        );
        assert_eq!(
            validate_parameters(3, 3, 1, 0.0, f32::NAN),
            Err(SurfaceError::InvalidAtlasRatio(0.0))
        );
        assert!(matches!(
            validate_parameters(500, 500, 1, 1.0, f32::NAN),
            Err(SurfaceError::InvalidHeightScale(_))
        ));
        assert!(matches!(
            validate_parameters(500, 500, 1, 1.0, 1.0),
            Err(SurfaceError::CapacityExceeded { .. })
        ));
        assert_eq!(validate_parameters(129, 129, 4, 0.25, -2.0), Ok(()));
    }

    #[test]
    fn degenerate_grids_have_no_vertices() {
        assert_eq!(vertex_count(1, 50), 0);
        assert_eq!(vertex_count(50, 1), 0);
        assert_eq!(vertex_count(3, 3), 16);
    }
}
