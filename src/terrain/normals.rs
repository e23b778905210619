use bevy::math::Vec3;

use super::heightfield::HeightField;

/// Grid spacing along x and y.
const PLANAR_SCALE: f32 = 1.0;

/// Per-point unit normals derived from the local height slope.
///
/// The scratch grid is resized whenever the field's dimensions change and is
/// fully overwritten by every [`NormalEstimator::estimate`]. Values go stale
/// as soon as the field is written again.
#[derive(Debug, Default, Clone)]
pub struct NormalEstimator {
    width: usize,
    height: usize,
    normals: Vec<Vec3>,
}

impl NormalEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&mut self, field: &HeightField, height_scale: f32) {
        let (sx, sy) = field.dimensions();
        if (sx, sy) != (self.width, self.height) {
            // clear + resize keeps the allocation when shrinking.
            self.normals.clear();
            self.normals.resize(sx * sy, Vec3::Y);
            self.width = sx;
            self.height = sy;
        }

        for x in 0..sx {
            let (x_lo, x_hi) = (x.saturating_sub(1), (x + 1).min(sx - 1));
            for y in 0..sy {
                let (y_lo, y_hi) = (y.saturating_sub(1), (y + 1).min(sy - 1));

                // Edges sample over one cell instead of two.
                let mut x_slope = field.height_at(x_hi, y) - field.height_at(x_lo, y);
                if x == 0 || x == sx - 1 {
                    x_slope *= 2.0;
                }
                let mut y_slope = field.height_at(x, y_hi) - field.height_at(x, y_lo);
                if y == 0 || y == sy - 1 {
                    y_slope *= 2.0;
                }

                let n = Vec3::new(
                    -x_slope * height_scale,
                    2.0 * PLANAR_SCALE,
                    y_slope * height_scale,
                );
                self.normals[x * sy + y] = n.normalize();
            }
        }
    }

    /// Normal at `(x, y)` from the last estimate.
    #[inline]
    pub fn normal(&self, x: usize, y: usize) -> Vec3 {
        self.normals[x * self.height + y]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_x(sx: usize, sy: usize, step: f32) -> HeightField {
        let mut field = HeightField::new(sx, sy).unwrap();
        field.for_each_mut(|x, _, p| p.height = x as f32 * step);
        field
    }

    #[test]
    fn flat_field_points_up() {
        let field = HeightField::new(4, 3).unwrap();
        let mut est = NormalEstimator::new();
        est.estimate(&field, 7.0);
        assert!(est.normals().iter().all(|n| *n == Vec3::Y));
    }

    #[test]
    fn edges_match_interior_on_a_ramp() {
        let field = ramp_x(5, 3, 0.75);
        let mut est = NormalEstimator::new();
        est.estimate(&field, 2.0);

        let interior = est.normal(2, 1);
        for y in 0..3 {
            assert!(est.normal(0, y).abs_diff_eq(interior, 1e-6));
            assert!(est.normal(4, y).abs_diff_eq(interior, 1e-6));
        }
        // Rising along +x tilts the normal toward -x.
        assert!(interior.x < 0.0);
        assert_eq!(interior.z, 0.0);
    }

    #[test]
    fn edges_match_interior_on_a_y_ramp() {
        let mut field = HeightField::new(3, 5).unwrap();
        field.for_each_mut(|_, y, p| p.height = y as f32 * 0.75);
        let mut est = NormalEstimator::new();
        est.estimate(&field, 2.0);

        let interior = est.normal(1, 2);
        for x in 0..3 {
            assert!(est.normal(x, 0).abs_diff_eq(interior, 1e-6));
            assert!(est.normal(x, 4).abs_diff_eq(interior, 1e-6));
        }
        assert!(interior.z > 0.0);
        assert_eq!(interior.x, 0.0);
    }

    #[test]
    fn slope_along_y_tilts_toward_positive_z() {
        let mut field = HeightField::new(3, 3).unwrap();
        field.for_each_mut(|_, y, p| p.height = y as f32);
        let mut est = NormalEstimator::new();
        est.estimate(&field, 1.0);

        let expected = Vec3::new(0.0, 2.0, 2.0).normalize();
        assert!(est.normal(1, 1).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn scratch_follows_field_dimensions() {
        let mut field = ramp_x(6, 6, 1.0);
        let mut est = NormalEstimator::new();
        est.estimate(&field, 1.0);
        assert_eq!(est.normals().len(), 36);

        field.resize(4, 2).unwrap();
        est.estimate(&field, 1.0);
        assert_eq!(est.dimensions(), (4, 2));
        assert_eq!(est.normals().len(), 8);
    }

    #[test]
    fn single_column_is_flat() {
        let mut field = HeightField::new(1, 3).unwrap();
        field.for_each_mut(|_, y, p| p.height = y as f32);
        let mut est = NormalEstimator::new();
        est.estimate(&field, 1.0);
        for y in 0..3 {
            let n = est.normal(0, y);
            assert_eq!(n.x, 0.0);
            assert!((n.length() - 1.0).abs() < 1e-6);
        }
    }
}
