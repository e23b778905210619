use bevy::log::debug;

use super::atlas::AtlasParams;
use super::error::{
    check_capacity, validate_parameters, vertex_count, SurfaceError, MAX_VERTICES,
};
use super::heightfield::HeightField;
use super::normals::NormalEstimator;
use super::sink::{MeshBuffers, MeshSink};

/// Land height data rendered as a textured triangle mesh.
///
/// A surface owns its [`HeightField`] and all rebuild scratch. Each
/// [`Surface::rebuild`] regenerates every buffer from the current field and
/// hands them to a [`MeshSink`]. Scratch vectors are cleared, never freed,
/// so steady-state rebuilds do not allocate.
///
/// Every quad gets its own four vertices; vertices on shared quad edges are
/// duplicated rather than indexed across quads.
#[derive(Debug, Clone)]
pub struct Surface {
    field: HeightField,
    atlas: AtlasParams,
    height_scale: f32,
    normals: NormalEstimator,

    positions: Vec<[f32; 3]>,
    vertex_normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 4]>,
    indices: Vec<u16>,
}

impl Surface {
    /// Creates a `width` x `height` surface of flat points.
    ///
    /// * `spread`: grid cells one texture covers.
    /// * `atlas_ratio`: size of one texture relative to the atlas, in (0, 1].
    /// * `height_scale`: applied to every height value.
    pub fn new(
        width: usize,
        height: usize,
        spread: u32,
        atlas_ratio: f32,
        height_scale: f32,
    ) -> Result<Self, SurfaceError> {
        validate_parameters(width, height, spread, atlas_ratio, height_scale)?;

        Ok(Self {
            field: HeightField::new(width, height)?,
            atlas: AtlasParams { spread, atlas_ratio },
            height_scale,
            normals: NormalEstimator::new(),
            positions: Vec::new(),
            vertex_normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        })
    }

    /// Live point grid, for reading.
    pub fn points(&self) -> &HeightField {
        &self.field
    }

    /// Live point grid, for the terrain generator to write into.
    ///
    /// Buffers produced earlier do not track these writes; call
    /// [`Surface::rebuild`] afterwards.
    pub fn points_mut(&mut self) -> &mut HeightField {
        &mut self.field
    }

    pub fn atlas(&self) -> AtlasParams {
        self.atlas
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Shrinks the point grid. See [`HeightField::resize`].
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SurfaceError> {
        self.field.resize(width, height)
    }

    /// Buffers produced by the last successful rebuild.
    pub fn buffers(&self) -> MeshBuffers<'_> {
        MeshBuffers {
            positions: &self.positions,
            normals: &self.vertex_normals,
            atlas: &self.uvs,
            indices: &self.indices,
        }
    }

    /// Regenerates the mesh for the patch at offset `(x_offset, y_offset)` and
    /// delivers it to `sink`. On error the sink is left untouched.
    pub fn rebuild(
        &mut self,
        sink: &mut impl MeshSink,
        x_offset: i32,
        y_offset: i32,
    ) -> Result<(), SurfaceError> {
        let (sx, sy) = self.field.dimensions();
        check_capacity(sx, sy)?;

        self.normals.estimate(&self.field, self.height_scale);

        self.positions.clear();
        self.vertex_normals.clear();
        self.uvs.clear();
        self.indices.clear();

        let quads = (sx - 1) * (sy - 1);
        self.positions.reserve(quads * 4);
        self.vertex_normals.reserve(quads * 4);
        self.uvs.reserve(quads * 4);
        self.indices.reserve(quads * 6);

        let field = &self.field;
        let scale = self.height_scale;
        let (xo, yo) = (i64::from(x_offset), i64::from(y_offset));

        for x in 0..sx - 1 {
            for y in 0..sy - 1 {
                // First vertex of this quad; the last quad starts at 65532.
                let vc = u16::try_from(self.positions.len()).map_err(|_| {
                    SurfaceError::CapacityExceeded {
                        vertices: vertex_count(sx, sy),
                        max: MAX_VERTICES,
                    }
                })?;
                let corners = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)];

                for (cx, cy) in corners {
                    let h = field.height_at(cx, cy) * scale;
                    self.positions.push([cx as f32, cy as f32, h]);
                    self.vertex_normals.push(self.normals.normal(cx, cy).to_array());
                }

                // Texture and blend are flat across the quad.
                let origin = field[(x, y)];
                let texture = origin.texture_index as f32;
                for [u, v] in self.atlas.pack_quad(x as i64, y as i64, xo, yo) {
                    self.uvs.push([u, v, texture, origin.blend]);
                }

                self.indices.extend_from_slice(&[vc, vc + 1, vc + 2, vc + 1, vc + 3, vc + 2]);
            }
        }

        debug!(
            "rebuilt {sx}x{sy} surface at ({x_offset}, {y_offset}): {quads} quads, {} vertices",
            self.positions.len()
        );

        sink.replace_buffers(&self.buffers());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::sink::CpuMesh;

    #[test]
    fn construction_errors() {
        assert!(matches!(
            Surface::new(0, 3, 1, 1.0, 1.0),
            Err(SurfaceError::InvalidDimensions { width: 0, height: 3 })
        ));
        assert!(matches!(Surface::new(3, 3, 0, 1.0, 1.0), Err(SurfaceError::InvalidSpread(0))));
        assert!(matches!(
            Surface::new(3, 3, 1, -0.5, 1.0),
            Err(SurfaceError::InvalidAtlasRatio(_))
        ));
        assert!(matches!(
            Surface::new(3, 3, 1, 1.0, f32::INFINITY),
            Err(SurfaceError::InvalidHeightScale(_))
        ));
        assert!(matches!(
            Surface::new(200, 200, 1, 1.0, 1.0),
            Err(SurfaceError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn largest_grid_uses_the_whole_index_range() {
        let mut surface = Surface::new(129, 129, 4, 0.5, 1.0).unwrap();
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();

        assert_eq!(sink.vertex_count(), 65536);
        assert_eq!(sink.indices.iter().copied().max(), Some(u16::MAX));
        assert_eq!(
            &sink.indices[sink.indices.len() - 6..],
            &[65532, 65533, 65534, 65533, 65535, 65534]
        );
    }

    #[test]
    fn degenerate_grid_yields_empty_buffers() {
        let mut surface = Surface::new(1, 5, 1, 1.0, 1.0).unwrap();
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();
        assert_eq!(sink.uploads, 1);
        assert!(sink.positions.is_empty() && sink.indices.is_empty());
    }

    #[test]
    fn positions_scale_heights() {
        let mut surface = Surface::new(2, 2, 1, 1.0, 3.0).unwrap();
        surface.points_mut()[(1, 1)].height = 2.0;
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();

        let positions = surface.buffers().positions;
        assert_eq!(positions, &[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [1., 1., 6.]]);
        assert_eq!(sink.indices, [0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn quad_texture_comes_from_origin_corner() {
        let mut surface = Surface::new(3, 2, 1, 1.0, 1.0).unwrap();
        surface.points_mut().for_each_mut(|x, _, p| {
            p.texture_index = x as i32 + 1;
            p.blend = 0.1 * x as f32;
        });
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();

        let atlas = surface.buffers().atlas;
        for (quad, x) in atlas.chunks_exact(4).zip(0..) {
            for v in quad {
                assert_eq!(v[2], (x + 1) as f32);
                assert_eq!(v[3], 0.1 * x as f32);
            }
        }
    }

    #[test]
    fn oversized_field_aborts_rebuild_before_delivery() {
        let mut surface = Surface::new(4, 3, 2, 0.5, 1.0).unwrap();
        surface.points_mut()[(2, 1)].height = 1.5;
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();
        let delivered = sink.clone();
        let positions = surface.buffers().positions.to_vec();
        let indices = surface.buffers().indices.to_vec();

        surface.field = HeightField::new(200, 200).unwrap();
        assert!(matches!(
            surface.rebuild(&mut sink, 1, 1),
            Err(SurfaceError::CapacityExceeded { vertices: 158_404, max: MAX_VERTICES })
        ));

        assert_eq!(sink, delivered);
        assert_eq!(sink.uploads, 1);
        assert_eq!(surface.buffers().positions, positions.as_slice());
        assert_eq!(surface.buffers().indices, indices.as_slice());
    }

    #[test]
    fn scratch_is_reused_after_shrinking() {
        let mut surface = Surface::new(10, 10, 2, 0.5, 1.0).unwrap();
        let mut sink = CpuMesh::default();
        surface.rebuild(&mut sink, 0, 0).unwrap();
        let capacity = surface.positions.capacity();

        surface.resize(4, 3).unwrap();
        surface.rebuild(&mut sink, 0, 0).unwrap();
        assert_eq!(surface.positions.capacity(), capacity);
        assert_eq!(sink.vertex_count(), 3 * 2 * 4);
    }
}
