pub mod atlas;
pub mod config;
pub mod error;
pub mod heightfield;
pub mod normals;
pub mod plugin;
pub mod sink;
pub mod surface;

pub use atlas::{AtlasParams, QuadUvs, SEAM_EPSILON};
pub use config::SurfaceConfig;
pub use error::{SurfaceError, MAX_VERTICES};
pub use heightfield::{HeightField, SurfacePoint};
pub use plugin::{SurfacePatch, SurfacePlugin, SurfaceRebuildSet};
pub use sink::{
    surface_mesh, BufferLayout, BufferSlot, BufferUsage, CpuMesh, MeshBuffers, MeshSink,
    ATTRIBUTE_ATLAS, SURFACE_LAYOUT,
};
pub use surface::Surface;
