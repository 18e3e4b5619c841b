mod chunk;
mod dirty;
mod neighborhood;
mod rect;
mod surface;

pub use chunk::{Chunk, ChunkId, ChunkSnapshot, RegionId, SnapshotSizeError};
pub use dirty::{CHUNK_BOUNDS, DirtyArea};
pub use neighborhood::{Direction, Locate, Neighborhood};
pub use rect::CoordRect;
pub use surface::Surface;
