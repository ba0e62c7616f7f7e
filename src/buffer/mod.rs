//! Offset-addressed buffers built on sealed chunks.
//!
//! [`ChunkBuffer`] is the shared core; [`ReassemblyBuffer`] waits for a known
//! total length starting at offset zero, while [`ReorderBuffer`] releases
//! contiguous data as soon as it lines up with the next expected offset.

mod chunk_buffer;
mod reassembly;
mod reorder;

pub use chunk_buffer::{ChunkBuffer, Region};
pub use reassembly::ReassemblyBuffer;
pub use reorder::ReorderBuffer;
