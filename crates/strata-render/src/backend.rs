use strata_mesh_cpu::{RenderState, VertexBatch};
use thiserror::Error;

use crate::state::StateDesc;

/// Opaque id of geometry resident on the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawHandle(pub u32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("out of device memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },
    #[error("unknown draw handle {0:?}")]
    UnknownHandle(DrawHandle),
    #[error("backend rejected batch: {0}")]
    Rejected(String),
}

/// The primitives a graphics API binding has to provide.
pub trait DrawBackend {
    /// Uploads one batch and returns a handle to draw it with.
    fn compile(&mut self, batch: &VertexBatch) -> Result<DrawHandle, GpuError>;
    /// Frees a handle; releasing an unknown handle is a no-op.
    fn release(&mut self, handle: DrawHandle);
    fn bind_state(&mut self, state: RenderState, desc: &StateDesc);
    fn unbind_state(&mut self, state: RenderState);
    fn draw(&mut self, handle: DrawHandle) -> Result<(), GpuError>;
}
