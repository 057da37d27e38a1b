//! Headless backend: tracks live allocations and records every command, so the
//! scheduler can run and be tested without a window.

use hashbrown::HashMap;
use strata_mesh_cpu::{RenderState, VertexBatch};

use crate::backend::{DrawBackend, DrawHandle, GpuError};
use crate::state::StateDesc;

/// Uploads are split the way a 16-bit index buffer requires.
pub const MAX_SEGMENT_VERTS: usize = 65000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    Bind(RenderState),
    Draw(DrawHandle),
    Unbind(RenderState),
}

#[derive(Copy, Clone, Debug)]
struct Allocation {
    bytes: usize,
    segments: usize,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    live: HashMap<DrawHandle, Allocation>,
    next_id: u32,
    live_bytes: usize,
    capacity: Option<usize>,
    fail_next: u32,
    record: bool,
    commands: Vec<DrawCommand>,
    compiled_total: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            record: true,
            ..Self::default()
        }
    }

    /// Fails any compile that would push live bytes past `bytes`.
    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Stops keeping the command log; counters are still maintained.
    pub fn without_log(mut self) -> Self {
        self.record = false;
        self
    }

    /// Makes the next `n` compiles fail regardless of capacity.
    pub fn fail_next_compiles(&mut self, n: u32) {
        self.fail_next = n;
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    pub fn is_live(&self, handle: DrawHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Device segments behind one handle.
    pub fn segments(&self, handle: DrawHandle) -> Option<usize> {
        self.live.get(&handle).map(|a| a.segments)
    }

    pub fn compiled_total(&self) -> u64 {
        self.compiled_total
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn push(&mut self, cmd: DrawCommand) {
        if self.record {
            self.commands.push(cmd);
        }
    }
}

impl DrawBackend for RecordingBackend {
    fn compile(&mut self, batch: &VertexBatch) -> Result<DrawHandle, GpuError> {
        if batch.is_empty() {
            return Err(GpuError::Rejected("empty batch".into()));
        }
        let bytes = batch.byte_size();
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(GpuError::OutOfMemory {
                requested: bytes,
                available: 0,
            });
        }
        if let Some(cap) = self.capacity {
            let available = cap.saturating_sub(self.live_bytes);
            if bytes > available {
                return Err(GpuError::OutOfMemory {
                    requested: bytes,
                    available,
                });
            }
        }
        let handle = DrawHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let segments = batch.vertex_count().div_ceil(MAX_SEGMENT_VERTS);
        self.live.insert(handle, Allocation { bytes, segments });
        self.live_bytes += bytes;
        self.compiled_total += 1;
        Ok(handle)
    }

    fn release(&mut self, handle: DrawHandle) {
        if let Some(a) = self.live.remove(&handle) {
            self.live_bytes -= a.bytes;
        }
    }

    fn bind_state(&mut self, state: RenderState, _desc: &StateDesc) {
        self.push(DrawCommand::Bind(state));
    }

    fn unbind_state(&mut self, state: RenderState) {
        self.push(DrawCommand::Unbind(state));
    }

    fn draw(&mut self, handle: DrawHandle) -> Result<(), GpuError> {
        if !self.live.contains_key(&handle) {
            return Err(GpuError::UnknownHandle(handle));
        }
        self.push(DrawCommand::Draw(handle));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use strata_geom::Vec3;
    use strata_mesh_cpu::Layer;

    pub(crate) fn batch(quads: usize) -> VertexBatch {
        let mut b = VertexBatch::new(RenderState::Opaque, Layer::Blocks);
        for i in 0..quads {
            let y = i as f32;
            b.add_quad_uv(
                Vec3::new(0.0, y, 0.0),
                Vec3::new(1.0, y, 0.0),
                Vec3::new(1.0, y, 1.0),
                Vec3::new(0.0, y, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                [(0.0, 0.0); 4],
                [255; 4],
            );
        }
        b
    }

    #[test]
    fn compile_and_release_track_bytes() {
        let mut be = RecordingBackend::new();
        let b = batch(2);
        let h = be.compile(&b).unwrap();
        assert_eq!(be.live_bytes(), b.byte_size());
        assert_eq!(be.segments(h), Some(1));
        be.release(h);
        assert_eq!(be.live_bytes(), 0);
        assert!(be.draw(h).is_err());
        be.release(h);
    }

    #[test]
    fn capacity_and_injected_failures() {
        let b = batch(4);
        let mut be = RecordingBackend::new().with_capacity(b.byte_size());
        let h = be.compile(&b).unwrap();
        assert!(matches!(be.compile(&b), Err(GpuError::OutOfMemory { .. })));
        be.release(h);
        be.fail_next_compiles(1);
        assert!(be.compile(&b).is_err());
        assert!(be.compile(&b).is_ok());
    }

    #[test]
    fn large_batches_span_segments() {
        let mut be = RecordingBackend::new();
        let h = be.compile(&batch(MAX_SEGMENT_VERTS / 4 + 1)).unwrap();
        assert_eq!(be.segments(h), Some(2));
    }
}
