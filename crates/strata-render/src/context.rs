use strata_mesh_cpu::{GridAtlas, Layer, RenderState, TextureLookup, VertexBatch};

use crate::backend::{DrawBackend, DrawHandle, GpuError};
use crate::state::RenderStateTable;

/// One uploaded batch owned by a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompiledPart {
    pub layer: Layer,
    pub state: RenderState,
    pub handle: DrawHandle,
    pub bytes: usize,
}

/// Everything the pipeline needs from the graphics side, passed explicitly.
pub struct GraphicsContext<B: DrawBackend> {
    pub backend: B,
    pub textures: Box<dyn TextureLookup>,
    pub states: RenderStateTable,
}

impl<B: DrawBackend> GraphicsContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            textures: Box::new(GridAtlas::terrain()),
            states: RenderStateTable::default(),
        }
    }

    pub fn with_textures(mut self, textures: Box<dyn TextureLookup>) -> Self {
        self.textures = textures;
        self
    }

    /// Uploads every batch of one render state. On failure the handles already
    /// created by this call are released before the error is returned.
    pub fn compile_state<'a>(
        &mut self,
        state: RenderState,
        batches: impl IntoIterator<Item = &'a VertexBatch>,
    ) -> Result<Vec<CompiledPart>, GpuError> {
        let mut parts = Vec::new();
        for batch in batches {
            if batch.state != state || batch.is_empty() {
                continue;
            }
            match self.backend.compile(batch) {
                Ok(handle) => parts.push(CompiledPart {
                    layer: batch.layer,
                    state,
                    handle,
                    bytes: batch.byte_size(),
                }),
                Err(e) => {
                    self.release_parts(&parts);
                    return Err(e);
                }
            }
        }
        Ok(parts)
    }

    pub fn release_parts(&mut self, parts: &[CompiledPart]) -> usize {
        let mut bytes = 0;
        for p in parts {
            self.backend.release(p.handle);
            bytes += p.bytes;
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;
    use crate::recording::tests::batch;

    #[test]
    fn failed_state_compile_releases_partial_uploads() {
        let mut gfx = GraphicsContext::new(RecordingBackend::new());
        let a = batch(2);
        let mut b = batch(3);
        b.layer = Layer::Items;
        let parts = gfx.compile_state(RenderState::Opaque, [&a, &b]).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].layer, Layer::Items);
        gfx.release_parts(&parts);

        let cap = a.byte_size() + 1;
        let mut gfx = GraphicsContext::new(RecordingBackend::new().with_capacity(cap));
        assert!(gfx.compile_state(RenderState::Opaque, [&a, &b]).is_err());
        assert_eq!(gfx.backend.live_handles(), 0);
    }

    #[test]
    fn other_states_are_skipped() {
        let mut gfx = GraphicsContext::new(RecordingBackend::new());
        let a = batch(1);
        let parts = gfx.compile_state(RenderState::Water, [&a]).unwrap();
        assert!(parts.is_empty());
    }
}
