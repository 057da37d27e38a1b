//! Per-state aggregation of every ready chunk's handles, rebuilt only when
//! something it was derived from changed.

use strata_mesh_cpu::{LayerSet, RenderState};

use crate::backend::{DrawBackend, DrawHandle};
use crate::context::CompiledPart;
use crate::state::RenderStateTable;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub binds: usize,
    pub draws: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct MasterList {
    per_state: [Vec<DrawHandle>; RenderState::COUNT],
    dirty: bool,
    rebuilds: u64,
}

impl Default for MasterList {
    fn default() -> Self {
        Self {
            per_state: Default::default(),
            dirty: true,
            rebuilds: 0,
        }
    }
}

impl MasterList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of times the list has been recomputed.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn handles(&self, state: RenderState) -> &[DrawHandle] {
        &self.per_state[state.index()]
    }

    pub fn len(&self) -> usize {
        self.per_state.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recomputes from `parts` when dirty, keeping only visible layers.
    pub fn refresh<'a>(
        &mut self,
        parts: impl IntoIterator<Item = &'a CompiledPart>,
        visible: LayerSet,
    ) {
        if !self.dirty {
            return;
        }
        for v in &mut self.per_state {
            v.clear();
        }
        for p in parts {
            if visible.contains(p.layer) {
                self.per_state[p.state.index()].push(p.handle);
            }
        }
        self.dirty = false;
        self.rebuilds += 1;
    }

    /// Draws in fixed state order, binding each non-empty state once.
    pub fn draw<B: DrawBackend>(&self, backend: &mut B, states: &RenderStateTable) -> FrameStats {
        let mut stats = FrameStats::default();
        for state in RenderState::ORDER {
            let handles = &self.per_state[state.index()];
            if handles.is_empty() {
                continue;
            }
            backend.bind_state(state, states.desc(state));
            stats.binds += 1;
            for &h in handles {
                match backend.draw(h) {
                    Ok(()) => stats.draws += 1,
                    Err(e) => {
                        stats.failed += 1;
                        log::warn!("draw {:?} under {}: {}", h, state.name(), e);
                    }
                }
            }
            backend.unbind_state(state);
        }
        stats
    }
}
