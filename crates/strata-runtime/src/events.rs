use std::time::Duration;

use strata_chunk::ChunkPos;
use strata_mesh_cpu::{DetailLevel, LayerSet};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvictReason {
    /// Made room for a nearer chunk or brought the budget back under target.
    Budget,
    /// Outside the load radius after a reseed.
    OutOfRange,
}

/// Telemetry the host can drain after ticking.
#[derive(Clone, Debug, PartialEq)]
pub enum SchedulerEvent {
    BuildStarted {
        pos: ChunkPos,
        level: DetailLevel,
        layers: LayerSet,
    },
    BuildFinished {
        pos: ChunkPos,
        level: DetailLevel,
        bytes: usize,
        steps: u32,
        elapsed: Duration,
    },
    BuildFailed {
        pos: ChunkPos,
        reason: String,
    },
    GpuRetry {
        pos: ChunkPos,
        attempt: u32,
    },
    Evicted {
        pos: ChunkPos,
        bytes: usize,
        reason: EvictReason,
    },
    Reseeded {
        center: ChunkPos,
        radius: u32,
    },
}

impl SchedulerEvent {
    pub fn pos(&self) -> ChunkPos {
        match *self {
            SchedulerEvent::BuildStarted { pos, .. }
            | SchedulerEvent::BuildFinished { pos, .. }
            | SchedulerEvent::BuildFailed { pos, .. }
            | SchedulerEvent::GpuRetry { pos, .. }
            | SchedulerEvent::Evicted { pos, .. } => pos,
            SchedulerEvent::Reseeded { center, .. } => center,
        }
    }
}
