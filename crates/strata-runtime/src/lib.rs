//! Chunk renderers, the cooperative work scheduler and the LOD policy that
//! drive them (engine-only, no window or thread pool).
#![forbid(unsafe_code)]

pub mod budget;
pub mod chunk_renderer;
pub mod config;
pub mod events;
pub mod lod;
pub mod scheduler;
pub mod spiral;

pub use budget::ByteBudget;
pub use chunk_renderer::{BuildEnv, BuildError, ChunkRenderer, Phase, Published, StepOutcome};
pub use config::{ConfigError, SchedulerConfig};
pub use events::{EvictReason, SchedulerEvent};
pub use lod::{detail_level, in_free_space, level_sensitive_layers};
pub use scheduler::{SchedulerStats, StepResult, TickReport, WorkScheduler};
pub use spiral::Spiral;
