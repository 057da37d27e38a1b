//! Backend-agnostic GPU side of the pipeline: draw backends, render-state
//! descriptors, compiled chunk parts and the per-state master draw list.
#![forbid(unsafe_code)]

pub mod backend;
pub mod context;
pub mod master;
pub mod recording;
pub mod state;

pub use backend::{DrawBackend, DrawHandle, GpuError};
pub use context::{CompiledPart, GraphicsContext};
pub use master::{FrameStats, MasterList};
pub use recording::{DrawCommand, RecordingBackend};
pub use state::{BlendMode, RenderStateTable, StateDesc};
