//! Per-chunk geometry cache with a resumable rebuild cursor.
//!
//! A rebuild runs as a sequence of small steps so the scheduler can spread it
//! over many frames: fetch the center column, fetch each horizontal neighbor,
//! compute exposure, run one builder per step, compile one render state per
//! step, then publish. Compiled handles live in the cursor until publish swaps
//! them in, so drawing never sees a half-built chunk.

use std::time::{Duration, Instant};

use strata_blocks::{MaterialClassifier, ShapeTable, VisibilityPolicy};
use strata_chunk::{ChunkMeta, ChunkPos};
use strata_mesh_cpu::{
    BuildInput, BuilderKind, BuilderOutput, DetailLevel, ExposureMasks, Layer, LayerSet,
    NEIGHBOR_OFFSETS, Neighborhood, RenderState, ShapeCells, builders, builders_for,
    compute_exposure, run_builder,
};
use strata_render::{CompiledPart, DrawBackend, GpuError, GraphicsContext};
use strata_world::{WorldDataSource, WorldError};
use thiserror::Error;

use crate::lod::level_sensitive_layers;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("gpu upload failed: {0}")]
    Gpu(#[from] GpuError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Unbuilt,
    Building,
    Ready,
    PartiallyInvalid,
}

/// Read-only collaborators and the graphics context a build step needs.
pub struct BuildEnv<'a, W: WorldDataSource + ?Sized, B: DrawBackend> {
    pub world: &'a W,
    pub shapes: &'a ShapeTable,
    pub classifier: &'a MaterialClassifier,
    pub policy: VisibilityPolicy,
    pub gfx: &'a mut GraphicsContext<B>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub old_bytes: usize,
    pub new_bytes: usize,
    pub steps: u32,
    pub elapsed: Duration,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing was invalid.
    UpToDate,
    /// A rebuild began; no work beyond setting up the cursor.
    Started,
    Working,
    Published(Published),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    FetchCenter,
    FetchNeighbor(usize),
    Exposure,
    Build(usize),
    Compile(usize),
    Publish,
}

struct RebuildCursor {
    stage: Stage,
    level: DetailLevel,
    layers: LayerSet,
    hood: Option<Neighborhood>,
    meta: ChunkMeta,
    cells: ShapeCells,
    exposure: Option<ExposureMasks>,
    plan: Vec<BuilderKind>,
    fresh: Vec<BuilderOutput>,
    compiled: Vec<CompiledPart>,
    steps: u32,
    started: Instant,
}

impl RebuildCursor {
    fn new(level: DetailLevel, layers: LayerSet) -> Self {
        Self {
            stage: Stage::FetchCenter,
            level,
            layers,
            hood: None,
            meta: ChunkMeta::default(),
            cells: ShapeCells::default(),
            exposure: None,
            plan: builders_for(level, layers).map(|b| b.kind).collect(),
            fresh: Vec::new(),
            compiled: Vec::new(),
            steps: 0,
            started: Instant::now(),
        }
    }

    fn needs_blocks(&self) -> bool {
        self.layers.contains(Layer::Blocks)
    }
}

pub struct ChunkRenderer {
    pos: ChunkPos,
    level: DetailLevel,
    invalid: LayerSet,
    outputs: Vec<BuilderOutput>,
    parts: Vec<CompiledPart>,
    bytes: usize,
    built: bool,
    cursor: Option<RebuildCursor>,
    seq: u64,
    gpu_failures: u32,
}

impl std::fmt::Debug for ChunkRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkRenderer")
            .field("pos", &self.pos)
            .field("level", &self.level)
            .field("phase", &self.phase())
            .field("invalid", &self.invalid)
            .field("parts", &self.parts.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}

impl ChunkRenderer {
    /// A fresh renderer with every layer invalid. `seq` orders residents by
    /// insertion for eviction ties.
    pub fn new(pos: ChunkPos, level: DetailLevel, seq: u64) -> Self {
        Self {
            pos,
            level,
            invalid: LayerSet::ALL,
            outputs: Vec::new(),
            parts: Vec::new(),
            bytes: 0,
            built: false,
            cursor: None,
            seq,
            gpu_failures: 0,
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn level(&self) -> DetailLevel {
        self.level
    }

    pub fn invalid(&self) -> LayerSet {
        self.invalid
    }

    pub fn outputs(&self) -> &[BuilderOutput] {
        &self.outputs
    }

    /// Published handles only.
    pub fn parts(&self) -> &[CompiledPart] {
        &self.parts
    }

    pub fn parts_of(&self, state: RenderState) -> impl Iterator<Item = &CompiledPart> {
        self.parts.iter().filter(move |p| p.state == state)
    }

    /// Published buffer bytes.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn gpu_failures(&self) -> u32 {
        self.gpu_failures
    }

    pub fn phase(&self) -> Phase {
        if self.cursor.is_some() {
            Phase::Building
        } else if !self.built {
            Phase::Unbuilt
        } else if !self.invalid.is_empty() {
            Phase::PartiallyInvalid
        } else {
            Phase::Ready
        }
    }

    pub fn is_building(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn needs_rebuild(&self) -> bool {
        !self.invalid.is_empty()
    }

    /// Marks `layers` invalid and drops their outputs and published handles at
    /// once. An in-flight rebuild is abandoned and restarts with the union.
    /// Returns the published bytes released.
    pub fn invalidate<B: DrawBackend>(&mut self, layers: LayerSet, gfx: &mut GraphicsContext<B>) -> usize {
        if layers.is_empty() {
            return 0;
        }
        self.invalid = self.invalid.union(layers);
        self.abandon(gfx);
        self.outputs.retain(|o| !layers.contains(o.layer));
        let (drop, keep): (Vec<_>, Vec<_>) = self.parts.drain(..).partition(|p| layers.contains(p.layer));
        self.parts = keep;
        let released = gfx.release_parts(&drop);
        self.bytes -= released;
        released
    }

    /// Switches detail level, invalidating whatever the two levels build
    /// differently. Returns the published bytes released.
    pub fn set_level<B: DrawBackend>(&mut self, level: DetailLevel, gfx: &mut GraphicsContext<B>) -> usize {
        if level == self.level {
            return 0;
        }
        let layers = level_sensitive_layers(self.level, level);
        self.level = level;
        self.invalidate(layers, gfx)
    }

    /// Drops the rebuild cursor and any handles it compiled.
    pub fn abandon<B: DrawBackend>(&mut self, gfx: &mut GraphicsContext<B>) {
        if let Some(c) = self.cursor.take() {
            gfx.release_parts(&c.compiled);
        }
    }

    /// Releases everything; returns the published bytes freed.
    pub fn discard<B: DrawBackend>(&mut self, gfx: &mut GraphicsContext<B>) -> usize {
        self.abandon(gfx);
        let released = gfx.release_parts(&self.parts);
        self.parts.clear();
        self.outputs.clear();
        self.bytes = 0;
        released
    }

    pub(crate) fn note_gpu_failure(&mut self) -> u32 {
        self.gpu_failures += 1;
        self.gpu_failures
    }

    /// Advances the rebuild by one unit of work. On error the cursor has been
    /// dropped and its handles released; published state is untouched.
    pub fn step<W, B>(&mut self, env: &mut BuildEnv<'_, W, B>) -> Result<StepOutcome, BuildError>
    where
        W: WorldDataSource + ?Sized,
        B: DrawBackend,
    {
        if self.cursor.is_none() {
            if self.invalid.is_empty() {
                return Ok(StepOutcome::UpToDate);
            }
            self.cursor = Some(RebuildCursor::new(self.level, self.invalid));
            return Ok(StepOutcome::Started);
        }
        match self.advance(env) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.abandon(env.gfx);
                Err(e)
            }
        }
    }

    /// Runs steps until the rebuild publishes or fails.
    pub fn rebuild<W, B>(&mut self, env: &mut BuildEnv<'_, W, B>) -> Result<Option<Published>, BuildError>
    where
        W: WorldDataSource + ?Sized,
        B: DrawBackend,
    {
        loop {
            match self.step(env)? {
                StepOutcome::UpToDate => return Ok(None),
                StepOutcome::Published(p) => return Ok(Some(p)),
                StepOutcome::Started | StepOutcome::Working => {}
            }
        }
    }

    fn advance<W, B>(&mut self, env: &mut BuildEnv<'_, W, B>) -> Result<StepOutcome, BuildError>
    where
        W: WorldDataSource + ?Sized,
        B: DrawBackend,
    {
        let pos = self.pos;
        let Some(c) = self.cursor.as_mut() else {
            return Ok(StepOutcome::UpToDate);
        };
        loop {
            match c.stage {
                Stage::FetchCenter => {
                    let arrays = env.world.chunk_arrays(pos)?;
                    if !arrays.is_consistent() || arrays.height != env.world.height() {
                        return Err(WorldError::corrupt(pos, "center arrays do not match the column height").into());
                    }
                    let hood = Neighborhood::new(arrays, env.world.has_sky());
                    if c.needs_blocks() {
                        c.cells = ShapeCells::scan(&hood, env.shapes);
                    }
                    if c.layers != LayerSet::only(Layer::Blocks) {
                        c.meta = env.world.chunk_meta(pos);
                    }
                    c.hood = Some(hood);
                    c.stage = if c.needs_blocks() {
                        Stage::FetchNeighbor(0)
                    } else {
                        Stage::Build(0)
                    };
                    break;
                }
                Stage::FetchNeighbor(i) => {
                    let Some(hood) = c.hood.as_mut() else {
                        c.stage = Stage::FetchCenter;
                        continue;
                    };
                    let (dx, dz) = NEIGHBOR_OFFSETS[i];
                    let npos = pos.offset(dx, dz);
                    if env.world.chunk_exists(npos) {
                        match env.world.chunk_arrays(npos) {
                            Ok(a) => hood.sides[i] = Some(a),
                            // A broken neighbor reads as air, like a missing one.
                            Err(e) => log::debug!(target: "sched", "neighbor of ({}, {}): {}", pos.cx, pos.cz, e),
                        }
                    }
                    if i + 1 == NEIGHBOR_OFFSETS.len() {
                        log::trace!(target: "mesh", "chunk ({}, {}) neighbors {:?}", pos.cx, pos.cz, hood.loaded());
                    }
                    c.stage = if i + 1 < NEIGHBOR_OFFSETS.len() {
                        Stage::FetchNeighbor(i + 1)
                    } else if c.level == DetailLevel::High {
                        Stage::Exposure
                    } else {
                        Stage::Build(0)
                    };
                    break;
                }
                Stage::Exposure => {
                    let Some(hood) = c.hood.as_ref() else {
                        c.stage = Stage::FetchCenter;
                        continue;
                    };
                    c.exposure = Some(compute_exposure(hood, env.classifier, env.policy));
                    c.stage = Stage::Build(0);
                    break;
                }
                Stage::Build(i) => {
                    let Some(&kind) = c.plan.get(i) else {
                        c.stage = Stage::Compile(0);
                        continue;
                    };
                    let Some(hood) = c.hood.as_ref() else {
                        c.stage = Stage::FetchCenter;
                        continue;
                    };
                    let input = BuildInput {
                        hood,
                        meta: &c.meta,
                        shapes: env.shapes,
                        textures: &*env.gfx.textures,
                        cells: &c.cells,
                        exposure: c.exposure.as_ref(),
                        level: c.level,
                    };
                    c.stage = Stage::Build(i + 1);
                    // Builders that own no cells return without doing work.
                    if let Some(out) = run_builder(builders::spec(kind), &input) {
                        c.fresh.push(out);
                        break;
                    }
                }
                Stage::Compile(si) => {
                    let Some(&state) = RenderState::ORDER.get(si) else {
                        c.stage = Stage::Publish;
                        continue;
                    };
                    c.stage = Stage::Compile(si + 1);
                    let mut batches = c
                        .fresh
                        .iter()
                        .flat_map(|o| o.batches.iter())
                        .filter(|b| b.state == state)
                        .peekable();
                    if batches.peek().is_none() {
                        continue;
                    }
                    let parts = env.gfx.compile_state(state, batches)?;
                    c.compiled.extend(parts);
                    break;
                }
                Stage::Publish => {
                    c.steps += 1;
                    return Ok(StepOutcome::Published(self.publish()));
                }
            }
        }
        c.steps += 1;
        Ok(StepOutcome::Working)
    }

    fn publish(&mut self) -> Published {
        let Some(c) = self.cursor.take() else {
            return Published {
                old_bytes: self.bytes,
                new_bytes: self.bytes,
                steps: 0,
                elapsed: Duration::ZERO,
            };
        };
        let layers = c.layers;
        self.outputs.retain(|o| !layers.contains(o.layer));
        self.outputs.extend(c.fresh);
        self.outputs.sort_by_key(|o| o.kind);
        self.parts.retain(|p| !layers.contains(p.layer));
        self.parts.extend(c.compiled);
        let old_bytes = self.bytes;
        self.bytes = self.parts.iter().map(|p| p.bytes).sum();
        self.invalid = self.invalid.difference(layers);
        self.built = true;
        self.gpu_failures = 0;
        Published {
            old_bytes,
            new_bytes: self.bytes,
            steps: c.steps,
            elapsed: c.started.elapsed(),
        }
    }
}
