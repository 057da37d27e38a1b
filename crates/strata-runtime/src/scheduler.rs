//! Cooperative, budget-aware driver of chunk rebuilds.
//!
//! Each `step` does one bounded unit of work. Explicitly invalidated chunks
//! are served first in FIFO order; otherwise the spiral discovers positions
//! ring by ring around the camera chunk it was seeded at.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use strata_blocks::{MaterialClassifier, ShapeTable, VisibilityPolicy};
use strata_chunk::ChunkPos;
use strata_geom::{BlockBox, Vec3};
use strata_mesh_cpu::{DetailLevel, Layer, LayerSet, NEIGHBOR_OFFSETS};
use strata_render::{DrawBackend, FrameStats, GraphicsContext, MasterList};
use strata_world::WorldDataSource;

use crate::budget::ByteBudget;
use crate::chunk_renderer::{BuildEnv, BuildError, ChunkRenderer, StepOutcome};
use crate::config::SchedulerConfig;
use crate::events::{EvictReason, SchedulerEvent};
use crate::lod;
use crate::spiral::Spiral;

const MAX_EVENTS: usize = 4096;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum JobSource {
    Invalidation,
    Retry,
    Discovery,
}

#[derive(Copy, Clone, Debug)]
struct Job {
    pos: ChunkPos,
    source: JobSource,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    Worked,
    Published(ChunkPos),
    Failed(ChunkPos),
    /// A candidate was looked at and passed over.
    Skipped,
    Reseeded,
    Idle,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub resident_chunks: usize,
    pub ready_chunks: usize,
    pub buffer_bytes: usize,
    pub budget_bytes: usize,
    pub pending_work: usize,
    pub discovering: bool,
    pub steps: u64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub steps: u32,
    pub published: u32,
    pub failed: u32,
    pub idle: bool,
}

pub struct WorkScheduler<B: DrawBackend> {
    config: SchedulerConfig,
    shapes: ShapeTable,
    classifier: MaterialClassifier,
    policy: VisibilityPolicy,
    gfx: GraphicsContext<B>,
    chunks: HashMap<ChunkPos, ChunkRenderer>,
    queue: VecDeque<ChunkPos>,
    queued: HashSet<ChunkPos>,
    retry: VecDeque<ChunkPos>,
    spiral: Option<Spiral>,
    reseed_pending: bool,
    /// Budget ran out in this spiral ring: new chunks in it are skipped and
    /// discovery stops when the next ring starts.
    paused_ring: Option<u32>,
    current: Option<Job>,
    parked: Option<Job>,
    budget: ByteBudget,
    master: MasterList,
    visible: LayerSet,
    camera: Vec3,
    seed_camera: Vec3,
    overhead: bool,
    free_space: bool,
    next_seq: u64,
    events: VecDeque<SchedulerEvent>,
    steps: u64,
}

impl<B: DrawBackend> WorkScheduler<B> {
    pub fn new(config: SchedulerConfig, shapes: ShapeTable, backend: B) -> Self {
        Self::with_context(config, shapes, GraphicsContext::new(backend))
    }

    pub fn with_context(config: SchedulerConfig, shapes: ShapeTable, gfx: GraphicsContext<B>) -> Self {
        let classifier = MaterialClassifier::new(&shapes);
        let budget = ByteBudget::new(config.budget_bytes);
        Self {
            config,
            shapes,
            classifier,
            policy: VisibilityPolicy::Normal,
            gfx,
            chunks: HashMap::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            retry: VecDeque::new(),
            spiral: None,
            reseed_pending: true,
            paused_ring: None,
            current: None,
            parked: None,
            budget,
            master: MasterList::new(),
            visible: LayerSet::ALL,
            camera: Vec3::ZERO,
            seed_camera: Vec3::ZERO,
            overhead: false,
            free_space: false,
            next_seq: 0,
            events: VecDeque::new(),
            steps: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn gfx(&self) -> &GraphicsContext<B> {
        &self.gfx
    }

    pub fn backend(&self) -> &B {
        &self.gfx.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.gfx.backend
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&ChunkRenderer> {
        self.chunks.get(&pos)
    }

    pub fn is_resident(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Resident positions in sorted order.
    pub fn resident(&self) -> Vec<ChunkPos> {
        let mut v: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        v.sort();
        v
    }

    pub fn camera_chunk(&self) -> ChunkPos {
        ChunkPos::containing(self.camera.x.floor() as i32, self.camera.z.floor() as i32)
    }

    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    pub fn visible_layers(&self) -> LayerSet {
        self.visible
    }

    pub fn master(&self) -> &MasterList {
        &self.master
    }

    // --- host controls ---

    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.camera = Vec3::new(x, y, z);
    }

    pub fn set_view_distance(&mut self, chunks: u32) {
        if chunks != self.config.view_distance {
            self.config.view_distance = chunks;
            self.reseed_pending = true;
        }
    }

    /// Changing the policy changes which faces touch, so every resident chunk's
    /// Blocks layer is rebuilt.
    pub fn set_detail_policy(&mut self, rough: bool, reveal_hidden_ores: bool) {
        let policy = VisibilityPolicy::from_flags(rough, reveal_hidden_ores);
        if policy != self.policy {
            self.policy = policy;
            self.invalidate_all(LayerSet::only(Layer::Blocks));
        }
    }

    pub fn set_overhead_view(&mut self, overhead: bool) {
        if overhead != self.overhead {
            self.overhead = overhead;
            self.reseed_pending = true;
        }
    }

    /// Applies a new byte target, evicting at once if residents exceed it.
    pub fn set_budget_bytes(&mut self, bytes: usize) {
        self.budget.set_limit(bytes);
        self.enforce_budget();
    }

    /// Invalidates `layers` of every chunk touching `region` grown by one block,
    /// so faces on chunk borders are refreshed too.
    pub fn invalidate_region(&mut self, region: BlockBox, layers: LayerSet) {
        if region.is_empty() {
            return;
        }
        let Some(((x0, z0), (x1, z1))) = region.expand(1).chunk_span() else {
            return;
        };
        let mut positions = Vec::new();
        for cz in z0..=z1 {
            for cx in x0..=x1 {
                positions.push(ChunkPos::new(cx, cz));
            }
        }
        self.invalidate_chunks(positions, layers);
    }

    pub fn invalidate_chunks(&mut self, positions: impl IntoIterator<Item = ChunkPos>, layers: LayerSet) {
        if layers.is_empty() {
            return;
        }
        for pos in positions {
            // Non-resident positions are admitted when popped.
            if let Some(r) = self.chunks.get_mut(&pos) {
                let released = r.invalidate(layers, &mut self.gfx);
                self.budget.remove(released);
                self.master.mark_dirty();
            }
            if self.queued.insert(pos) {
                self.queue.push_back(pos);
            }
        }
    }

    /// Toggling a layer filters the draw and rebuilds that layer everywhere.
    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        if self.visible.contains(layer) == visible {
            return;
        }
        if visible {
            self.visible.insert(layer);
        } else {
            self.visible.remove(layer);
        }
        self.master.mark_dirty();
        self.invalidate_all(LayerSet::only(layer));
    }

    /// Invalidates chunks the world reports as changed, plus the Blocks layer
    /// of their horizontal neighbors. Returns how many chunks were dirty.
    pub fn sync_dirty<W: WorldDataSource + ?Sized>(&mut self, world: &W) -> usize {
        let dirty = world.dirty_chunks();
        let mut neighbors = Vec::new();
        for &pos in &dirty {
            for &(dx, dz) in &NEIGHBOR_OFFSETS {
                let n = pos.offset(dx, dz);
                if self.chunks.contains_key(&n) && !dirty.contains(&n) {
                    neighbors.push(n);
                }
            }
        }
        self.invalidate_chunks(dirty.iter().copied(), LayerSet::ALL);
        self.invalidate_chunks(neighbors, LayerSet::only(Layer::Blocks));
        dirty.len()
    }

    pub fn discard_all(&mut self) {
        let mut released = 0;
        for (_, mut r) in self.chunks.drain() {
            released += r.discard(&mut self.gfx);
        }
        self.budget.remove(released);
        debug_assert_eq!(self.budget.used(), 0);
        self.budget.reset();
        self.queue.clear();
        self.queued.clear();
        self.retry.clear();
        self.current = None;
        self.parked = None;
        self.spiral = None;
        self.paused_ring = None;
        self.reseed_pending = true;
        self.master.mark_dirty();
        log::debug!(target: "sched", "discarded all chunks ({} bytes)", released);
    }

    pub fn discard_chunk(&mut self, pos: ChunkPos) -> bool {
        self.remove_chunk(pos).is_some()
    }

    pub fn drain_events(&mut self) -> Vec<SchedulerEvent> {
        self.events.drain(..).collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            resident_chunks: self.chunks.len(),
            ready_chunks: self
                .chunks
                .values()
                .filter(|r| !r.is_building() && !r.needs_rebuild())
                .count(),
            buffer_bytes: self.budget.used(),
            budget_bytes: self.budget.limit(),
            pending_work: self.queue.len()
                + self.retry.len()
                + usize::from(self.current.is_some())
                + usize::from(self.parked.is_some()),
            discovering: self.spiral.as_ref().is_some_and(|s| !s.is_exhausted()),
            steps: self.steps,
        }
    }

    /// Releases every chunk and hands back the backend.
    pub fn shutdown(mut self) -> B {
        self.discard_all();
        self.gfx.backend
    }

    // --- driving ---

    /// Steps until `budget` has elapsed, the per-tick step cap is hit or there
    /// is nothing left to do.
    pub fn tick<W: WorldDataSource + ?Sized>(&mut self, world: &W, budget: Duration) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();
        while report.steps < self.config.max_steps_per_tick {
            let r = self.step(world);
            report.steps += 1;
            match r {
                StepResult::Published(_) => report.published += 1,
                StepResult::Failed(_) => report.failed += 1,
                StepResult::Idle => {
                    report.idle = true;
                    break;
                }
                _ => {}
            }
            if start.elapsed() >= budget {
                break;
            }
        }
        report
    }

    /// Steps until idle or `max_steps` is reached; returns steps taken.
    pub fn run_until_idle<W: WorldDataSource + ?Sized>(&mut self, world: &W, max_steps: usize) -> usize {
        for n in 0..max_steps {
            if self.step(world) == StepResult::Idle {
                return n + 1;
            }
        }
        max_steps
    }

    pub fn step<W: WorldDataSource + ?Sized>(&mut self, world: &W) -> StepResult {
        self.steps += 1;
        self.update_free_space(world.height());

        if self.current.is_some_and(|j| j.source == JobSource::Invalidation) {
            return self.drive(world);
        }
        if let Some(pos) = self.queue.pop_front() {
            self.queued.remove(&pos);
            match self.chunks.get(&pos) {
                Some(r) => {
                    if !r.needs_rebuild() && !r.is_building() {
                        return StepResult::Skipped;
                    }
                }
                None => {
                    if !self.admit_invalidated(world, pos) {
                        return StepResult::Skipped;
                    }
                }
            }
            if let Some(job) = self.current.take() {
                debug_assert!(self.parked.is_none());
                self.parked = Some(job);
            }
            self.current = Some(Job {
                pos,
                source: JobSource::Invalidation,
            });
            return self.drive(world);
        }

        if self.current.is_some() {
            return self.drive(world);
        }
        if let Some(job) = self.parked.take() {
            self.current = Some(job);
            return self.drive(world);
        }

        while let Some(pos) = self.retry.pop_front() {
            if self.chunks.get(&pos).is_some_and(|r| r.needs_rebuild()) {
                self.current = Some(Job {
                    pos,
                    source: JobSource::Retry,
                });
                return self.drive(world);
            }
        }

        if self.camera_moved_past_threshold() || self.reseed_pending {
            self.reseed();
            return StepResult::Reseeded;
        }

        if let Some((pos, is_new)) = self.next_discovery(world) {
            let level = self.level_for(pos);
            if is_new {
                if !self.admit(pos) {
                    self.pause_discovery(pos);
                    return StepResult::Skipped;
                }
                let seq = self.next_seq;
                self.next_seq += 1;
                self.chunks.insert(pos, ChunkRenderer::new(pos, level, seq));
            } else if let Some(r) = self.chunks.get_mut(&pos) {
                let released = r.set_level(level, &mut self.gfx);
                self.budget.remove(released);
                self.master.mark_dirty();
            }
            self.current = Some(Job {
                pos,
                source: JobSource::Discovery,
            });
            return self.drive(world);
        }
        StepResult::Idle
    }

    /// Draws every visible published part, one bind per non-empty state.
    pub fn draw_frame(&mut self) -> FrameStats {
        if self.master.is_dirty() {
            let mut resident: Vec<&ChunkRenderer> = self.chunks.values().collect();
            resident.sort_by_key(|r| r.pos());
            self.master
                .refresh(resident.iter().flat_map(|r| r.parts()), self.visible);
        }
        self.master.draw(&mut self.gfx.backend, &self.gfx.states)
    }

    fn drive<W: WorldDataSource + ?Sized>(&mut self, world: &W) -> StepResult {
        let Some(job) = self.current else {
            return StepResult::Idle;
        };
        let pos = job.pos;
        let mut env = BuildEnv {
            world,
            shapes: &self.shapes,
            classifier: &self.classifier,
            policy: self.policy,
            gfx: &mut self.gfx,
        };
        let Some(r) = self.chunks.get_mut(&pos) else {
            // Evicted while in flight.
            self.current = None;
            return StepResult::Skipped;
        };
        let outcome = r.step(&mut env);
        let level = r.level();
        let layers = r.invalid();
        match outcome {
            Ok(StepOutcome::UpToDate) => {
                self.current = None;
                StepResult::Skipped
            }
            Ok(StepOutcome::Started) => {
                self.push_event(SchedulerEvent::BuildStarted { pos, level, layers });
                StepResult::Worked
            }
            Ok(StepOutcome::Working) => StepResult::Worked,
            Ok(StepOutcome::Published(p)) => {
                self.current = None;
                self.budget.replace(p.old_bytes, p.new_bytes);
                self.master.mark_dirty();
                log::info!(
                    target: "perf",
                    "chunk ({}, {}) built level={:?} bytes={} steps={} ms={:.2}",
                    pos.cx,
                    pos.cz,
                    level,
                    p.new_bytes,
                    p.steps,
                    p.elapsed.as_secs_f64() * 1000.0
                );
                self.push_event(SchedulerEvent::BuildFinished {
                    pos,
                    level,
                    bytes: p.new_bytes,
                    steps: p.steps,
                    elapsed: p.elapsed,
                });
                self.enforce_budget();
                StepResult::Published(pos)
            }
            Err(BuildError::Gpu(e)) => {
                self.current = None;
                let attempt = r.note_gpu_failure();
                if attempt <= self.config.max_gpu_retries {
                    log::warn!(target: "sched", "chunk ({}, {}) upload failed (attempt {}): {}", pos.cx, pos.cz, attempt, e);
                    self.retry.push_back(pos);
                    self.push_event(SchedulerEvent::GpuRetry { pos, attempt });
                } else {
                    log::warn!(target: "sched", "chunk ({}, {}) dropped after {} upload failures: {}", pos.cx, pos.cz, attempt, e);
                    self.remove_chunk(pos);
                    self.push_event(SchedulerEvent::BuildFailed {
                        pos,
                        reason: e.to_string(),
                    });
                }
                StepResult::Failed(pos)
            }
            Err(BuildError::World(e)) => {
                log::warn!(target: "sched", "chunk ({}, {}) skipped: {}", pos.cx, pos.cz, e);
                self.remove_chunk(pos);
                self.push_event(SchedulerEvent::BuildFailed {
                    pos,
                    reason: e.to_string(),
                });
                StepResult::Failed(pos)
            }
        }
    }

    fn next_discovery<W: WorldDataSource + ?Sized>(&mut self, world: &W) -> Option<(ChunkPos, bool)> {
        loop {
            let (pos, ring) = match self.spiral.as_mut() {
                Some(s) => match s.next() {
                    Some(pos) => (pos, pos.chebyshev(s.center())),
                    None => {
                        self.spiral = None;
                        self.paused_ring = None;
                        return None;
                    }
                },
                None => return None,
            };
            if self.paused_ring.is_some_and(|r| ring > r) {
                log::debug!(target: "sched", "discovery paused after ring {}", ring - 1);
                self.spiral = None;
                self.paused_ring = None;
                return None;
            }
            if let Some(r) = self.chunks.get(&pos) {
                if r.is_building() {
                    continue;
                }
                if r.level() != self.level_for(pos) || r.needs_rebuild() {
                    return Some((pos, false));
                }
                continue;
            }
            if self.paused_ring.is_none() && world.chunk_exists(pos) {
                return Some((pos, true));
            }
        }
    }

    /// Lets an invalidated position that has no renderer yet jump ahead of
    /// discovery. Positions outside the load radius or absent from the world
    /// are dropped.
    fn admit_invalidated<W: WorldDataSource + ?Sized>(&mut self, world: &W, pos: ChunkPos) -> bool {
        if self.distance(pos) > self.config.load_radius() || !world.chunk_exists(pos) {
            return false;
        }
        if !self.admit(pos) {
            log::debug!(target: "sched", "budget full; invalidated chunk ({}, {}) left to discovery", pos.cx, pos.cz);
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.chunks.insert(pos, ChunkRenderer::new(pos, self.level_for(pos), seq));
        true
    }

    fn pause_discovery(&mut self, pos: ChunkPos) {
        let Some(ring) = self.spiral.as_ref().map(|s| pos.chebyshev(s.center())) else {
            return;
        };
        log::debug!(target: "sched", "budget full at ({}, {}); finishing ring {}", pos.cx, pos.cz, ring);
        self.paused_ring = Some(ring);
    }

    /// Makes room for a new chunk at `pos` by evicting residents farther away.
    /// Returns false when only nearer residents remain and the budget still
    /// cannot fit it.
    fn admit(&mut self, pos: ChunkPos) -> bool {
        let estimate = self.estimate();
        let d = self.distance(pos);
        while !self.budget.fits(estimate) {
            let Some(victim) = self.farthest(Some(d)) else {
                break;
            };
            self.evict(victim, EvictReason::Budget);
        }
        if self.budget.fits(estimate) {
            return true;
        }
        if self.chunks.is_empty() {
            log::warn!(
                target: "sched",
                "chunk ({}, {}) estimated at {} bytes exceeds the {} byte budget",
                pos.cx,
                pos.cz,
                estimate,
                self.budget.limit()
            );
            return true;
        }
        false
    }

    /// Evicts farthest-first while over budget, keeping at least one chunk.
    fn enforce_budget(&mut self) {
        while self.budget.is_over() && self.chunks.len() > 1 {
            let Some(victim) = self.farthest(None) else {
                break;
            };
            self.evict(victim, EvictReason::Budget);
        }
        if self.budget.is_over() {
            log::warn!(
                target: "sched",
                "{} bytes resident over a {} byte budget",
                self.budget.used(),
                self.budget.limit()
            );
        }
    }

    fn estimate(&self) -> usize {
        let n = self.chunks.len();
        if n == 0 || self.budget.used() == 0 {
            self.config.initial_chunk_estimate
        } else {
            self.budget.used().div_ceil(n)
        }
    }

    /// Farthest resident (older first on ties), optionally only beyond `beyond`.
    fn farthest(&self, beyond: Option<u32>) -> Option<ChunkPos> {
        let center = self.camera_chunk();
        self.chunks
            .values()
            .map(|r| (r.pos().chebyshev(center), std::cmp::Reverse(r.seq()), r.pos()))
            .filter(|&(d, _, _)| beyond.is_none_or(|b| d > b))
            .max()
            .map(|(_, _, pos)| pos)
    }

    fn evict(&mut self, pos: ChunkPos, reason: EvictReason) {
        if let Some(bytes) = self.remove_chunk(pos) {
            log::debug!(target: "sched", "evicted ({}, {}) {:?} bytes={}", pos.cx, pos.cz, reason, bytes);
            self.push_event(SchedulerEvent::Evicted { pos, bytes, reason });
        }
    }

    /// Takes the chunk's bytes off the budget, then releases and forgets it.
    fn remove_chunk(&mut self, pos: ChunkPos) -> Option<usize> {
        let bytes = self.chunks.get(&pos)?.bytes();
        self.budget.remove(bytes);
        let mut r = self.chunks.remove(&pos)?;
        r.discard(&mut self.gfx);
        if self.current.is_some_and(|j| j.pos == pos) {
            self.current = None;
        }
        if self.parked.is_some_and(|j| j.pos == pos) {
            self.parked = None;
        }
        self.master.mark_dirty();
        Some(bytes)
    }

    fn reseed(&mut self) {
        let center = self.camera_chunk();
        let radius = self.config.load_radius();
        let mut out_of_range: Vec<ChunkPos> = self
            .chunks
            .keys()
            .copied()
            .filter(|p| p.chebyshev(center) > radius)
            .collect();
        out_of_range.sort();
        for pos in out_of_range {
            self.evict(pos, EvictReason::OutOfRange);
        }
        self.spiral = Some(Spiral::new(center, radius));
        self.seed_camera = self.camera;
        self.reseed_pending = false;
        self.paused_ring = None;
        log::debug!(target: "sched", "reseeded at ({}, {}) radius={}", center.cx, center.cz, radius);
        self.push_event(SchedulerEvent::Reseeded { center, radius });
    }

    fn camera_moved_past_threshold(&self) -> bool {
        let mut d = self.camera - self.seed_camera;
        d.y = 0.0;
        d.length() > self.config.reseed_distance
    }

    fn update_free_space(&mut self, world_height: usize) {
        let free = lod::in_free_space(self.camera.y, world_height, self.config.free_space_margin);
        if free != self.free_space {
            self.free_space = free;
            self.reseed_pending = true;
        }
    }

    fn distance(&self, pos: ChunkPos) -> u32 {
        pos.chebyshev(self.camera_chunk())
    }

    fn level_for(&self, pos: ChunkPos) -> DetailLevel {
        lod::detail_level(
            self.distance(pos),
            self.config.view_distance,
            self.free_space,
            self.overhead,
        )
    }

    fn invalidate_all(&mut self, layers: LayerSet) {
        let positions = self.resident();
        self.invalidate_chunks(positions, layers);
    }

    fn push_event(&mut self, ev: SchedulerEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(ev);
    }
}
