use strata_blocks::{Block, ShapeTable, ids};
use strata_chunk::{ChunkPos, TileEntityMarker};
use strata_geom::CHUNK_WIDTH;
use strata_mesh_cpu::{BuilderKind, DetailLevel, Layer, LayerSet, RenderState};
use strata_render::{DrawCommand, RecordingBackend};
use strata_runtime::{EvictReason, SchedulerConfig, SchedulerEvent, StepResult, WorkScheduler};
use strata_world::MemoryWorld;

const MAX_STEPS: usize = 100_000;

/// One stone in the middle of each listed chunk.
fn stone_world(chunks: &[(i32, i32)]) -> MemoryWorld {
    let mut w = MemoryWorld::new(16);
    for &(cx, cz) in chunks {
        w.set_block(cx * CHUNK_WIDTH + 8, 3, cz * CHUNK_WIDTH + 8, Block::plain(ids::STONE));
    }
    w.mark_clean();
    w
}

fn scheduler(cfg: SchedulerConfig) -> WorkScheduler<RecordingBackend> {
    WorkScheduler::new(cfg, ShapeTable::new(), RecordingBackend::new())
}

fn look_at(s: &mut WorkScheduler<RecordingBackend>, cx: i32, cz: i32) {
    s.set_camera_position(
        (cx * CHUNK_WIDTH + 8) as f32,
        10.0,
        (cz * CHUNK_WIDTH + 8) as f32,
    );
}

fn settle(s: &mut WorkScheduler<RecordingBackend>, world: &MemoryWorld) {
    let n = s.run_until_idle(world, MAX_STEPS);
    assert!(n < MAX_STEPS, "scheduler never went idle");
}

fn p(cx: i32, cz: i32) -> ChunkPos {
    ChunkPos::new(cx, cz)
}

/// Buffer bytes of one chunk holding a single isolated stone.
fn single_stone_bytes() -> usize {
    let world = stone_world(&[(0, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.chunk(p(0, 0)).unwrap().bytes()
}

fn finished(events: &[SchedulerEvent]) -> Vec<ChunkPos> {
    events
        .iter()
        .filter_map(|e| match e {
            SchedulerEvent::BuildFinished { pos, .. } => Some(*pos),
            _ => None,
        })
        .collect()
}

#[test]
fn eviction_prefers_the_farthest_chunk() {
    let unit = single_stone_bytes();
    assert!(unit > 0);
    let world = stone_world(&[(1, 0), (3, 0), (5, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 8,
        low_detail_ring: 0,
        budget_bytes: 2 * unit + unit / 2,
        initial_chunk_estimate: 1,
        ..SchedulerConfig::default()
    });

    look_at(&mut s, 6, 0);
    settle(&mut s, &world);
    assert_eq!(s.resident(), vec![p(3, 0), p(5, 0)]);
    let events = s.drain_events();
    assert!(!events.iter().any(|e| matches!(e, SchedulerEvent::Evicted { .. })));

    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    let events = s.drain_events();
    let evicted: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SchedulerEvent::Evicted { pos, reason, .. } => Some((*pos, *reason)),
            _ => None,
        })
        .collect();
    assert_eq!(evicted.first(), Some(&(p(5, 0), EvictReason::Budget)));
    assert_eq!(s.resident(), vec![p(1, 0), p(3, 0)]);
    assert_eq!(s.stats().buffer_bytes, 2 * unit);
    assert_eq!(s.backend().live_bytes(), 2 * unit);
}

#[test]
fn invalidated_chunk_jumps_the_discovery_queue() {
    let mut chunks = Vec::new();
    for cz in -1..=1 {
        for cx in -1..=1 {
            chunks.push((cx, cz));
        }
    }
    let world = stone_world(&chunks);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);

    let first = loop {
        if let StepResult::Published(pos) = s.step(&world) {
            break pos;
        }
    };
    assert_eq!(first, p(0, 0));
    // Get the next discovered chunk part-way through its rebuild.
    for _ in 0..3 {
        s.step(&world);
    }
    assert!(s.stats().discovering);
    s.drain_events();

    s.invalidate_chunks([first], LayerSet::ALL);
    let next = loop {
        if let StepResult::Published(pos) = s.step(&world) {
            break pos;
        }
    };
    assert_eq!(next, first);
    let events = s.drain_events();
    assert!(matches!(events[0], SchedulerEvent::BuildStarted { pos, .. } if pos == first));

    settle(&mut s, &world);
    assert_eq!(s.resident().len(), 9);
    assert_eq!(s.stats().ready_chunks, 9);
}

#[test]
fn moving_away_downgrades_detail() {
    let world = stone_world(&[(0, 0), (3, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 2,
        low_detail_ring: 2,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert_eq!(s.chunk(p(0, 0)).unwrap().level(), DetailLevel::High);
    assert_eq!(s.chunk(p(3, 0)).unwrap().level(), DetailLevel::Low);

    look_at(&mut s, 3, 0);
    settle(&mut s, &world);
    let near = s.chunk(p(3, 0)).unwrap();
    let far = s.chunk(p(0, 0)).unwrap();
    assert_eq!(near.level(), DetailLevel::High);
    assert_eq!(far.level(), DetailLevel::Low);
    let kinds = |outs: &[strata_mesh_cpu::BuilderOutput]| outs.iter().map(|o| o.kind).collect::<Vec<_>>();
    assert_eq!(kinds(near.outputs()), vec![BuilderKind::Cube]);
    assert_eq!(kinds(far.outputs()), vec![BuilderKind::LowDetail]);
    assert!(far.parts().iter().all(|part| part.state == RenderState::LowDetail));
}

#[test]
fn overhead_view_rebuilds_everything_as_overhead() {
    let world = stone_world(&[(0, 0), (1, 1)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 2,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.set_overhead_view(true);
    settle(&mut s, &world);
    for pos in s.resident() {
        assert_eq!(s.chunk(pos).unwrap().level(), DetailLevel::Overhead);
    }
}

#[test]
fn unreadable_chunk_is_skipped_and_picked_up_after_repair() {
    let mut world = stone_world(&[(0, 0), (1, 0)]);
    world.mark_corrupt(p(0, 0), true);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert!(!s.is_resident(p(0, 0)));
    assert!(s.is_resident(p(1, 0)));
    let events = s.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SchedulerEvent::BuildFailed { pos, .. } if *pos == p(0, 0))));
    assert_eq!(s.backend().live_bytes(), s.stats().buffer_bytes);

    world.mark_corrupt(p(0, 0), false);
    s.invalidate_chunks([p(0, 0)], LayerSet::ALL);
    settle(&mut s, &world);
    assert!(s.is_resident(p(0, 0)));
}

#[test]
fn failed_upload_is_retried() {
    let world = stone_world(&[(0, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 0,
        low_detail_ring: 0,
        max_gpu_retries: 3,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    s.backend_mut().fail_next_compiles(1);
    settle(&mut s, &world);
    let events = s.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SchedulerEvent::GpuRetry { attempt: 1, .. })));
    assert_eq!(finished(&events), vec![p(0, 0)]);
    assert_eq!(s.chunk(p(0, 0)).unwrap().gpu_failures(), 0);
}

#[test]
fn repeated_upload_failure_drops_the_chunk() {
    let world = stone_world(&[(0, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 0,
        low_detail_ring: 0,
        max_gpu_retries: 2,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    s.backend_mut().fail_next_compiles(100);
    settle(&mut s, &world);
    let events = s.drain_events();
    let retries = events
        .iter()
        .filter(|e| matches!(e, SchedulerEvent::GpuRetry { .. }))
        .count();
    assert_eq!(retries, 2);
    assert!(events
        .iter()
        .any(|e| matches!(e, SchedulerEvent::BuildFailed { .. })));
    assert!(!s.is_resident(p(0, 0)));
    assert_eq!(s.backend().live_handles(), 0);
}

#[test]
fn a_chunk_larger_than_the_budget_is_still_kept() {
    let world = stone_world(&[(0, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        budget_bytes: 1,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert!(s.is_resident(p(0, 0)));
    let stats = s.stats();
    assert!(stats.buffer_bytes > stats.budget_bytes);
}

#[test]
fn shrinking_the_budget_evicts_at_once() {
    let unit = single_stone_bytes();
    let world = stone_world(&[(0, 0), (1, 0), (2, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 3,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert_eq!(s.resident().len(), 3);
    s.drain_events();

    s.set_budget_bytes(unit);
    let evicted: Vec<_> = s
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SchedulerEvent::Evicted { pos, .. } => Some(pos),
            _ => None,
        })
        .collect();
    assert_eq!(evicted, vec![p(2, 0), p(1, 0)]);
    assert_eq!(s.resident(), vec![p(0, 0)]);
}

#[test]
fn world_edits_rebuild_the_chunk_and_its_neighbors() {
    let mut world = stone_world(&[(0, 0), (1, 0), (3, 3)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 3,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.drain_events();

    world.set_block(15, 3, 8, Block::plain(ids::DIRT));
    assert_eq!(s.sync_dirty(&world), 1);
    world.mark_clean();
    settle(&mut s, &world);
    let events = s.drain_events();
    let started: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SchedulerEvent::BuildStarted { pos, layers, .. } => Some((*pos, *layers)),
            _ => None,
        })
        .collect();
    assert_eq!(
        started,
        vec![(p(0, 0), LayerSet::ALL), (p(1, 0), LayerSet::only(Layer::Blocks))]
    );
}

#[test]
fn detail_policy_change_rebuilds_blocks_everywhere() {
    let world = stone_world(&[(0, 0), (1, 0), (0, 1)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 2,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.drain_events();

    s.set_detail_policy(false, false);
    assert_eq!(s.run_until_idle(&world, MAX_STEPS), 1);

    s.set_detail_policy(true, false);
    settle(&mut s, &world);
    let mut rebuilt = finished(&s.drain_events());
    rebuilt.sort();
    assert_eq!(rebuilt, vec![p(0, 0), p(0, 1), p(1, 0)]);
}

#[test]
fn frame_binds_each_state_once_in_order() {
    let mut world = stone_world(&[(0, 0), (1, 0)]);
    world.add_tile_entity(
        p(0, 0),
        TileEntityMarker {
            x: 2,
            y: 4,
            z: 2,
            id: "Chest".into(),
        },
    );
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.backend_mut().take_commands();

    let stats = s.draw_frame();
    assert_eq!(stats.binds, 2);
    assert_eq!(stats.draws, 3);
    let binds: Vec<_> = s
        .backend_mut()
        .take_commands()
        .into_iter()
        .filter_map(|c| match c {
            DrawCommand::Bind(state) => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(binds, vec![RenderState::Opaque, RenderState::EntityOverlay]);

    s.set_layer_visible(Layer::TileEntities, false);
    settle(&mut s, &world);
    let stats = s.draw_frame();
    assert_eq!(stats.binds, 1);
    assert_eq!(stats.draws, 2);
}

#[test]
fn shutdown_releases_all_buffers() {
    let world = stone_world(&[(0, 0), (1, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert!(s.backend().live_bytes() > 0);
    let backend = s.shutdown();
    assert_eq!(backend.live_handles(), 0);
    assert_eq!(backend.live_bytes(), 0);
}

#[test]
fn equal_distance_evicts_the_older_chunk() {
    let unit = single_stone_bytes();
    let world = stone_world(&[(0, 0), (1, 0), (-1, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    // Ring 1 is walked from its (-1, -1) corner, so (1, 0) is admitted first.
    assert!(s.chunk(p(1, 0)).unwrap().seq() < s.chunk(p(-1, 0)).unwrap().seq());
    s.set_budget_bytes(2 * unit);
    assert_eq!(s.resident(), vec![p(-1, 0), p(0, 0)]);
}

fn next_published(s: &mut WorkScheduler<RecordingBackend>, world: &MemoryWorld) -> ChunkPos {
    for _ in 0..MAX_STEPS {
        if let StepResult::Published(pos) = s.step(world) {
            return pos;
        }
    }
    panic!("nothing was published");
}

#[test]
fn invalidated_new_chunk_is_built_before_discovery_continues() {
    let mut chunks = Vec::new();
    for cz in -2..=2 {
        for cx in -2..=2 {
            if (cx, cz) != (2, 2) {
                chunks.push((cx, cz));
            }
        }
    }
    let mut world = stone_world(&chunks);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 2,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    assert_eq!(next_published(&mut s, &world), p(0, 0));

    world.set_block(2 * CHUNK_WIDTH + 8, 3, 2 * CHUNK_WIDTH + 8, Block::plain(ids::STONE));
    world.mark_clean();
    s.drain_events();
    s.invalidate_chunks([p(2, 2)], LayerSet::ALL);
    assert_eq!(next_published(&mut s, &world), p(2, 2));
    let events = s.drain_events();
    assert!(matches!(events[0], SchedulerEvent::BuildStarted { pos, .. } if pos == p(2, 2)));

    settle(&mut s, &world);
    assert_eq!(s.resident().len(), 25);
    assert_eq!(s.backend().live_bytes(), s.stats().buffer_bytes);
}

#[test]
fn invalidating_a_missing_chunk_is_a_no_op() {
    let world = stone_world(&[(0, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    s.invalidate_chunks([p(1, 1), p(9, 9)], LayerSet::ALL);
    assert_eq!(s.run_until_idle(&world, MAX_STEPS), 3);
    assert_eq!(s.resident(), vec![p(0, 0)]);
}

/// Steps until `pos` has a rebuild in flight.
fn step_into_build(s: &mut WorkScheduler<RecordingBackend>, world: &MemoryWorld, pos: ChunkPos) {
    for _ in 0..MAX_STEPS {
        s.step(world);
        if s.chunk(pos).is_some_and(|r| r.is_building()) {
            return;
        }
    }
    panic!("({}, {}) never started building", pos.cx, pos.cz);
}

#[test]
fn discarding_a_chunk_mid_build_cancels_it() {
    let world = stone_world(&[(0, 0), (1, 0)]);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    step_into_build(&mut s, &world, p(1, 0));
    s.step(&world);
    assert!(s.chunk(p(1, 0)).unwrap().is_building());

    assert!(s.discard_chunk(p(1, 0)));
    assert!(!s.discard_chunk(p(1, 0)));
    settle(&mut s, &world);
    let events = s.drain_events();
    assert!(!finished(&events).contains(&p(1, 0)));
    assert!(!s.is_resident(p(1, 0)));
    assert_eq!(s.backend().live_bytes(), s.stats().buffer_bytes);
    assert_eq!(s.stats().pending_work, 0);

    // Only a fresh spiral finds it again.
    s.set_view_distance(2);
    settle(&mut s, &world);
    let events = s.drain_events();
    assert!(matches!(events[0], SchedulerEvent::Reseeded { .. }));
    assert!(finished(&events).contains(&p(1, 0)));
    assert!(s.is_resident(p(1, 0)));
    assert_eq!(s.backend().live_bytes(), s.stats().buffer_bytes);
}

#[test]
fn discarding_everything_mid_build_drops_all_work() {
    let mut chunks = Vec::new();
    for cz in -1..=1 {
        for cx in -1..=1 {
            chunks.push((cx, cz));
        }
    }
    let world = stone_world(&chunks);
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, 0, 0);
    assert_eq!(next_published(&mut s, &world), p(0, 0));
    step_into_build(&mut s, &world, p(-1, -1));
    s.invalidate_chunks([p(0, 0)], LayerSet::ALL);
    assert!(s.stats().pending_work > 0);

    s.discard_all();
    let stats = s.stats();
    assert_eq!(stats.pending_work, 0);
    assert_eq!(stats.resident_chunks, 0);
    assert_eq!(stats.buffer_bytes, 0);
    assert_eq!(s.backend().live_handles(), 0);

    settle(&mut s, &world);
    assert_eq!(s.resident().len(), 9);
    assert_eq!(s.backend().live_bytes(), s.stats().buffer_bytes);
}

#[test]
fn full_budget_still_refreshes_residents_later_in_the_ring() {
    let mut world = stone_world(&[(0, 0)]);
    world.ensure_chunk(p(1, 0));
    let mut s = scheduler(SchedulerConfig {
        view_distance: 1,
        low_detail_ring: 1,
        reseed_distance: 0.0,
        ..SchedulerConfig::default()
    });
    look_at(&mut s, -1, 0);
    settle(&mut s, &world);
    assert_eq!(s.chunk(p(0, 0)).unwrap().level(), DetailLevel::High);
    assert_eq!(s.chunk(p(1, 0)).unwrap().level(), DetailLevel::Low);

    // (0, -1) comes before (1, 0) in ring 1 and cannot fit.
    world.set_block(8, 3, 8 - CHUNK_WIDTH, Block::plain(ids::STONE));
    world.mark_clean();
    let used = s.stats().buffer_bytes;
    s.set_budget_bytes(used);
    look_at(&mut s, 0, 0);
    settle(&mut s, &world);
    assert!(!s.is_resident(p(0, -1)));
    assert_eq!(s.chunk(p(1, 0)).unwrap().level(), DetailLevel::High);
    assert!(!s.stats().discovering);
    assert_eq!(s.stats().buffer_bytes, used);
}
