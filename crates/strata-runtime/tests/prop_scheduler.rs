use hashbrown::HashSet;
use proptest::prelude::*;
use strata_blocks::{Block, ShapeTable, ids};
use strata_chunk::ChunkPos;
use strata_geom::CHUNK_WIDTH;
use strata_render::RecordingBackend;
use strata_runtime::{SchedulerConfig, Spiral, WorkScheduler};
use strata_world::{MemoryWorld, WorldDataSource};

proptest! {
    #[test]
    fn spiral_covers_each_ring_in_order(cx in -50i32..50, cz in -50i32..50, radius in 0u32..6) {
        let center = ChunkPos::new(cx, cz);
        let spiral = Spiral::new(center, radius);
        let expected = spiral.remaining();
        let got: Vec<ChunkPos> = spiral.collect();
        prop_assert_eq!(got.len(), expected);
        prop_assert_eq!(got.len(), ((2 * radius + 1) * (2 * radius + 1)) as usize);
        let unique: HashSet<ChunkPos> = got.iter().copied().collect();
        prop_assert_eq!(unique.len(), got.len());
        let rings: Vec<u32> = got.iter().map(|p| p.chebyshev(center)).collect();
        prop_assert!(rings.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(rings.last().copied(), Some(radius));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn resident_bytes_always_match_the_budget(
        stones in prop::collection::vec((-3i32..=3, -3i32..=3, 0i32..16, 0i32..8, 0i32..16), 1..40),
        budget_bytes in 0usize..40_000,
        moves in prop::collection::vec((-4i32..=4, -4i32..=4), 1..4),
    ) {
        let mut world = MemoryWorld::new(8);
        for &(cx, cz, lx, y, lz) in &stones {
            world.set_block(cx * CHUNK_WIDTH + lx, y, cz * CHUNK_WIDTH + lz, Block::plain(ids::STONE));
        }
        world.mark_clean();

        let cfg = SchedulerConfig {
            view_distance: 2,
            low_detail_ring: 1,
            budget_bytes,
            initial_chunk_estimate: 512,
            reseed_distance: 0.0,
            ..SchedulerConfig::default()
        };
        let mut s = WorkScheduler::new(cfg, ShapeTable::new(), RecordingBackend::new().without_log());

        for &(cx, cz) in &moves {
            s.set_camera_position((cx * CHUNK_WIDTH + 8) as f32, 4.0, (cz * CHUNK_WIDTH + 8) as f32);
            let steps = s.run_until_idle(&world, 50_000);
            prop_assert!(steps < 50_000);

            let stats = s.stats();
            let resident = s.resident();
            let sum: usize = resident.iter().map(|&pos| s.chunk(pos).map_or(0, |r| r.bytes())).sum();
            prop_assert_eq!(sum, stats.buffer_bytes);
            prop_assert_eq!(s.backend().live_bytes(), stats.buffer_bytes);
            if resident.len() > 1 {
                prop_assert!(stats.buffer_bytes <= stats.budget_bytes);
            }
            let center = s.camera_chunk();
            for pos in resident {
                prop_assert!(world.chunk_exists(pos));
                prop_assert!(pos.chebyshev(center) <= s.config().load_radius());
            }
        }
    }
}
