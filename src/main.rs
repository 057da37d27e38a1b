//! Headless driver: generates terrain around the origin, flies a camera across
//! it and runs the chunk scheduler against a recording backend.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use strata_blocks::{Block, ShapeTable, ids};
use strata_chunk::ChunkPos;
use strata_render::RecordingBackend;
use strata_runtime::{SchedulerConfig, SchedulerEvent, WorkScheduler};
use strata_world::{MemoryWorld, TerrainGen, TerrainParams};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Run the chunk build scheduler over generated terrain")]
struct Args {
    /// Scheduler config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Shape table overrides (TOML)
    #[arg(long)]
    shapes: Option<PathBuf>,
    /// Terrain parameters (TOML)
    #[arg(long)]
    terrain: Option<PathBuf>,
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    #[arg(long, default_value_t = 128)]
    height: usize,
    /// Rings of chunks generated around the origin
    #[arg(long, default_value_t = 12)]
    world_radius: i32,
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Time budget of one tick, in milliseconds
    #[arg(long, default_value_t = 8)]
    tick_ms: u64,
    /// Starting camera position
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        default_values_t = [8.0, 100.0, 8.0]
    )]
    camera: Vec<f32>,
    /// Camera travel along +x per tick, in blocks
    #[arg(long, default_value_t = 0.5)]
    speed: f32,
    #[arg(long)]
    view_distance: Option<u32>,
    /// Treat every non-air block as the same material
    #[arg(long)]
    rough: bool,
    /// Let ores show through common terrain
    #[arg(long)]
    reveal_ores: bool,
    #[arg(long)]
    overhead: bool,
    /// Drop a block onto the terrain under the camera every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    edit_every: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SchedulerConfig::from_path(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(v) = args.view_distance {
        config.view_distance = v;
    }
    let shapes = match &args.shapes {
        Some(path) => ShapeTable::from_path(path)?,
        None => ShapeTable::new(),
    };
    let params = match &args.terrain {
        Some(path) => TerrainParams::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => TerrainParams::default(),
    };
    let [mut x, y, z] = args.camera[..] else {
        return Err("--camera takes exactly three values".into());
    };

    let terrain = TerrainGen::new(args.seed, args.height, params);
    let mut world = MemoryWorld::new(args.height);
    terrain.populate(&mut world, ChunkPos::new(0, 0), args.world_radius);

    let mut sched = WorkScheduler::new(config, shapes, RecordingBackend::new().without_log());
    sched.set_detail_policy(args.rough, args.reveal_ores);
    sched.set_overhead_view(args.overhead);

    let tick_budget = Duration::from_millis(args.tick_ms);
    let (mut published, mut failed, mut draws) = (0u32, 0u32, 0usize);
    for tick in 0..args.ticks {
        sched.set_camera_position(x, y, z);
        if args.edit_every > 0 && tick > 0 && tick % args.edit_every == 0 {
            let (wx, wz) = (x.floor() as i32, z.floor() as i32);
            let wy = terrain.surface_height(wx, wz) + 1;
            if world.set_block(wx, wy, wz, Block::plain(ids::COBBLESTONE)) {
                let n = sched.sync_dirty(&world);
                world.mark_clean();
                log::debug!(target: "sched", "edit at ({}, {}, {}) dirtied {} chunk(s)", wx, wy, wz, n);
            }
        }

        let report = sched.tick(&world, tick_budget);
        published += report.published;
        failed += report.failed;
        draws += sched.draw_frame().draws;

        for ev in sched.drain_events() {
            match ev {
                SchedulerEvent::Reseeded { center, radius } => {
                    log::debug!(target: "sched", "reseed ({}, {}) r={}", center.cx, center.cz, radius)
                }
                other => log::trace!(target: "sched", "{:?}", other),
            }
        }
        if tick % 60 == 0 {
            let s = sched.stats();
            log::info!(
                "tick {} camera=({:.1}, {:.1}, {:.1}) resident={} ready={} bytes={}/{} pending={}",
                tick,
                x,
                y,
                z,
                s.resident_chunks,
                s.ready_chunks,
                s.buffer_bytes,
                s.budget_bytes,
                s.pending_work
            );
        }
        x += args.speed;
    }

    let s = sched.stats();
    log::info!(
        "done: {} builds published, {} failed, {} draws, {} resident chunks ({} bytes) after {} steps",
        published,
        failed,
        draws,
        s.resident_chunks,
        s.buffer_bytes,
        s.steps
    );
    let backend = sched.shutdown();
    log::info!(
        "backend: {} uploads total, {} handles still live",
        backend.compiled_total(),
        backend.live_handles()
    );
    Ok(())
}
