//! Index builder binary - builds a scene octree and optionally caches it.
//!
//! Usage: cargo run --release --bin build_svo -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON scene config (see `SceneConfig`)
//!   --model <PATH>    .vox model to load (overrides the config)
//!   --depth <N>       Octree depth, grid is 2^N per axis (default: 8)
//!   --out <PATH>      Write the compressed index cache (.svoc)

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use svo_index::core::Result;
use svo_index::scene::{SceneConfig, SceneManager, SceneSource};
use svo_index::storage::disk_io;

fn main() -> ExitCode {
    svo_index::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => SceneConfig::load(&path)?,
        None => SceneConfig::default(),
    };
    if let Some(model) = parse_str_arg(args, "--model") {
        config.model_path = Some(PathBuf::from(model));
    }
    if let Some(depth) = parse_u8_arg(args, "--depth") {
        config.depth = depth;
    }
    let out = parse_str_arg(args, "--out").map(PathBuf::from);

    println!("=== SVO Index Builder ===");
    println!("Depth: {}", config.depth);
    match &config.model_path {
        Some(path) => println!("Model: {}", path.display()),
        None => println!("Model: <test scene>"),
    }
    println!();

    let start = Instant::now();
    let scene = SceneManager::build(config)?;
    let elapsed = start.elapsed();

    match scene.source() {
        SceneSource::Model { path, report } => {
            println!("Loaded {}", path.display());
            println!("  inserted: {}", report.inserted);
            println!("  dropped:  {}", report.dropped);
            println!("  extent:   {:?}", report.extent);
            println!(
                "  compress: {} collapsed, {} hinted",
                report.compress.collapsed, report.compress.hinted
            );
        }
        SceneSource::TestScene => println!("Built test scene"),
    }

    let octree = scene.octree();
    println!("Grid:     {}^3", octree.grid_size());
    println!("Nodes:    {}", octree.node_count());
    println!("Colors:   {}", octree.palette().len());
    println!("Lights:   {}", octree.emissive_voxels().len());
    println!("Memory:   {:.1} KB", octree.memory_usage() as f64 / 1024.0);
    println!("Time:     {:.1} ms", elapsed.as_secs_f64() * 1000.0);

    if let Some(out) = out {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(disk_io::save_svo(&out, octree))?;
        println!("Saved to {}", out.display());
    }

    Ok(())
}

fn parse_u8_arg(args: &[String], flag: &str) -> Option<u8> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
