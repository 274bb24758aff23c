use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use towerscape_adapter::{HeadlessHost, SceneAdapter};
use towerscape_common::{GamePoint, Rgb, SceneConfig};
use towerscape_render::DebugTextRenderer;
use towerscape_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "towerscape-cli", about = "Headless tools for the towerscape scene adapter")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Container width in CSS pixels
    #[arg(long, default_value = "800", global = true)]
    width: f32,

    /// Container height in CSS pixels
    #[arg(long, default_value = "600", global = true)]
    height: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the effective config
    Info,
    /// Project a game point to the screen and cast it back to a cell
    Project {
        x: f32,
        y: f32,
        /// Height above the ground
        #[arg(short, long, default_value = "0")]
        elevation: f32,
    },
    /// Draw a sample frame and dump it as text
    Frame,
    /// Run clear/draw/render cycles and check that resources stay flat
    Soak {
        /// Number of frames to run
        #[arg(short, long, default_value = "1000")]
        cycles: u32,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

/// A fixed board: a path, a few towers, enemies, a projectile and HUD text.
fn draw_sample(adapter: &mut SceneAdapter, frame: u32) {
    let size = adapter.logical_size();
    let cell = adapter.config().cell_size;
    let path_y = (size.height / 2.0 / cell).floor() * cell;

    adapter.draw_line(0.0, path_y + cell / 2.0, size.width, path_y + cell / 2.0, Rgb::new(0x8d, 0x6e, 0x63));
    for (i, color) in [Rgb::new(0x42, 0xa5, 0xf5), Rgb::new(0xff, 0xb7, 0x4d)]
        .into_iter()
        .enumerate()
    {
        let x = (3 + i as u32 * 4) as f32 * cell;
        adapter.draw_rect(x, path_y - cell * 2.0, cell, cell, color);
    }
    for i in 0..4 {
        let x = ((frame * 3 + i * 90) as f32) % size.width;
        adapter.draw_circle(x, path_y + cell / 2.0, 10.0, Rgb::new(0xe5, 0x39, 0x35), true);
    }
    adapter.draw_triangle(
        GamePoint::new(size.width - cell, path_y),
        GamePoint::new(size.width, path_y + cell / 2.0),
        GamePoint::new(size.width - cell, path_y + cell),
        Rgb::new(0xff, 0xee, 0x58),
        true,
    );
    // HUD leftovers the circle filter drops
    adapter.draw_circle(30.0, 18.0, 8.0, Rgb::WHITE, false);
    adapter.draw_text(&format!("Frame {frame}"), size.width / 2.0, 40.0, Rgb::WHITE, 16.0);
    adapter.draw_tower_preview(5.0 * cell + cell / 2.0, path_y - cell * 3.0 + cell / 2.0, true, 120.0);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!("container {:?}, cell size {}", config.container_id, config.cell_size);
    let host = HeadlessHost::new(config.container_id.clone(), cli.width, cli.height);

    match cli.command {
        Commands::Info => {
            println!("towerscape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", towerscape_common::crate_info());
            println!("scene: {}", towerscape_scene::crate_info());
            println!("render: {}", towerscape_render::crate_info());
            println!("input: {}", towerscape_input::crate_info());
            println!("adapter: {}", towerscape_adapter::crate_info());
            println!("tools: {}", towerscape_tools::crate_info());
            println!("--- config ---");
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Project { x, y, elevation } => {
            let adapter = SceneAdapter::initialize(&host, config)?;
            let point = GamePoint::new(x, y);
            let world = adapter.game_to_world_coords(point, elevation);
            println!("game ({x}, {y}) -> world ({:.2}, {:.2}, {:.2})", world.x, world.y, world.z);
            match adapter.game_to_screen(point, elevation) {
                Some(screen) => {
                    println!("screen ({:.2}, {:.2})", screen.x, screen.y);
                    match adapter.screen_to_game(screen.x, screen.y) {
                        Some(cell) => println!("ground cell ({}, {})", cell.x, cell.y),
                        None => println!("ground cell: none (ray misses the ground)"),
                    }
                }
                None => println!("screen: outside the view volume"),
            }
        }
        Commands::Frame => {
            let mut adapter = SceneAdapter::initialize(&host, config)?;
            let mut renderer = DebugTextRenderer::new();
            adapter.clear();
            draw_sample(&mut adapter, 0);
            print!("{}", adapter.render(&mut renderer));
            if let Some(overlay) = adapter.overlay() {
                for label in overlay.labels() {
                    println!(
                        "  text {:?} at ({:.1}, {:.1}) size={} color={}",
                        label.text, label.position.x, label.position.y, label.size, label.color
                    );
                }
            }
        }
        Commands::Soak { cycles } => {
            let mut adapter = SceneAdapter::initialize(&host, config)?;
            let mut renderer = DebugTextRenderer::new();
            let baseline = SceneInspector::summary(adapter.scene());
            println!("Baseline: {baseline}");
            tracing::info!("running {cycles} soak cycles at {}x{}", cli.width, cli.height);

            for frame in 0..cycles {
                adapter.clear();
                draw_sample(&mut adapter, frame);
                adapter.render(&mut renderer);
            }
            let peak = SceneInspector::summary(adapter.scene());
            adapter.clear();
            adapter.render(&mut renderer);
            let after = SceneInspector::summary(adapter.scene());

            println!("Last frame: {peak}");
            println!("After clear: {after}");
            println!("Renderer drained {} released ids", renderer.released_seen());
            if after.nodes != baseline.nodes || after.live_resources() != baseline.live_resources() {
                bail!(
                    "resource leak after {cycles} cycles: {} live resources, baseline {}",
                    after.live_resources(),
                    baseline.live_resources()
                );
            }
            println!("Leak check: OK");
        }
    }

    Ok(())
}
