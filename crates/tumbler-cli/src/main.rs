use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tumbler_rig::{CameraRig, RigConfig};
use tumbler_scene::{Scene, SceneDocument};

mod session;

#[derive(Parser)]
#[command(name = "tumbler")]
#[command(about = "Pivot-relative camera rig: replay recorded navigation sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a recorded input session to a scene and print the final view.
    Replay(ReplayArgs),
    /// Print the default rig configuration as JSON.
    Config,
}

#[derive(Args)]
struct ReplayArgs {
    #[arg(long)]
    session: PathBuf,
    #[arg(long)]
    scene: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1280.0)]
    width: f64,
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay(args) => replay(args),
        Command::Config => print_default_config(),
    }
}

fn replay(args: ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => RigConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RigConfig::default(),
    };
    let scene = match &args.scene {
        Some(path) => SceneDocument::from_json_file(path)
            .and_then(|doc| doc.build())
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => Scene::new(),
    };
    info!(objects = scene.len(), "scene loaded");

    let mut rig = CameraRig::new(config).context("invalid rig configuration")?;
    if !rig.resize(args.width, args.height) {
        bail!("--width and --height must be positive");
    }

    let steps = session::load_session(&args.session)?;
    let summary = session::replay(&mut rig, &scene, &steps)?;
    info!(
        steps = summary.steps,
        changed = summary.changed,
        path = %args.session.display(),
        "replay complete"
    );
    println!("{}", serde_json::to_string_pretty(&summary.final_view)?);
    Ok(())
}

fn print_default_config() -> Result<()> {
    println!("{}", RigConfig::default().to_json_pretty()?);
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
