use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kaleido::config::{self, OrientationKind, SceneConfig};
use kaleido::video::DeviceClass;
use kaleido::{LiveOrientation, ScriptedOrientation, SceneError, Simulation, UnsupportedOrientation};

#[derive(Parser, Debug)]
#[command(name = "kaleido", version, about = "Video-textured diamond sphere driven by device tilt")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for rotations and layer speeds
    #[arg(long)]
    seed: Option<u64>,

    /// Where tilt samples come from
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Log filter directive, e.g. "kaleido=debug"
    #[arg(long)]
    log_level: Option<String>,

    /// Defer video playback until the first interaction, as on phones
    #[arg(long)]
    mobile: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Pointer,
    None,
    Scripted,
}

impl From<OrientationArg> for OrientationKind {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Pointer => OrientationKind::Pointer,
            OrientationArg::None => OrientationKind::None,
            OrientationArg::Scripted => OrientationKind::Scripted,
        }
    }
}

fn init_logging(directive: Option<&str>) {
    let log_directive = directive.unwrap_or("kaleido=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            ),
        )
        .init();
}

fn load_config(args: &Args) -> Result<SceneConfig, SceneError> {
    let mut config = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => SceneConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(orientation) = args.orientation {
        config.orientation.source = orientation.into();
    }
    if args.mobile {
        config.video.device_class = Some(DeviceClass::Mobile);
    }

    config::validate(&config)?;
    Ok(config)
}

fn main() -> Result<(), SceneError> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    info!("kaleido v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let simulation = Simulation::new().with_config(config.clone());

    match config.orientation.source {
        OrientationKind::Pointer => {
            let (source, feed) = LiveOrientation::new();
            simulation
                .with_orientation_source(source)
                .with_pointer_feed(feed)
                .run()
        }
        OrientationKind::Scripted => simulation
            .with_orientation_source(ScriptedOrientation::new(config.orientation.script))
            .run(),
        OrientationKind::None => simulation
            .with_orientation_source(UnsupportedOrientation)
            .run(),
    }
}
