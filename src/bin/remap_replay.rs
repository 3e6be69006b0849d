use anyhow::Result;
use clap::Parser;
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::*;
use vr_input_remap::{
    configuration::{self, ProfileKind},
    logging, replay,
    session::remapper_from_config,
};

#[derive(Parser, Debug)]
#[command(version, about = "Replay recorded VR input through a remapping profile")]
struct Args {
    /// recorded input, one JSON snapshot per line, `-` for stdin
    input: PathBuf,

    /// path to config
    #[arg(long)]
    config: Option<PathBuf>,

    /// overrides the profile from config
    #[arg(long, value_enum)]
    profile: Option<ProfileKind>,

    /// output path, defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// pace ticks at the configured tick rate
    #[arg(long)]
    realtime: bool,

    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbosity);

    let mut app_config = configuration::AppConfig::load_config(&args.config)?;
    if let Some(profile) = args.profile {
        app_config.profile = profile;
    }

    let snapshots = if args.input.as_os_str() == "-" {
        replay::read_snapshots(io::stdin().lock())?
    } else {
        replay::read_snapshots(BufReader::new(File::open(&args.input)?))?
    };
    info!(ticks = snapshots.len(), "Loaded recording");

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut remapper = remapper_from_config(&app_config);
    info!(profile = remapper.profile_name(), "Replaying");

    if args.realtime {
        let mut ticker = interval(app_config.replay.tick_period()?);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous_time = None;
        for snapshot in &snapshots {
            ticker.tick().await;
            replay::replay_tick(remapper.as_mut(), snapshot, previous_time, &mut writer)?;
            writer.flush()?;
            previous_time = Some(snapshot.time);
        }
    } else {
        replay::replay(remapper.as_mut(), &snapshots, &mut writer)?;
    }

    info!("Replay finished");
    Ok(())
}
