//! Recorded input as JSON lines, one `InputSnapshot` per line.

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::*;

use crate::{input::InputSnapshot, output::OutputCommand, session::InputRemapper};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read or write recording")]
    Io(#[from] io::Error),
    #[error("failed to parse snapshot on line {line}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode output command")]
    Encode(#[from] serde_json::Error),
}

/// Blank lines and lines starting with `#` are skipped.
pub fn read_snapshots<R: BufRead>(reader: R) -> Result<Vec<InputSnapshot>, ReplayError> {
    let mut snapshots = vec![];
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let snapshot = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

pub fn write_command<W: Write>(writer: &mut W, command: &OutputCommand) -> Result<(), ReplayError> {
    serde_json::to_writer(&mut *writer, command)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Feeds one snapshot into the remapper and writes its output.
pub fn replay_tick<W: Write>(
    remapper: &mut dyn InputRemapper,
    snapshot: &InputSnapshot,
    previous_time: Option<f64>,
    writer: &mut W,
) -> Result<OutputCommand, ReplayError> {
    if let Some(previous_time) = previous_time {
        if snapshot.time <= previous_time {
            warn!(
                time = snapshot.time,
                previous_time, "Snapshot clock did not advance, output repeats"
            );
        }
    }
    let command = remapper.poll(snapshot);
    write_command(writer, &command)?;
    Ok(command)
}

/// Runs every snapshot through the remapper, returns the number of ticks.
pub fn replay<W: Write>(
    remapper: &mut dyn InputRemapper,
    snapshots: &[InputSnapshot],
    writer: &mut W,
) -> Result<usize, ReplayError> {
    let mut previous_time = None;
    for snapshot in snapshots {
        replay_tick(remapper, snapshot, previous_time, writer)?;
        previous_time = Some(snapshot.time);
    }
    writer.flush()?;
    Ok(snapshots.len())
}
