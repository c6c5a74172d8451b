use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};

pub(crate) fn read_json_file<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(value)
}

/// Writes `value` as pretty JSON to `output_path`, or to stdout when no path is given.
pub(crate) fn write_json<T>(value: &T, output_path: Option<&PathBuf>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_json_to(&mut writer, value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json_to(&mut io::stdout().lock(), value)
            .context("Failed to write JSON to stdout"),
    }
}

fn write_json_to<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: io::Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
