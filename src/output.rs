use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use csv::Writer;

use crate::batch::BatchResults;
use crate::errors::{FruitCountError, Result};

/// Serialization format of the batch output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Sibling path the output is staged in before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write through a staging file and rename, so an interrupted run never
/// leaves a half-written output behind.
fn write_atomically<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(FruitCountError::Io)?;
    }

    let staging = staging_path(path);
    let result = File::create(&staging)
        .map_err(FruitCountError::Io)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush().map_err(FruitCountError::Io)?;
            writer.get_ref().sync_all().map_err(FruitCountError::Io)
        });

    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    fs::rename(&staging, path).map_err(FruitCountError::Io)?;

    Ok(())
}

/// Write `{ "<filename>": {"<label>": n, ...}, ... }` with filenames sorted
pub fn write_json<P: AsRef<Path>>(results: &BatchResults, path: P) -> Result<()> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, results).map_err(FruitCountError::Json)?;
        writeln!(writer).map_err(FruitCountError::Io)?;
        Ok(())
    })
}

/// Write one row per image: `filename,<label>,...`
pub fn write_csv<P: AsRef<Path>>(results: &BatchResults, labels: &[String], path: P) -> Result<()> {
    write_atomically(path, |writer| {
        let mut csv_writer = Writer::from_writer(&mut *writer);

        let mut header = vec!["filename".to_string()];
        header.extend(labels.iter().cloned());
        csv_writer.write_record(&header).map_err(FruitCountError::CsvOutput)?;

        for (filename, record) in results {
            let mut row = vec![filename.clone()];
            row.extend(
                labels
                    .iter()
                    .map(|label| record.get(label).unwrap_or(0).to_string()),
            );
            csv_writer.write_record(&row).map_err(FruitCountError::CsvOutput)?;
        }

        csv_writer.flush().map_err(FruitCountError::Io)?;
        Ok(())
    })
}

/// Write results in the requested format
pub fn write_results<P: AsRef<Path>>(
    results: &BatchResults,
    labels: &[String],
    format: OutputFormat,
    path: P,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(results, path),
        OutputFormat::Csv => write_csv(results, labels, path),
    }
}
