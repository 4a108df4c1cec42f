//! Append-only CSV logs.
//!
//! Each file gets its header exactly once, as its first line; rows are
//! only ever appended. A crash mid-write can leave a partial trailing line,
//! which readers must tolerate.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};

use super::models::CsvRecord;
use crate::error::WriteFailure;

/// Writes rows to CSV files under a data directory.
#[derive(Debug, Clone)]
pub struct CsvAppender {
    data_dir: PathBuf,
}

impl CsvAppender {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Appends `record` to `file` using the record type's header.
    pub fn append_record<R: CsvRecord>(&self, file: &str, record: &R) -> Result<PathBuf, WriteFailure> {
        let path = self.path(file);
        append_row(&path, R::HEADER, &record.to_row())?;
        Ok(path)
    }

    /// Appends a raw row to `file`, creating it with `header` if it does not exist.
    pub fn append<S: AsRef<str>>(
        &self,
        file: &str,
        header: &[&str],
        row: &[S],
    ) -> Result<PathBuf, WriteFailure> {
        let path = self.path(file);
        append_row(&path, header, row)?;
        Ok(path)
    }
}

fn append_row<S: AsRef<str>>(path: &Path, header: &[&str], row: &[S]) -> Result<(), WriteFailure> {
    if row.len() != header.len() {
        return Err(WriteFailure::ColumnCount {
            path: path.to_path_buf(),
            expected: header.len(),
            actual: row.len(),
        });
    }

    let io_err = |source: std::io::Error| WriteFailure::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| WriteFailure::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let (file, needs_header) = open_append(path).map_err(io_err)?;

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);

    if needs_header {
        writer.write_record(header).map_err(csv_err)?;
    }
    writer
        .write_record(row.iter().map(|v| v.as_ref()))
        .map_err(csv_err)?;
    writer.flush().map_err(io_err)?;

    Ok(())
}

/// Opens `path` for appending and reports whether it still needs a header.
///
/// `create_new` makes "did we create it" atomic. An existing file that is
/// empty (left behind by a crash before the first flush) also gets one.
fn open_append(path: &Path) -> std::io::Result<(File, bool)> {
    match OpenOptions::new().append(true).create_new(true).open(path) {
        Ok(file) => Ok((file, true)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let file = OpenOptions::new().append(true).open(path)?;
            let empty = file.metadata()?.len() == 0;
            Ok((file, empty))
        },
        Err(e) => Err(e),
    }
}
