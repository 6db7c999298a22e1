//! Append-only CSV sink shared by all workers

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One projected record, in destination column order.
pub type Row = Vec<String>;

/// Mutex-guarded CSV appender.
///
/// A batch is written whole under one lock acquisition, so batches from
/// concurrent workers land contiguous and never interleave record by
/// record. Batch order across targets is unspecified.
pub struct CsvSink {
    writer: Mutex<csv::Writer<File>>,
    path: PathBuf,
    rows: AtomicUsize,
}

impl CsvSink {
    /// Open the destination in append mode.
    ///
    /// The header row is written only when the file does not exist yet, so
    /// sequential runs accumulate instead of truncating.
    pub fn open(path: &Path, columns: &[&str]) -> io::Result<Self> {
        let exists = path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            writer.write_record(columns).map_err(io::Error::other)?;
            writer.flush()?;
        }
        Ok(Self {
            writer: Mutex::new(writer),
            path: path.to_path_buf(),
            rows: AtomicUsize::new(0),
        })
    }

    /// Append one page's rows as a single unit, flushed before the lock
    /// is released.
    pub fn append(&self, rows: &[Row]) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock().expect("worker thread panicked");
        for row in rows {
            writer.write_record(row).map_err(io::Error::other)?;
        }
        writer.flush()?;
        self.rows.fetch_add(rows.len(), Ordering::Relaxed);
        Ok(())
    }

    /// Rows appended through this sink (this run only).
    pub fn rows_appended(&self) -> usize {
        self.rows.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for CsvSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSink")
            .field("path", &self.path)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    const COLUMNS: &[&str] = &["owner", "repo", "value"];

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    fn row(owner: &str, value: &str) -> Row {
        vec![owner.to_string(), "r".to_string(), value.to_string()]
    }

    #[test]
    fn writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[row("a", "1")]).unwrap();
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines[0], "owner,repo,value");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn reopen_appends_without_truncating() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[row("a", "1")]).unwrap();
        drop(sink);

        // Second open: header untouched, prior rows preserved
        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[row("b", "2")]).unwrap();
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "owner,repo,value");
        assert_eq!(lines[1], "a,r,1");
        assert_eq!(lines[2], "b,r,2");
    }

    #[test]
    fn reopen_without_writes_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[row("a", "1")]).unwrap();
        drop(sink);
        let before = std::fs::read_to_string(&path).unwrap();

        drop(CsvSink::open(&path, COLUMNS).unwrap());
        drop(CsvSink::open(&path, COLUMNS).unwrap());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn empty_batch_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[]).unwrap();
        assert_eq!(sink.rows_appended(), 0);
    }

    #[test]
    fn quotes_embedded_delimiters_and_newlines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::open(&path, COLUMNS).unwrap();
        sink.append(&[row("a", "body, with\nnewline and \"quotes\"")])
            .unwrap();
        drop(sink);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[2], "body, with\nnewline and \"quotes\"");
    }

    #[test]
    fn concurrent_batches_stay_contiguous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = Arc::new(CsvSink::open(&path, COLUMNS).unwrap());

        let b1 = sink.clone();
        let t1 = std::thread::spawn(move || {
            b1.append(&[row("b1", "1"), row("b1", "2"), row("b1", "3")])
                .unwrap();
        });
        let b2 = sink.clone();
        let t2 = std::thread::spawn(move || {
            b2.append(&[row("b2", "1"), row("b2", "2")]).unwrap();
        });
        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(sink.rows_appended(), 5);
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 6); // header + 5 rows

        // Each batch must be one contiguous run, whichever went first
        let owners: Vec<&str> = lines[1..]
            .iter()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert!(
            owners == ["b1", "b1", "b1", "b2", "b2"] || owners == ["b2", "b2", "b1", "b1", "b1"],
            "interleaved batches: {owners:?}"
        );
    }
}
