//! Durable append of records to a collection file.

use super::line::encode_line;
use super::CodecError;
use crate::model::LogLine;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

/// How [`append_record`] treats the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOptions {
    /// Create the collection file if it does not exist yet.
    /// When false, appending to a missing file fails with [`CodecError::FileNotFound`].
    pub create_if_missing: bool,
    /// `fdatasync` the file after every append.
    pub sync: bool,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            create_if_missing: false,
            sync: true,
        }
    }
}

/// Appends one record, plus its terminating newline, to the collection file at `path`.
///
/// The record is encoded before the file is touched, and the encoded line is written with a
/// single `write_all`. If the write, the flush or the sync fails, the file is truncated back
/// to its previous length, so readers only ever see complete lines and an error means the
/// record was not appended.
pub fn append_record(
    path: impl AsRef<Path>,
    line: &LogLine,
    options: &AppendOptions,
) -> Result<(), CodecError> {
    let path = path.as_ref();

    let mut buf = encode_line(line)?.into_bytes();
    buf.push(b'\n');

    let mut file = OpenOptions::new()
        .append(true)
        .create(options.create_if_missing)
        .open(path)
        .map_err(|e| CodecError::on_open(e, path))?;

    commit_line(&mut file, &buf, options.sync, path)
}

/// The file operations an append needs.
trait AppendTarget: Write {
    fn committed_len(&self) -> io::Result<u64>;
    fn sync(&self) -> io::Result<()>;
    fn truncate(&self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn committed_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `buf` and optionally syncs it, truncating back to the starting length on failure.
fn commit_line<F: AppendTarget>(
    file: &mut F,
    buf: &[u8],
    sync: bool,
    path: &Path,
) -> Result<(), CodecError> {
    let committed_len = file.committed_len()?;
    let written = file
        .write_all(buf)
        .and_then(|()| file.flush())
        .and_then(|()| if sync { file.sync() } else { Ok(()) });

    if let Err(e) = written {
        if let Err(truncate_err) = file.truncate(committed_len) {
            warn!(path = %path.display(), error = %truncate_err, "Failed to roll back partial append");
        }
        return Err(CodecError::IoFailure(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_collection;
    use serde_json::json;
    use std::cell::RefCell;
    use tempfile::{NamedTempFile, TempDir};

    /// An in-memory file whose sync can be made to fail.
    #[derive(Default)]
    struct FakeFile {
        data: RefCell<Vec<u8>>,
        fail_sync: bool,
    }

    impl Write for FakeFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl AppendTarget for FakeFile {
        fn committed_len(&self) -> io::Result<u64> {
            Ok(self.data.borrow().len() as u64)
        }

        fn sync(&self) -> io::Result<()> {
            if self.fail_sync {
                Err(io::Error::other("fdatasync failed"))
            } else {
                Ok(())
            }
        }

        fn truncate(&self, len: u64) -> io::Result<()> {
            self.data.borrow_mut().truncate(len as usize);
            Ok(())
        }
    }

    fn log_line(value: serde_json::Value) -> LogLine {
        LogLine::try_from(value).unwrap()
    }

    #[test]
    fn test_append_log_line() {
        let file = NamedTempFile::new().unwrap();

        append_record(
            file.path(),
            &log_line(json!({"a": 1.0, "b": "hello world", "c": true})),
            &AppendOptions::default(),
        )
        .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "{\"a\":1,\"b\":\"hello world\",\"c\":true}\n");

        let parsed: LogLine = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, log_line(json!({"a": 1, "b": "hello world", "c": true})));
    }

    #[test]
    fn test_appends_accumulate_in_order() {
        let file = NamedTempFile::new().unwrap();
        let options = AppendOptions::default();

        for i in 0..5 {
            append_record(file.path(), &log_line(json!({"seq": i})), &options).unwrap();
        }

        let lines = read_collection(file.path()).unwrap();
        let seqs: Vec<f64> = lines
            .iter()
            .map(|l| l.get("seq").unwrap().as_f64().unwrap())
            .collect();
        assert_eq!(seqs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_missing_file_is_not_created_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.txt");

        let result = append_record(&path, &log_line(json!({"a": 1})), &AppendOptions::default());
        assert!(matches!(result, Err(CodecError::FileNotFound(p)) if p == path));
        assert!(!path.exists());
    }

    #[test]
    fn test_create_if_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("created.txt");
        let options = AppendOptions {
            create_if_missing: true,
            sync: false,
        };

        append_record(&path, &log_line(json!({"a": 1})), &options).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_append_to_directory_is_io_failure() {
        let dir = TempDir::new().unwrap();
        let result = append_record(
            dir.path(),
            &log_line(json!({"a": 1})),
            &AppendOptions::default(),
        );
        assert!(matches!(result, Err(CodecError::IoFailure(_))));
    }

    #[test]
    fn test_failed_sync_rolls_back_the_record() {
        let mut file = FakeFile {
            data: RefCell::new(b"{\"a\":1}\n".to_vec()),
            fail_sync: true,
        };

        let result = commit_line(&mut file, b"{\"a\":2}\n", true, Path::new("fake.txt"));
        assert!(matches!(result, Err(CodecError::IoFailure(_))));
        assert_eq!(file.data.borrow().as_slice(), b"{\"a\":1}\n");

        // Without sync the same target accepts the line.
        commit_line(&mut file, b"{\"a\":2}\n", false, Path::new("fake.txt")).unwrap();
        assert_eq!(file.data.borrow().as_slice(), b"{\"a\":1}\n{\"a\":2}\n");
    }

    #[test]
    fn test_non_finite_record_leaves_file_untouched() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"a\":1}\n").unwrap();

        let mut line = log_line(json!({"url": "/test/url"}));
        line.insert("latency", f64::INFINITY);
        let result = append_record(file.path(), &line, &AppendOptions::default());

        assert!(matches!(result, Err(CodecError::EncodeFailure(_))));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "{\"a\":1}\n");
    }
}
