//! Forward-only reading of collection sources.

use super::line::decode_line_at;
use super::CodecError;
use crate::model::LogLine;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads and parses a collection source line by line.
///
/// The source is consumed front to back; [`read_next`](Self::read_next) returns `Ok(None)`
/// once every line has been read, which is distinct from a malformed line.
pub struct CollectionReader<R> {
    reader: R,
    buf: Vec<u8>,
    lines_read: usize,
}

impl<R: BufRead> CollectionReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            lines_read: 0,
        }
    }

    /// Reads and decodes the next line.
    ///
    /// Returns `Ok(None)` at end of stream. A blank line is not a JSON object and a line that
    /// is not valid UTF-8 is not JSON; both are reported as [`CodecError::MalformedRecord`].
    /// Only failures of the underlying source are [`CodecError::IoFailure`].
    pub fn read_next(&mut self) -> Result<Option<LogLine>, CodecError> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;

        let mut raw = self.buf.as_slice();
        if let Some(rest) = raw.strip_suffix(b"\n") {
            raw = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        decode_line_at(raw, self.lines_read).map(Some)
    }

    /// Reads every remaining line in order.
    ///
    /// Stops at the first error and discards whatever was collected before it.
    pub fn read_all(&mut self) -> Result<Vec<LogLine>, CodecError> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of lines consumed so far, including a line that failed to decode.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl CollectionReader<BufReader<File>> {
    /// Opens a collection file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CodecError::on_open(e, path))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for CollectionReader<R> {
    type Item = Result<LogLine, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Reads a whole collection file.
pub fn read_collection(path: impl AsRef<Path>) -> Result<Vec<LogLine>, CodecError> {
    CollectionReader::open(path)?.read_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    const COLLECTION: &str = concat!(
        "{\"a\": 1, \"b\": \"hello world\", \"c\": true}\n",
        "{\"d\": [1, 2, 3], \"e\": {\"ee\": 1}}"
    );

    fn log_line(value: serde_json::Value) -> LogLine {
        LogLine::try_from(value).unwrap()
    }

    #[test]
    fn test_read_next() {
        let mut reader = CollectionReader::new(Cursor::new(COLLECTION));

        let line1 = reader.read_next().unwrap();
        assert_eq!(
            line1,
            Some(log_line(json!({"a": 1.0, "b": "hello world", "c": true})))
        );

        let line2 = reader.read_next().unwrap();
        assert_eq!(
            line2,
            Some(log_line(json!({"d": [1.0, 2.0, 3.0], "e": {"ee": 1.0}})))
        );

        assert!(reader.read_next().unwrap().is_none());
        // End of stream is sticky.
        assert!(reader.read_next().unwrap().is_none());
        assert_eq!(reader.lines_read(), 2);
    }

    #[test]
    fn test_read_all() {
        let mut reader = CollectionReader::new(Cursor::new(COLLECTION));
        let lines = reader.read_all().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            log_line(json!({"a": 1.0, "b": "hello world", "c": true}))
        );
        assert_eq!(
            lines[1],
            log_line(json!({"d": [1.0, 2.0, 3.0], "e": {"ee": 1.0}}))
        );
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_trailing_newline_is_not_a_record() {
        let mut reader = CollectionReader::new(Cursor::new("{\"a\":1}\n{\"a\":2}\n"));
        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut reader = CollectionReader::new(Cursor::new("{\"a\":1}\r\n{\"a\":2}\r\n"));
        let lines = reader.read_all().unwrap();
        assert_eq!(lines[1], log_line(json!({"a": 2.0})));
    }

    #[test]
    fn test_malformed_line() {
        let mut reader = CollectionReader::new(Cursor::new("{\"a\": }"));
        let err = reader.read_next().unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_read_all_is_all_or_nothing() {
        let source = "{\"a\":1}\n{\"b\":2}\n{\"a\": }\n{\"c\":3}\n";
        let mut reader = CollectionReader::new(Cursor::new(source));
        let err = reader.read_all().unwrap_err();
        assert!(matches!(err, CodecError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let mut reader = CollectionReader::new(Cursor::new("{\"a\":1}\n\n{\"a\":2}\n"));
        assert!(reader.read_next().unwrap().is_some());
        assert!(matches!(
            reader.read_next(),
            Err(CodecError::MalformedRecord { line: 2, .. })
        ));
        assert!(reader.read_next().unwrap().is_some());
    }

    #[test]
    fn test_invalid_utf8_is_malformed_and_keeps_line_numbers() {
        let source = b"\xff\n{\"a\": }\n{\"s\": \"\xc3\x28\"}\n{\"a\":1}\n".to_vec();
        let mut reader = CollectionReader::new(Cursor::new(source));

        assert!(matches!(
            reader.read_next(),
            Err(CodecError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            reader.read_next(),
            Err(CodecError::MalformedRecord { line: 2, .. })
        ));
        // Invalid UTF-8 inside a string value.
        assert!(matches!(
            reader.read_next(),
            Err(CodecError::MalformedRecord { line: 3, .. })
        ));
        assert_eq!(reader.read_next().unwrap(), Some(log_line(json!({"a": 1.0}))));
        assert_eq!(reader.lines_read(), 4);
    }

    #[test]
    fn test_source_failure_is_io_failure() {
        struct Unreadable;

        impl std::io::Read for Unreadable {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk went away"))
            }
        }

        let mut reader = CollectionReader::new(BufReader::new(Unreadable));
        assert!(matches!(reader.read_next(), Err(CodecError::IoFailure(_))));
        assert_eq!(reader.lines_read(), 0);
    }

    #[test]
    fn test_iterator() {
        let reader = CollectionReader::new(Cursor::new(COLLECTION));
        let lines: Result<Vec<_>, _> = reader.collect();
        assert_eq!(lines.unwrap().len(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = CollectionReader::open(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(CodecError::FileNotFound(_))));
    }
}
