//! Line reader
//!
//! Streams a source one line at a time. File-backed sources are read through a
//! `BufReader`, so only the current line is resident.

use crate::error::{EngineError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// Where records come from
#[derive(Debug, Clone)]
pub enum Source {
    /// A file on disk, opened fresh on every call
    Path(PathBuf),
    /// An in-memory buffer
    Text(String),
    /// Raw in-memory bytes, which may hold invalid UTF-8 lines
    Bytes(Vec<u8>),
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Source::Text(text.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Source::Bytes(bytes.into())
    }

    /// Display name used in logs
    pub fn describe(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Text(_) | Source::Bytes(_) => "<memory>".to_string(),
        }
    }

    /// Open a new line reader positioned at the start of the source
    pub fn lines(&self) -> Result<LineReader<Box<dyn BufRead + '_>>> {
        let reader: Box<dyn BufRead + '_> = match self {
            Source::Path(path) => Box::new(BufReader::new(open(path)?)),
            Source::Text(text) => Box::new(Cursor::new(text.as_bytes())),
            Source::Bytes(bytes) => Box::new(Cursor::new(bytes.as_slice())),
        };
        Ok(LineReader::new(reader, self.path_buf()))
    }

    fn path_buf(&self) -> PathBuf {
        match self {
            Source::Path(p) => p.clone(),
            Source::Text(_) | Source::Bytes(_) => PathBuf::from("<memory>"),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| EngineError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// A raw line as read from the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number
    pub number: usize,

    /// Line text without its terminator; invalid UTF-8 is replaced lossily
    pub content: String,

    pub valid_utf8: bool,
}

impl RawLine {
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Iterator over the raw lines of a buffered reader.
///
/// Unlike `BufRead::lines`, a line that is not valid UTF-8 does not end the
/// stream; it is yielded with `valid_utf8 == false`.
pub struct LineReader<R: BufRead> {
    reader: R,
    path: PathBuf,
    buf: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, path: PathBuf) -> Self {
        LineReader {
            reader,
            path,
            buf: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<RawLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line_number += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }

                let (content, valid_utf8) = match std::str::from_utf8(&self.buf) {
                    Ok(s) => (s.to_string(), true),
                    Err(_) => (String::from_utf8_lossy(&self.buf).into_owned(), false),
                };

                Some(Ok(RawLine {
                    number: self.line_number,
                    content,
                    valid_utf8,
                }))
            }
            Err(source) => {
                self.done = true;
                Some(Err(EngineError::SourceUnavailable {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}
