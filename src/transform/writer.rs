use crate::error::Result;
use serde_json::Value;
use std::io::Write;

/// Writes transform output: one compact JSON value per line, or a single document
pub struct NdjsonWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        NdjsonWriter { writer, written: 0 }
    }

    /// Write values newline-joined; no newline follows the last one
    pub fn write_sequence<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for value in values {
            if self.written > 0 {
                self.writer.write_all(b"\n")?;
            }
            serde_json::to_writer(&mut self.writer, value)?;
            self.written += 1;
        }
        Ok(())
    }

    /// Write one JSON document, pretty-printed on request
    pub fn write_document(&mut self, value: &Value, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
        } else {
            serde_json::to_writer(&mut self.writer, value)?;
        }
        self.written += 1;
        Ok(())
    }

    /// Number of values written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
