//! Record to delimited text encoding
//!
//! Each call encodes exactly one record into its own byte chunk, so encoded rows can be
//! handed to the archive as they are produced. The header goes in front of the first chunk.

use crate::error::{TransformError, TransformResult};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

/// Default field delimiter of export CSVs
pub const DEFAULT_DELIMITER: u8 = b';';

/// Incremental CSV encoder for one archive entry
#[derive(Debug, Clone)]
pub struct CsvEncoder {
    delimiter: u8,
    header_written: bool,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl CsvEncoder {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            header_written: false,
        }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary);
        builder
    }

    /// Encode an explicit header record, once
    pub fn header<I, T>(&mut self, fields: I) -> TransformResult<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if self.header_written {
            return Ok(Vec::new());
        }
        self.header_written = true;
        self.record(fields)
    }

    /// Encode one record of raw fields
    pub fn record<I, T>(&mut self, fields: I) -> TransformResult<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut writer = self.builder().has_headers(false).from_writer(Vec::new());
        writer.write_record(fields)?;
        writer
            .into_inner()
            .map_err(|err| TransformError::Io(err.into_error()))
    }

    /// Encode one serializable record, preceded by the header derived from its field names
    /// when nothing has been written yet
    pub fn serialize<S: Serialize>(&mut self, record: &S) -> TransformResult<Vec<u8>> {
        let with_header = !self.header_written;
        let mut writer = self
            .builder()
            .has_headers(with_header)
            .from_writer(Vec::new());
        writer.serialize(record)?;
        self.header_written = true;
        writer
            .into_inner()
            .map_err(|err| TransformError::Io(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row<'a> {
        name: &'a str,
        code: Option<i64>,
    }

    #[test]
    fn test_header_only_once() {
        let mut encoder = CsvEncoder::default();
        assert_eq!(encoder.header(["a", "b"]).unwrap(), b"a;b\n");
        assert!(encoder.header(["a", "b"]).unwrap().is_empty());
        assert_eq!(encoder.record(["1", ".U"]).unwrap(), b"1;.U\n");
    }

    #[test]
    fn test_serialize_writes_header_first() {
        let mut encoder = CsvEncoder::new(b',');
        let first = encoder.serialize(&Row { name: "x;y", code: Some(1) }).unwrap();
        let second = encoder.serialize(&Row { name: "z", code: None }).unwrap();
        assert_eq!(String::from_utf8(first).unwrap(), "name,code\nx;y,1\n");
        assert_eq!(String::from_utf8(second).unwrap(), "z,\n");
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let mut encoder = CsvEncoder::default();
        assert_eq!(encoder.record(["a;b", "c"]).unwrap(), b"\"a;b\";c\n");
    }
}
