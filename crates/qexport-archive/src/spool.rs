//! Archive output for sinks that cannot seek
//!
//! The zip writer only seeks back into the entry it is currently writing, to patch the local
//! header once sizes and checksum are known. [`SpoolWriter`] keeps the bytes of that entry in
//! memory and hands everything before the current position to the sink whenever it is flushed.
//! The assembler flushes after every finished entry, so at most one compressed entry is held.

use futures::channel::mpsc;
use std::io::{self, Seek, SeekFrom, Write};

/// Seekable front for a forward-only sink
#[derive(Debug)]
pub struct SpoolWriter<W: Write> {
    inner: W,
    /// Bytes already handed to the sink
    committed: u64,
    /// Bytes from `committed` on
    spool: Vec<u8>,
    position: u64,
}

impl<W: Write> SpoolWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            committed: 0,
            spool: Vec::new(),
            position: 0,
        }
    }

    /// Bytes the sink has received so far
    pub fn committed(&self) -> u64 {
        self.committed
    }

    /// Bytes held back because they may still be rewritten
    pub fn spooled(&self) -> usize {
        self.spool.len()
    }

    /// Hand every remaining byte to the sink and return it
    pub fn into_inner(mut self) -> io::Result<W> {
        self.position = self.committed + self.spool.len() as u64;
        self.flush()?;
        Ok(self.inner)
    }

    fn offset(&self) -> usize {
        (self.position - self.committed) as usize
    }
}

impl<W: Write> Write for SpoolWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let offset = self.offset();
        let end = offset + buf.len();
        if end > self.spool.len() {
            self.spool.resize(end, 0);
        }
        self.spool[offset..end].copy_from_slice(buf);
        self.position += buf.len() as u64;
        Ok(buf.len())
    }

    /// Commit everything before the current position
    fn flush(&mut self) -> io::Result<()> {
        let offset = self.offset().min(self.spool.len());
        if offset > 0 {
            self.inner.write_all(&self.spool[..offset])?;
            self.spool.drain(..offset);
            self.committed += offset as u64;
        }
        self.inner.flush()
    }
}

impl<W: Write> Seek for SpoolWriter<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let end = self.committed + self.spool.len() as u64;
        let target = match pos {
            SeekFrom::Start(target) => Some(target),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => end.checked_add_signed(delta),
        };
        match target {
            Some(target) if target >= self.committed => {
                self.position = target;
                Ok(target)
            }
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot seek before byte {} of a streamed archive", self.committed),
            )),
        }
    }
}

/// Sink that forwards every committed chunk to a channel
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    sender: mpsc::UnboundedSender<Vec<u8>>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.sender
            .unbounded_send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "archive receiver dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer for the assembler paired with the stream of archive bytes it produces
///
/// Chunks arrive entry by entry while the archive is being written. The stream ends once the
/// writer returned by `finalize` is dropped.
pub fn byte_channel() -> (SpoolWriter<ChannelWriter>, mpsc::UnboundedReceiver<Vec<u8>>) {
    let (sender, receiver) = mpsc::unbounded();
    (SpoolWriter::new(ChannelWriter { sender }), receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rewrites_inside_spool() {
        let mut writer = SpoolWriter::new(Vec::new());
        writer.write_all(b"header-0000-data").unwrap();
        writer.seek(SeekFrom::Start(7)).unwrap();
        writer.write_all(b"1234").unwrap();
        writer.seek(SeekFrom::End(0)).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.committed(), 16);
        assert_eq!(writer.into_inner().unwrap(), b"header-1234-data".to_vec());
    }

    #[test]
    fn test_flush_commits_up_to_position() {
        let mut writer = SpoolWriter::new(Vec::new());
        writer.write_all(b"abcdef").unwrap();
        writer.seek(SeekFrom::Start(2)).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.committed(), 2);
        assert_eq!(writer.spooled(), 4);
        assert_eq!(writer.into_inner().unwrap(), b"abcdef".to_vec());
    }

    #[test]
    fn test_no_seek_before_committed_bytes() {
        let mut writer = SpoolWriter::new(Vec::new());
        writer.write_all(b"abcdef").unwrap();
        writer.flush().unwrap();

        let error = writer.seek(SeekFrom::Start(3)).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::Unsupported);
        assert_eq!(writer.seek(SeekFrom::Current(0)).unwrap(), 6);
    }

    #[test]
    fn test_channel_receives_committed_chunks() {
        let (mut writer, mut receiver) = byte_channel();
        writer.write_all(b"first").unwrap();
        writer.flush().unwrap();
        writer.write_all(b"second").unwrap();
        assert_eq!(receiver.try_recv().unwrap(), b"first".to_vec());
        assert!(receiver.try_recv().is_err());

        drop(writer.into_inner().unwrap());
        assert_eq!(receiver.try_recv().unwrap(), b"second".to_vec());
        assert!(receiver.try_recv().is_err());
    }
}
