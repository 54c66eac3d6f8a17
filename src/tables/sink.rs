// src/tables/sink.rs
//! Output targets for a tables file.
//!
//! The header's section-size field is only known after the records that follow it,
//! so a sink must let the writer come back to an earlier slot. Seekable writers do
//! it with positional I/O; [`MemorySink`] just indexes into its buffer.

use std::io::{self, Seek, SeekFrom, Write};

/// Opaque handle to bytes reserved earlier in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    offset: u64,
    len: usize,
}

impl Slot {
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

pub trait TableSink {
    /// Append bytes at the current end of the stream.
    fn put(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Mark the next `len` bytes (written right after by the caller) for a later patch.
    fn reserve(&mut self, len: usize) -> io::Result<Slot>;

    /// Overwrite a reserved slot. The append position does not move.
    fn patch(&mut self, slot: Slot, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

fn bad_patch(slot: Slot, bytes: &[u8], end: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!(
            "patch of {} bytes at {} does not fit slot of {} bytes (stream end {})",
            bytes.len(),
            slot.offset,
            slot.len,
            end
        ),
    )
}

impl<W: Write + Seek> TableSink for W {
    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    fn reserve(&mut self, len: usize) -> io::Result<Slot> {
        Ok(Slot {
            offset: self.stream_position()?,
            len,
        })
    }

    fn patch(&mut self, slot: Slot, bytes: &[u8]) -> io::Result<()> {
        let end = self.stream_position()?;
        if bytes.len() != slot.len || slot.offset + slot.len as u64 > end {
            return Err(bad_patch(slot, bytes, end));
        }
        self.seek(SeekFrom::Start(slot.offset))?;
        self.write_all(bytes)?;
        self.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

/// In-memory sink; patches are plain slice copies.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buf: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl TableSink for MemorySink {
    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn reserve(&mut self, len: usize) -> io::Result<Slot> {
        Ok(Slot {
            offset: self.buf.len() as u64,
            len,
        })
    }

    fn patch(&mut self, slot: Slot, bytes: &[u8]) -> io::Result<()> {
        let start = slot.offset as usize;
        let end = start + slot.len;
        if bytes.len() != slot.len || end > self.buf.len() {
            return Err(bad_patch(slot, bytes, self.buf.len() as u64));
        }
        self.buf[start..end].copy_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn cursor_patch_keeps_append_position() {
        let mut c = Cursor::new(Vec::new());
        c.put(b"ab").unwrap();
        let slot = c.reserve(2).unwrap();
        c.put(b"??cd").unwrap();
        c.patch(slot, b"XY").unwrap();
        c.put(b"e").unwrap();
        assert_eq!(c.into_inner(), b"abXYcde");
    }

    #[test]
    fn memory_patch_rejects_unwritten_slot() {
        let mut m = MemorySink::new();
        let slot = m.reserve(4).unwrap();
        m.put(b"12").unwrap();
        assert!(m.patch(slot, b"abcd").is_err());
        m.put(b"34").unwrap();
        m.patch(slot, b"abcd").unwrap();
        assert_eq!(m.as_bytes(), b"abcd");
    }
}
