// src/tables/writer.rs
//! Primitive big-endian writer and the session that drives a tables file.
//!
//! Every byte goes through [`TableWriter`]'s primitives so `total_written` always
//! matches what the sink holds. Backpatches overwrite bytes already counted.

use std::time::Instant;

use log::{debug, trace};

use super::{
    compress::compress,
    error::{Result, TableError},
    header::TableHeader,
    record::TableRecord,
    sink::{Slot, TableSink},
};

/// Bytes needed (0..=7) to pad `n` to the next 8-byte boundary.
#[inline]
pub fn pad64(n: u64) -> u64 {
    (8 - n % 8) % 8
}

#[derive(Debug, Clone, Copy)]
struct HeaderState {
    section_slot: Slot,
    header_size: u64,
}

/// Totals reported when a session is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub header_bytes: u64,
    pub section_bytes: u64,
    pub records: usize,
    pub total_bytes: u64,
}

pub struct TableWriter<S: TableSink> {
    sink: S,
    total_written: u64,
    header: Option<HeaderState>,
    records: usize,
    // set by any failed write; the output is truncated and must be discarded
    failed: bool,
}

impl<S: TableSink> TableWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            total_written: 0,
            header: None,
            records: 0,
            failed: false,
        }
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Bytes written after the header so far (0 before the header).
    pub fn section_size(&self) -> u64 {
        self.header
            .map(|h| self.total_written - h.header_size)
            .unwrap_or(0)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// True once a write has failed; every later write is refused.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.failed {
            return Err(TableError::SessionFailed);
        }
        Ok(())
    }

    fn poison_on_err<T>(&mut self, r: Result<T>) -> Result<T> {
        if r.is_err() {
            self.failed = true;
        }
        r
    }

    // -------------------- primitives --------------------

    pub fn write8(&mut self, v: u8) -> Result<usize> {
        self.write_bytes(&[v])
    }

    pub fn write16(&mut self, v: u16) -> Result<usize> {
        self.write_bytes(&v.to_be_bytes())
    }

    pub fn write32(&mut self, v: u32) -> Result<usize> {
        self.write_bytes(&v.to_be_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        self.ensure_usable()?;
        let put = self.sink.put(bytes).map_err(TableError::from);
        self.poison_on_err(put)?;
        self.total_written += bytes.len() as u64;
        Ok(bytes.len())
    }

    /// Zero bytes up to the next 8-byte boundary of `total_written`.
    pub fn pad64(&mut self) -> Result<usize> {
        const ZEROS: [u8; 8] = [0; 8];
        let pad = pad64(self.total_written) as usize;
        self.write_bytes(&ZEROS[..pad])
    }

    /// Write a 32-bit placeholder and remember where it went.
    pub(crate) fn reserve32(&mut self, placeholder: u32) -> Result<(Slot, usize)> {
        let slot = self.sink.reserve(4)?;
        let n = self.write32(placeholder)?;
        Ok((slot, n))
    }

    /// Overwrite a reserved 32-bit slot; the stream does not grow, so nothing is counted.
    pub(crate) fn patch32(&mut self, slot: Slot, v: u32) -> Result<()> {
        self.ensure_usable()?;
        let patched = self.sink.patch(slot, &v.to_be_bytes()).map_err(TableError::from);
        self.poison_on_err(patched)
    }

    // -------------------- session --------------------

    pub fn write_header(&mut self, header: &TableHeader) -> Result<usize> {
        self.ensure_usable()?;
        if self.header.is_some() {
            return Err(TableError::HeaderAlreadyWritten);
        }
        let written = header.write(self);
        let (n, section_slot) = self.poison_on_err(written)?;
        self.header = Some(HeaderState {
            section_slot,
            header_size: n as u64,
        });
        Ok(n)
    }

    /// Write one record, then backpatch the header's section size.
    pub fn write_record(&mut self, record: &TableRecord) -> Result<usize> {
        self.ensure_usable()?;
        let Some(h) = self.header else {
            return Err(TableError::HeaderNotWritten);
        };
        let written = record.write(self);
        let n = self.poison_on_err(written)?;

        let section = u32::try_from(self.total_written - h.header_size).map_err(|_| {
            TableError::TooLarge {
                what: "section size",
            }
        });
        let section = self.poison_on_err(section)?;
        self.patch32(h.section_slot, section)?;
        trace!(
            "[tables] section size -> {} at offset {}",
            section,
            h.section_slot.offset()
        );
        self.records += 1;
        Ok(n)
    }

    pub fn close(mut self) -> Result<(S, WriteSummary)> {
        self.sink.flush()?;
        let header_bytes = self.header.map(|h| h.header_size).unwrap_or(0);
        let summary = WriteSummary {
            header_bytes,
            section_bytes: self.total_written - header_bytes,
            records: self.records,
            total_bytes: self.total_written,
        };
        Ok((self.sink, summary))
    }
}

/// Write a complete tables file: header, then each record (narrowed first if `compress_tables`).
pub fn write_tables<S: TableSink>(
    sink: S,
    header: &TableHeader,
    records: &mut [TableRecord],
    compress_tables: bool,
) -> Result<(S, WriteSummary)> {
    let instant = Instant::now();
    let mut wr = TableWriter::new(sink);
    wr.write_header(header)?;
    for rec in records.iter_mut() {
        if compress_tables {
            compress(rec)?;
        }
        wr.write_record(rec)?;
    }
    let out = wr.close()?;
    debug!(
        "[tables] {} records, {} bytes in {} ms",
        out.1.records,
        out.1.total_bytes,
        instant.elapsed().as_millis()
    );
    Ok(out)
}
