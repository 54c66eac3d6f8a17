// src/tables/header.rs

use log::debug;

use super::{
    error::{Result, TableError},
    sink::{Slot, TableSink},
    writer::{TableWriter, pad64},
};

pub const MAGIC: u32 = 0xF13C57B1;

/// magic(4) + header size(4) + section size(4) + flags(2).
pub const HEADER_FIXED_BYTES: u32 = 14;

/// Global metadata block at the start of a tables file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    magic: u32,
    header_size: u32,
    section_size: u32,
    flags: u16,
    version: String,
    name: String,
}

impl TableHeader {
    pub fn new(version: &str, name: &str) -> Result<Self> {
        for s in [version, name] {
            if s.contains('\0') {
                return Err(TableError::InvalidString(s.to_string()));
            }
        }
        let raw = HEADER_FIXED_BYTES as u64 + version.len() as u64 + 1 + name.len() as u64 + 1;
        let header_size = u32::try_from(raw + pad64(raw)).map_err(|_| TableError::TooLarge {
            what: "header size",
        })?;
        Ok(Self {
            magic: MAGIC,
            header_size,
            section_size: 0, // not known until records are written
            flags: 0,
            version: version.to_string(),
            name: name.to_string(),
        })
    }

    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn header_size(&self) -> u32 {
        self.header_size
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialize the header. Returns bytes written and the section-size slot.
    pub(crate) fn write<S: TableSink>(&self, wr: &mut TableWriter<S>) -> Result<(usize, Slot)> {
        let mut bwritten = 0usize;
        bwritten += wr.write32(self.magic)?;
        bwritten += wr.write32(self.header_size)?;

        let (slot, n) = wr.reserve32(self.section_size)?;
        bwritten += n;
        bwritten += wr.write16(self.flags)?;

        for s in [&self.version, &self.name] {
            bwritten += wr.write_bytes(s.as_bytes())?;
            bwritten += wr.write8(0)?;
        }

        bwritten += wr.pad64()?;

        // Sanity check
        if bwritten as u64 != self.header_size as u64 {
            return Err(TableError::HeaderSizeMismatch {
                written: bwritten as u64,
                expected: self.header_size,
            });
        }
        debug!(
            "[tables] header {:?} v{} ({} bytes)",
            self.name, self.version, bwritten
        );
        Ok((bwritten, slot))
    }
}
