// src/tables/record.rs
//! One typed, width-tagged table plus its dimensions.
//!
//! The element width lives in the [`TableData`] variant, so a record can never
//! claim one width while holding a buffer of another.

use log::debug;

use super::{
    error::{Result, TableError},
    ids::{ElementWidth, TableId, clear_width},
    sink::TableSink,
    writer::TableWriter,
};

/// Fixed part of a record: id(2) + flags(2) + outer(4) + inner(4).
pub const RECORD_FIXED_BYTES: usize = 12;

/// Entries encoded per `write_bytes` call.
const CHUNK: usize = 1 << 16;

/// Flattened table integers stored at one of the three wire widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
}

impl TableData {
    pub fn zeroed(width: ElementWidth, len: usize) -> Self {
        match width {
            ElementWidth::One => TableData::I8(vec![0; len]),
            ElementWidth::Two => TableData::I16(vec![0; len]),
            ElementWidth::Four => TableData::I32(vec![0; len]),
        }
    }

    pub fn width(&self) -> ElementWidth {
        match self {
            TableData::I8(_) => ElementWidth::One,
            TableData::I16(_) => ElementWidth::Two,
            TableData::I32(_) => ElementWidth::Four,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableData::I8(v) => v.len(),
            TableData::I16(v) => v.len(),
            TableData::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `i`, sign-extended.
    pub fn get(&self, i: usize) -> Option<i32> {
        match self {
            TableData::I8(v) => v.get(i).map(|&x| x as i32),
            TableData::I16(v) => v.get(i).map(|&x| x as i32),
            TableData::I32(v) => v.get(i).copied(),
        }
    }

    /// Store `value` at `i`; it must be representable at this width.
    pub fn set(&mut self, i: usize, value: i32) -> Result<()> {
        let len = self.len();
        let width = self.width();
        let out_of_range = || TableError::ValueOutOfRange {
            value: value as i64,
            width,
        };
        let oob = TableError::IndexOutOfBounds { index: i, len };
        match self {
            TableData::I8(v) => {
                *v.get_mut(i).ok_or(oob)? = i8::try_from(value).map_err(|_| out_of_range())?
            }
            TableData::I16(v) => {
                *v.get_mut(i).ok_or(oob)? = i16::try_from(value).map_err(|_| out_of_range())?
            }
            TableData::I32(v) => *v.get_mut(i).ok_or(oob)? = value,
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Re-encode every element at `width`, preserving values.
    pub fn reencode(&self, width: ElementWidth) -> Result<TableData> {
        let mut out = TableData::zeroed(width, self.len());
        for (i, v) in self.iter().enumerate() {
            out.set(i, v)?;
        }
        Ok(out)
    }

    /// Append the big-endian encoding of `range` to `buf`.
    fn encode_be(&self, range: std::ops::Range<usize>, buf: &mut Vec<u8>) {
        match self {
            TableData::I8(v) => buf.extend(v[range].iter().map(|&x| x as u8)),
            TableData::I16(v) => {
                for &x in &v[range] {
                    buf.extend_from_slice(&x.to_be_bytes());
                }
            }
            TableData::I32(v) => {
                for &x in &v[range] {
                    buf.extend_from_slice(&x.to_be_bytes());
                }
            }
        }
    }
}

/// Which of the two interleaved integers of a paired cell to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First = 0,
    Second = 1,
}

/// Number of integers a table with these dimensions holds.
pub fn element_count(id: TableId, outer: u32, inner: u32) -> Result<usize> {
    (inner as usize)
        .checked_mul(outer.max(1) as usize)
        .and_then(|n| n.checked_mul(id.ints_per_cell()))
        .ok_or(TableError::TooLarge {
            what: "table element count",
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    id: TableId,
    reserved_flags: u16,
    outer: u32,
    inner: u32,
    data: TableData,
}

impl TableRecord {
    /// Zero-filled record at the widest element width.
    pub fn new(id: TableId, outer: u32, inner: u32) -> Result<Self> {
        let n = element_count(id, outer, inner)?;
        Ok(Self {
            id,
            reserved_flags: 0,
            outer,
            inner,
            data: TableData::zeroed(ElementWidth::Four, n),
        })
    }

    pub fn from_values(id: TableId, outer: u32, inner: u32, values: Vec<i32>) -> Result<Self> {
        Self::from_data(id, 0, outer, inner, TableData::I32(values))
    }

    /// `flags` may carry reserved bits; any width bits in it are ignored in favor of `data`.
    pub fn from_data(
        id: TableId,
        flags: u16,
        outer: u32,
        inner: u32,
        data: TableData,
    ) -> Result<Self> {
        let expected = element_count(id, outer, inner)?;
        if data.len() != expected {
            return Err(TableError::LengthMismatch {
                id,
                got: data.len(),
                expected,
            });
        }
        Ok(Self {
            id,
            reserved_flags: clear_width(flags),
            outer,
            inner,
            data,
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn outer(&self) -> u32 {
        self.outer
    }

    pub fn inner(&self) -> u32 {
        self.inner
    }

    pub fn width(&self) -> ElementWidth {
        self.data.width()
    }

    /// Flags as they go on the wire: reserved bits plus the width bit.
    pub fn flags(&self) -> u16 {
        self.reserved_flags | self.width().flag()
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Bytes of the record before padding.
    pub fn encoded_len(&self) -> usize {
        RECORD_FIXED_BYTES + self.element_count() * self.width().bytes()
    }

    /// Bytes of the record including padding to 8, assuming an aligned start.
    pub fn padded_len(&self) -> usize {
        let n = self.encoded_len();
        n + super::writer::pad64(n as u64) as usize
    }

    pub fn get(&self, i: usize) -> Result<i32> {
        self.data.get(i).ok_or_else(|| self.oob(i))
    }

    pub fn set(&mut self, i: usize, value: i32) -> Result<()> {
        self.data.set(i, value)
    }

    /// Structured access using the legacy address `(i*inner + j) * (k%2 + 1) + k%2`.
    ///
    /// Kept bit-for-bit for existing consumers. For paired tables prefer [`Self::pair`],
    /// which follows the interleaved storage layout.
    pub fn get_ijk(&self, i: usize, j: usize, k: usize) -> Result<i32> {
        let k = k % 2;
        let index = i
            .checked_mul(self.inner as usize)
            .and_then(|n| n.checked_add(j))
            .and_then(|cell| cell.checked_mul(k + 1))
            .and_then(|n| n.checked_add(k))
            .ok_or_else(|| self.oob(usize::MAX))?;
        self.get(index)
    }

    /// Cell `[i][j]`; for the paired-structure table this is its first half.
    pub fn cell(&self, i: usize, j: usize) -> Result<i32> {
        let cell = self.cell_index(i, j)?;
        if self.id.is_paired() {
            return self.get(cell * 2);
        }
        self.get(cell)
    }

    /// One half of cell `[i][j]` of the paired-structure table.
    pub fn pair(&self, i: usize, j: usize, half: Half) -> Result<i32> {
        if !self.id.is_paired() {
            return Err(TableError::NotPaired(self.id));
        }
        let cell = self.cell_index(i, j)?;
        self.get(cell * 2 + half as usize)
    }

    /// Row-major cell number; `i` and `j` must lie inside the dimensions.
    fn cell_index(&self, i: usize, j: usize) -> Result<usize> {
        let rows = self.outer.max(1) as usize;
        let cols = self.inner as usize;
        if i >= rows {
            return Err(TableError::IndexOutOfBounds {
                index: i,
                len: rows,
            });
        }
        if j >= cols {
            return Err(TableError::IndexOutOfBounds {
                index: j,
                len: cols,
            });
        }
        // i < rows and j < cols, so this stays below element_count().
        Ok(i * cols + j)
    }

    fn oob(&self, index: usize) -> TableError {
        TableError::IndexOutOfBounds {
            index,
            len: self.data.len(),
        }
    }

    /// Swap in a re-encoded buffer of the same length; returns the previous one.
    pub(crate) fn replace_data(&mut self, data: TableData) -> Result<TableData> {
        if data.len() != self.data.len() {
            return Err(TableError::LengthMismatch {
                id: self.id,
                got: data.len(),
                expected: self.data.len(),
            });
        }
        Ok(std::mem::replace(&mut self.data, data))
    }

    /// Serialize this record (without the header backpatch). Returns bytes written incl. padding.
    pub(crate) fn write<S: TableSink>(&self, wr: &mut TableWriter<S>) -> Result<usize> {
        let mut bwritten = 0usize;
        bwritten += wr.write16(self.id.tag())?;
        bwritten += wr.write16(self.flags())?;
        bwritten += wr.write32(self.outer)?;
        bwritten += wr.write32(self.inner)?;

        let total = self.element_count();
        let width = self.width().bytes();
        let mut bytes = Vec::with_capacity(total.min(CHUNK) * width);
        let mut start = 0;
        while start < total {
            let end = (start + CHUNK).min(total);
            bytes.clear();
            self.data.encode_be(start..end, &mut bytes);
            bwritten += wr.write_bytes(&bytes)?;
            start = end;
        }

        // Sanity check
        if bwritten != self.encoded_len() {
            return Err(TableError::RecordSizeMismatch {
                id: self.id,
                written: bwritten as u64,
                expected: self.encoded_len() as u64,
            });
        }

        bwritten += wr.pad64()?;
        debug!(
            "[tables] wrote {} ({} x {}B, {} bytes)",
            self.id, total, width, bwritten
        );
        Ok(bwritten)
    }
}
