// src/tables/error.rs

use super::ids::{ElementWidth, TableId};

pub type Result<T> = std::result::Result<T, TableError>;

/// Failures raised while building or serializing tables.
///
/// `Io` is an environmental fault; everything flagged by [`TableError::is_internal`]
/// is a logic defect in the caller or in this crate and must not be retried.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("tables sink write failed: {0}")]
    Io(#[from] std::io::Error),

    // ---- internal consistency ----
    #[error("header wrote {written} bytes, expected {expected}")]
    HeaderSizeMismatch { written: u64, expected: u32 },
    #[error("table {id} wrote {written} bytes before padding, expected {expected}")]
    RecordSizeMismatch {
        id: TableId,
        written: u64,
        expected: u64,
    },
    #[error("table {id} needs {needed} bytes per element but is declared at {declared}")]
    WidthIncrease {
        id: TableId,
        needed: ElementWidth,
        declared: ElementWidth,
    },
    #[error("flags {0:#06x} do not select exactly one element width")]
    UnknownWidth(u16),
    #[error("table record written before the header")]
    HeaderNotWritten,
    #[error("header already written for this session")]
    HeaderAlreadyWritten,
    #[error("session already failed; its output is incomplete")]
    SessionFailed,

    // ---- caller input ----
    #[error("table {id} holds {got} integers, dimensions require {expected}")]
    LengthMismatch {
        id: TableId,
        got: usize,
        expected: usize,
    },
    #[error("value {value} does not fit a {width}-byte element")]
    ValueOutOfRange { value: i64, width: ElementWidth },
    #[error("index {index} out of bounds for {len} integers")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("table {0} is not a paired-structure table")]
    NotPaired(TableId),
    #[error("unknown table id {0:#06x}")]
    UnknownTableId(u16),
    #[error("{what} exceeds the 32-bit wire field")]
    TooLarge { what: &'static str },
    #[error("{0:?} contains an interior NUL and cannot be terminated")]
    InvalidString(String),
}

impl TableError {
    /// True for byte-count and protocol violations (logic defects, never retryable).
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            TableError::HeaderSizeMismatch { .. }
                | TableError::RecordSizeMismatch { .. }
                | TableError::WidthIncrease { .. }
                | TableError::UnknownWidth(_)
                | TableError::HeaderNotWritten
                | TableError::HeaderAlreadyWritten
                | TableError::SessionFailed
        )
    }
}
