// src/tables/ids.rs
// Wire tags for table roles and record flag bits.

use std::{fmt, str::FromStr};

use super::error::{Result, TableError};

/// Role of a table inside a tables file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TableId {
    Accept = 0x01,
    Base = 0x02,
    Chk = 0x03,
    Def = 0x04,
    Ec = 0x05,
    Meta = 0x06,
    NulTrans = 0x07,
    Nxt = 0x08,
    RuleCanMatchEol = 0x09,
    StartStateList = 0x0A,
    // two interleaved integers per cell (verify, next)
    Transition = 0x0B,
    AccList = 0x0C,
}

const ALL_IDS: &[TableId] = &[
    TableId::Accept,
    TableId::Base,
    TableId::Chk,
    TableId::Def,
    TableId::Ec,
    TableId::Meta,
    TableId::NulTrans,
    TableId::Nxt,
    TableId::RuleCanMatchEol,
    TableId::StartStateList,
    TableId::Transition,
    TableId::AccList,
];

impl TableId {
    #[inline]
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Paired-structure tables store two integers per logical cell.
    #[inline]
    pub fn is_paired(self) -> bool {
        self == TableId::Transition
    }

    #[inline]
    pub fn ints_per_cell(self) -> usize {
        if self.is_paired() { 2 } else { 1 }
    }

    pub fn name(self) -> &'static str {
        use TableId::*;
        match self {
            Accept => "accept",
            Base => "base",
            Chk => "chk",
            Def => "def",
            Ec => "ec",
            Meta => "meta",
            NulTrans => "nul_trans",
            Nxt => "nxt",
            RuleCanMatchEol => "rule_can_match_eol",
            StartStateList => "start_state_list",
            Transition => "transition",
            AccList => "acclist",
        }
    }
}

impl TryFrom<u16> for TableId {
    type Error = TableError;
    fn try_from(v: u16) -> Result<Self> {
        ALL_IDS
            .iter()
            .copied()
            .find(|id| id.tag() == v)
            .ok_or(TableError::UnknownTableId(v))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableId {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        ALL_IDS
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown table id {s:?}"))
    }
}

// -------------------- record flags --------------------

pub const DATA8: u16 = 0x01;
pub const DATA16: u16 = 0x02;
pub const DATA32: u16 = 0x04;
pub const PTRANS: u16 = 0x08;
pub const STRUCT: u16 = 0x10;

const WIDTH_MASK: u16 = DATA8 | DATA16 | DATA32;

/// Strip the width bits, keeping only the reserved ones.
#[inline]
pub fn clear_width(flags: u16) -> u16 {
    flags & !WIDTH_MASK
}

/// Fixed byte size of every element in one table record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementWidth {
    One,
    Two,
    Four,
}

impl ElementWidth {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            ElementWidth::One => 1,
            ElementWidth::Two => 2,
            ElementWidth::Four => 4,
        }
    }

    #[inline]
    pub fn flag(self) -> u16 {
        match self {
            ElementWidth::One => DATA8,
            ElementWidth::Two => DATA16,
            ElementWidth::Four => DATA32,
        }
    }

    /// Exactly one width bit must be set.
    pub fn from_flags(flags: u16) -> Result<Self> {
        match flags & WIDTH_MASK {
            DATA8 => Ok(ElementWidth::One),
            DATA16 => Ok(ElementWidth::Two),
            DATA32 => Ok(ElementWidth::Four),
            _ => Err(TableError::UnknownWidth(flags)),
        }
    }

    /// Narrowest width whose signed range covers `max_abs`.
    pub fn for_magnitude(max_abs: u32) -> Self {
        if max_abs <= i8::MAX as u32 {
            ElementWidth::One
        } else if max_abs <= i16::MAX as u32 {
            ElementWidth::Two
        } else {
            ElementWidth::Four
        }
    }
}

impl fmt::Display for ElementWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bytes())
    }
}
