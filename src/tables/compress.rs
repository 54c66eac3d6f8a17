// src/tables/compress.rs
// Narrow a table to the smallest of (i32, i16, i8) that holds its values.
// This only saves space on disk; it is unrelated to DFA table compression.

use log::info;

use super::{
    error::{Result, TableError},
    ids::ElementWidth,
    record::TableRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressOutcome {
    Unchanged(ElementWidth),
    Narrowed {
        from: ElementWidth,
        to: ElementWidth,
    },
}

/// Largest absolute value in the table (0 when empty).
pub fn max_abs(rec: &TableRecord) -> u32 {
    rec.data().iter().map(i32::unsigned_abs).max().unwrap_or(0)
}

/// Smallest width whose signed range covers every value.
pub fn min_width(rec: &TableRecord) -> ElementWidth {
    ElementWidth::for_magnitude(max_abs(rec))
}

pub fn compress(rec: &mut TableRecord) -> Result<CompressOutcome> {
    let current = rec.width();
    let needed = min_width(rec);

    if needed == current {
        return Ok(CompressOutcome::Unchanged(current));
    }
    if needed > current {
        return Err(TableError::WidthIncrease {
            id: rec.id(),
            needed,
            declared: current,
        });
    }

    let narrowed = rec.data().reencode(needed)?;
    drop(rec.replace_data(narrowed)?);
    info!(
        "[tables] {} narrowed {}B -> {}B ({} ints)",
        rec.id(),
        current,
        needed,
        rec.element_count()
    );
    Ok(CompressOutcome::Narrowed {
        from: current,
        to: needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ids::TableId, record::TableData};

    #[test]
    fn int_min_needs_four_bytes() {
        let mut t = TableRecord::from_values(TableId::Base, 0, 2, vec![i32::MIN, 0]).unwrap();
        assert_eq!(max_abs(&t), 1u32 << 31);
        assert_eq!(compress(&mut t).unwrap(), CompressOutcome::Unchanged(ElementWidth::Four));
    }

    #[test]
    fn undersized_record_is_an_error() {
        // -128 fits an i8 but its magnitude does not, so the record is undersized.
        let mut t =
            TableRecord::from_data(TableId::Ec, 0, 0, 2, TableData::I8(vec![-128, 5])).unwrap();
        let err = compress(&mut t).unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(
            err,
            TableError::WidthIncrease {
                needed: ElementWidth::Two,
                declared: ElementWidth::One,
                ..
            }
        ));
        assert_eq!(t.width(), ElementWidth::One);
    }
}
