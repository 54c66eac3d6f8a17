// src/config.rs
//! JSON manifest describing one tables file.
//!
//! ```json
//! { "version": "2.6.0", "name": "yy", "compress": true,
//!   "tables": [ { "id": "ec", "inner": 4, "values": [0, 1, 1, 2] } ] }
//! ```

use hashbrown::HashSet;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::tables::{
    Result, TableData, TableHeader, TableId, TableRecord, record::element_count,
};

fn default_compress() -> bool {
    true
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TableEntry {
    #[serde_as(as = "DisplayFromStr")]
    pub id: TableId,
    #[serde(default)]
    pub outer: u32,
    pub inner: u32,
    /// Reserved flag bits (e.g. STRUCT); width bits are derived from the data.
    #[serde(default)]
    pub flags: u16,
    pub values: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackManifest {
    pub version: String,
    pub name: String,
    #[serde(default = "default_compress")]
    pub compress: bool,
    pub tables: Vec<TableEntry>,
}

impl PackManifest {
    pub fn from_json_bytes(data: &[u8]) -> std::result::Result<Self, String> {
        serde_json::from_slice::<PackManifest>(data)
            .map_err(|e| format!("Failed to parse tables manifest JSON: {e}"))
    }

    pub fn load(path: &std::path::Path) -> std::result::Result<Self, String> {
        let data = std::fs::read(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        Self::from_json_bytes(&data)
    }

    /// Reject duplicate ids and shape mismatches before anything is written.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for t in &self.tables {
            if !seen.insert(t.id) {
                return Err(format!("table {} listed more than once", t.id));
            }
            let expected = element_count(t.id, t.outer, t.inner).map_err(|e| e.to_string())?;
            if t.values.len() != expected {
                return Err(format!(
                    "table {}: {} values, dimensions {}x{} need {}",
                    t.id,
                    t.values.len(),
                    t.outer,
                    t.inner,
                    expected
                ));
            }
        }
        Ok(())
    }

    pub fn into_parts(self) -> Result<(TableHeader, Vec<TableRecord>)> {
        let header = TableHeader::new(&self.version, &self.name)?;
        let records = self
            .tables
            .into_iter()
            .map(|t| {
                TableRecord::from_data(
                    t.id,
                    t.flags,
                    t.outer,
                    t.inner,
                    TableData::I32(t.values),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((header, records))
    }
}

