//! Tag-mapping configuration: which controller addresses bind to which
//! variable store entries, and in which direction.
//!
//! The mapping is an ordered list of records loaded from the project file at
//! startup and on project reload. A malformed record never aborts the load:
//! it is skipped and reported, and the rest of the mapping takes effect.

use serde::{Deserialize, Serialize};

/// Value width/type of a mapped tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagWidth {
    /// One bit within a byte.
    Bool,
    /// Unsigned 8-bit.
    Byte,
    /// S7 INT: signed 16-bit.
    Word,
    /// S7 DINT: signed 32-bit.
    DWord,
    /// S7 REAL: IEEE-754 float32.
    Real,
}

impl TagWidth {
    /// Bytes this tag occupies in the data block.
    pub fn byte_len(self) -> usize {
        match self {
            TagWidth::Bool | TagWidth::Byte => 1,
            TagWidth::Word => 2,
            TagWidth::DWord | TagWidth::Real => 4,
        }
    }
}

/// Whether a tag flows controller -> store or store -> controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagDirection {
    /// Read pass: controller memory into the variable store.
    Read,
    /// Write pass: variable store into controller memory.
    Write,
}

/// One tag-mapping record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    /// Data block number.
    pub db: u16,
    /// Byte offset within the data block.
    pub offset: u32,
    /// Bit offset within the byte; only meaningful for [`TagWidth::Bool`].
    #[serde(default)]
    pub bit: u8,
    pub width: TagWidth,
    /// Variable store entry this tag binds to.
    pub var: String,
    pub direction: TagDirection,
}

/// Configuration errors. The offending record is skipped; the rest of the
/// mapping loads.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tag record {index} is malformed: {detail}")]
    Malformed { index: usize, detail: String },
    #[error("tag record {index} ('{var}') is invalid: {detail}")]
    Invalid {
        index: usize,
        var: String,
        detail: String,
    },
}

/// The validated tag mapping, split by direction with record order preserved.
#[derive(Debug, Default)]
pub struct TagMap {
    reads: Vec<TagRecord>,
    writes: Vec<TagRecord>,
}

impl TagMap {
    /// Validate a list of records. Invalid records are skipped and reported;
    /// valid ones load in order.
    pub fn load(records: Vec<TagRecord>) -> (Self, Vec<ConfigError>) {
        let mut map = TagMap::default();
        let mut issues = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            if let Err(detail) = validate(&record) {
                log::warn!("skipping tag record {index} ('{}'): {detail}", record.var);
                issues.push(ConfigError::Invalid {
                    index,
                    var: record.var,
                    detail,
                });
                continue;
            }
            match record.direction {
                TagDirection::Read => map.reads.push(record),
                TagDirection::Write => map.writes.push(record),
            }
        }
        (map, issues)
    }

    /// Parse a JSON array of records. A record that fails to deserialize is
    /// skipped and reported; the array itself must be well-formed JSON.
    pub fn from_json_str(text: &str) -> Result<(Self, Vec<ConfigError>), serde_json::Error> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(text)?;
        let mut records = Vec::new();
        let mut issues = Vec::new();

        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<TagRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    log::warn!("skipping malformed tag record {index}: {e}");
                    issues.push(ConfigError::Malformed {
                        index,
                        detail: e.to_string(),
                    });
                }
            }
        }

        let (map, mut invalid) = Self::load(records);
        issues.append(&mut invalid);
        Ok((map, issues))
    }

    /// Read-direction records, in configuration order.
    pub fn reads(&self) -> &[TagRecord] {
        &self.reads
    }

    /// Write-direction records, in configuration order.
    pub fn writes(&self) -> &[TagRecord] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }
}

fn validate(record: &TagRecord) -> Result<(), String> {
    if record.var.trim().is_empty() {
        return Err("variable name is empty".to_string());
    }
    if record.bit > 7 {
        return Err(format!("bit offset {} out of range (0..=7)", record.bit));
    }
    if record.bit != 0 && record.width != TagWidth::Bool {
        return Err(format!(
            "bit offset {} given for non-bit width {:?}",
            record.bit, record.width
        ));
    }
    Ok(())
}
