//! Read and write sync passes between the controller and the variable store.
//!
//! A read pass pulls every read-direction tag out of controller memory and
//! publishes it into the store under [`VarWriter::Controller`]; a write pass
//! pushes every write-direction tag from the store into controller memory.
//! Both passes batch contiguous tags of one data block into a single
//! transport call.
//!
//! Passes are driven from timers, so an invocation can arrive while the
//! previous one of the same kind is still talking to the controller. Such an
//! invocation does not queue: it returns [`PassOutcome::Skipped`] and the
//! caller tries again on the next timer tick.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use beltline_core::vars::{Value, VarWriter, VariableStore};

use crate::codec;
use crate::mapping::{TagMap, TagRecord, TagWidth};
use crate::transport::{BlockTransport, TransportError};

/// Result of invoking a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass ran to completion. `changed` counts the tags whose target
    /// actually changed (store entries for a read pass, encoded tags for a
    /// write pass).
    Completed { changed: usize },
    /// A pass of the same kind was already in flight; nothing was done.
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("controller unreachable: {0}")]
    ControllerUnreachable(#[from] TransportError),
}

/// A maximal contiguous region of one data block covered by mapped tags.
struct Run {
    db: u16,
    start: u32,
    len: usize,
    /// Indices into the record slice handed to [`runs`].
    members: Vec<usize>,
}

/// Bidirectional synchronizer over one controller connection.
pub struct PlcSync<T: BlockTransport> {
    transport: Mutex<T>,
    map: TagMap,
    vars: Arc<VariableStore>,
    read_busy: AtomicBool,
    write_busy: AtomicBool,
}

impl<T: BlockTransport> PlcSync<T> {
    pub fn new(transport: T, map: TagMap, vars: Arc<VariableStore>) -> Self {
        Self {
            transport: Mutex::new(transport),
            map,
            vars,
            read_busy: AtomicBool::new(false),
            write_busy: AtomicBool::new(false),
        }
    }

    /// The underlying transport. Held behind a mutex so tests and inspection
    /// dialogs can poke controller memory between passes.
    pub fn transport(&self) -> &Mutex<T> {
        &self.transport
    }

    /// Pull all read-direction tags from the controller into the store.
    pub fn read_pass(&self) -> Result<PassOutcome, SyncError> {
        if self.read_busy.swap(true, Ordering::AcqRel) {
            return Ok(PassOutcome::Skipped);
        }
        let result = self.run_read_pass();
        self.read_busy.store(false, Ordering::Release);
        result.map(|changed| PassOutcome::Completed { changed })
    }

    /// Push all write-direction tags from the store to the controller.
    pub fn write_pass(&self) -> Result<PassOutcome, SyncError> {
        if self.write_busy.swap(true, Ordering::AcqRel) {
            return Ok(PassOutcome::Skipped);
        }
        let result = self.run_write_pass();
        self.write_busy.store(false, Ordering::Release);
        result.map(|changed| PassOutcome::Completed { changed })
    }

    fn run_read_pass(&self) -> Result<usize, SyncError> {
        let records: Vec<&TagRecord> = self.map.reads().iter().collect();
        let mut changed = 0;
        for run in runs(&records) {
            let buf = {
                let mut transport = self
                    .transport
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                transport.read_block(run.db, run.start, run.len)?
            };
            if buf.len() < run.len {
                return Err(TransportError::Protocol(format!(
                    "short read from DB{}: wanted {} bytes, got {}",
                    run.db,
                    run.len,
                    buf.len()
                ))
                .into());
            }
            for &i in &run.members {
                let record = records[i];
                let at = (record.offset - run.start) as usize;
                match decode(&buf, at, record) {
                    Ok(value) => {
                        if self.vars.set_from(VarWriter::Controller, &record.var, value) {
                            changed += 1;
                        }
                    }
                    Err(e) => {
                        log::warn!("failed to decode tag '{}': {e}", record.var);
                    }
                }
            }
        }
        Ok(changed)
    }

    fn run_write_pass(&self) -> Result<usize, SyncError> {
        // Resolve every tag before batching. A tag that cannot be encoded
        // must not join a run: the run buffer is zero-filled, so including
        // it would overwrite its live controller bytes with zeros.
        let mut resolved: Vec<(&TagRecord, Value)> = Vec::new();
        for record in self.map.writes() {
            let Some(value) = self.vars.get(&record.var) else {
                log::debug!("tag '{}' has no store entry yet, skipping", record.var);
                continue;
            };
            let mut scratch = vec![0u8; record.width.byte_len()];
            if let Err(e) = encode(&mut scratch, 0, record, &value) {
                log::warn!("failed to encode tag '{}': {e}", record.var);
                continue;
            }
            resolved.push((record, value));
        }

        let records: Vec<&TagRecord> = resolved.iter().map(|(r, _)| *r).collect();
        let mut written = 0;
        for run in runs(&records) {
            // Unmapped gap bits inside a run are written as zero.
            let mut buf = vec![0u8; run.len];
            for &i in &run.members {
                let (record, value) = &resolved[i];
                let at = (record.offset - run.start) as usize;
                if let Err(e) = encode(&mut buf, at, record, value) {
                    log::warn!("failed to encode tag '{}': {e}", record.var);
                    continue;
                }
                written += 1;
            }
            let mut transport = self
                .transport
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            transport.write_block(run.db, run.start, &buf)?;
        }
        Ok(written)
    }
}

/// Group records into per-block runs of contiguous (or overlapping, for bits
/// sharing a byte) regions. Run members are indices into `records`.
fn runs(records: &[&TagRecord]) -> Vec<Run> {
    let mut by_db: BTreeMap<u16, Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        by_db.entry(record.db).or_default().push(i);
    }

    let mut out = Vec::new();
    for (db, mut group) in by_db {
        group.sort_by_key(|&i| records[i].offset);
        let mut current: Option<Run> = None;
        for i in group {
            let record = records[i];
            let end = record.offset as usize + record.width.byte_len();
            match current.as_mut() {
                Some(run) if (record.offset as usize) <= run.start as usize + run.len => {
                    run.len = run.len.max(end - run.start as usize);
                    run.members.push(i);
                }
                _ => {
                    if let Some(done) = current.take() {
                        out.push(done);
                    }
                    current = Some(Run {
                        db,
                        start: record.offset,
                        len: record.width.byte_len(),
                        members: vec![i],
                    });
                }
            }
        }
        if let Some(done) = current.take() {
            out.push(done);
        }
    }
    out
}

fn decode(buf: &[u8], at: usize, record: &TagRecord) -> Result<Value, codec::CodecError> {
    Ok(match record.width {
        TagWidth::Bool => Value::Bool(codec::get_bool(buf, at, record.bit)?),
        TagWidth::Byte => Value::Int(codec::get_byte(buf, at)? as i64),
        TagWidth::Word => Value::Int(codec::get_int(buf, at)? as i64),
        TagWidth::DWord => Value::Int(codec::get_dint(buf, at)? as i64),
        TagWidth::Real => Value::Float(codec::get_real(buf, at)? as f64),
    })
}

/// Encode a store value at `buf[at]` per the record's width. Coercion is
/// lenient in the directions that lose nothing (bool as 0/1, int as float);
/// anything else is rejected.
fn encode(
    buf: &mut [u8],
    at: usize,
    record: &TagRecord,
    value: &Value,
) -> Result<(), EncodeError> {
    match record.width {
        TagWidth::Bool => {
            let v = match value {
                Value::Bool(b) => *b,
                Value::Int(i) => *i != 0,
                other => return Err(EncodeError::TypeMismatch(other.clone())),
            };
            codec::set_bool(buf, at, record.bit, v)?;
        }
        TagWidth::Byte => {
            let v = as_integer(value)?;
            let v = u8::try_from(v).map_err(|_| EncodeError::OutOfRange(v))?;
            codec::set_byte(buf, at, v)?;
        }
        TagWidth::Word => {
            let v = as_integer(value)?;
            let v = i16::try_from(v).map_err(|_| EncodeError::OutOfRange(v))?;
            codec::set_int(buf, at, v)?;
        }
        TagWidth::DWord => {
            let v = as_integer(value)?;
            let v = i32::try_from(v).map_err(|_| EncodeError::OutOfRange(v))?;
            codec::set_dint(buf, at, v)?;
        }
        TagWidth::Real => {
            let v = match value {
                Value::Float(f) => *f as f32,
                Value::Int(i) => *i as f32,
                other => return Err(EncodeError::TypeMismatch(other.clone())),
            };
            codec::set_real(buf, at, v)?;
        }
    }
    Ok(())
}

fn as_integer(value: &Value) -> Result<i64, EncodeError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(*b as i64),
        other => Err(EncodeError::TypeMismatch(other.clone())),
    }
}

#[derive(Debug, thiserror::Error)]
enum EncodeError {
    #[error("store value {0:?} does not fit this tag's type")]
    TypeMismatch(Value),
    #[error("integer {0} out of range for this tag's width")]
    OutOfRange(i64),
    #[error(transparent)]
    Codec(#[from] codec::CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::TagDirection;

    fn rec(db: u16, offset: u32, width: TagWidth, var: &str) -> TagRecord {
        TagRecord {
            db,
            offset,
            bit: 0,
            width,
            var: var.to_string(),
            direction: TagDirection::Read,
        }
    }

    #[test]
    fn contiguous_records_form_one_run() {
        let records = vec![
            rec(1, 0, TagWidth::Word, "a"),
            rec(1, 2, TagWidth::Word, "b"),
            rec(1, 4, TagWidth::Real, "c"),
        ];
        let refs: Vec<&TagRecord> = records.iter().collect();
        let runs = runs(&refs);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start, 0);
        assert_eq!(runs[0].len, 8);
        assert_eq!(runs[0].members.len(), 3);
    }

    #[test]
    fn gaps_and_other_blocks_split_runs() {
        let records = vec![
            rec(1, 0, TagWidth::Word, "a"),
            rec(1, 10, TagWidth::Word, "b"),
            rec(2, 0, TagWidth::Byte, "c"),
        ];
        let refs: Vec<&TagRecord> = records.iter().collect();
        let runs = runs(&refs);
        assert_eq!(runs.len(), 3);
    }

    #[test]
    fn bits_sharing_a_byte_share_a_run() {
        let mut r1 = rec(1, 4, TagWidth::Bool, "a");
        r1.bit = 0;
        let mut r2 = rec(1, 4, TagWidth::Bool, "b");
        r2.bit = 3;
        let records = [r1, r2];
        let refs: Vec<&TagRecord> = records.iter().collect();
        let runs = runs(&refs);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len, 1);
        assert_eq!(runs[0].members.len(), 2);
    }

    #[test]
    fn encode_coerces_and_rejects() {
        let rec_word = rec(1, 0, TagWidth::Word, "w");
        let mut buf = [0u8; 2];
        encode(&mut buf, 0, &rec_word, &Value::Bool(true)).unwrap();
        assert_eq!(buf, [0x00, 0x01]);
        assert!(matches!(
            encode(&mut buf, 0, &rec_word, &Value::Int(1 << 20)),
            Err(EncodeError::OutOfRange(_))
        ));
        assert!(matches!(
            encode(&mut buf, 0, &rec_word, &Value::Str("x".into())),
            Err(EncodeError::TypeMismatch(_))
        ));

        let rec_real = rec(1, 0, TagWidth::Real, "r");
        let mut buf = [0u8; 4];
        encode(&mut buf, 0, &rec_real, &Value::Int(2)).unwrap();
        assert_eq!(buf, 2.0f32.to_be_bytes());
    }
}
