// Change recorder: append-only audit log of operator rewrites

use serde::{Deserialize, Serialize};

use crate::ast::{CmpOp, Pos};

/// One operator inversion: where it happened and what changed.
/// For a chained comparison only the first operator slot is logged,
/// even though every slot is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub pos: Pos,
    pub original: CmpOp,
    pub replacement: CmpOp,
}

/// Ordered, append-only log of rewrites, in pre-order discovery order.
/// No deduplication, no reordering.
#[derive(Debug, Default)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pos: Pos, original: CmpOp, replacement: CmpOp) {
        self.records.push(ChangeRecord {
            pos,
            original,
            replacement,
        });
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn into_changes(self) -> Vec<ChangeRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
