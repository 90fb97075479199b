use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::StatusRecord;
use crate::account::Account;
use crate::error::{FleetError, Result};

/// One row: its own lock plus a flag marking whether a writer is out.
#[derive(Debug)]
struct Slot {
    record: RwLock<StatusRecord>,
    writer_taken: AtomicBool,
}

/// Shared table of per-account status rows.
///
/// Rows are guarded independently, so workers updating different accounts
/// never contend, and a snapshot only ever holds one row's read lock at a
/// time.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    slots: Arc<[Slot]>,
}

impl StatusBoard {
    pub fn new(accounts: &[Account]) -> Self {
        let mut sorted: Vec<&Account> = accounts.iter().collect();
        sorted.sort_by_key(|a| a.index);

        let slots: Vec<Slot> = sorted
            .into_iter()
            .map(|account| Slot {
                record: RwLock::new(StatusRecord::new(
                    account.index,
                    account.masked_proxy(),
                )),
                writer_taken: AtomicBool::new(false),
            })
            .collect();

        Self {
            slots: slots.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn position(&self, index: usize) -> Option<usize> {
        // Indices are normally 1..=N in order; fall back to a scan otherwise.
        let guess = index.checked_sub(1)?;
        if let Some(slot) = self.slots.get(guess)
            && slot.record.read().index == index
        {
            return Some(guess);
        }
        self.slots
            .iter()
            .position(|slot| slot.record.read().index == index)
    }

    /// Hand out the only writer for `index`'s row.
    pub fn writer(&self, index: usize) -> Result<RecordWriter> {
        let position = self
            .position(index)
            .ok_or(FleetError::AccountNotFound(index))?;

        let taken = self.slots[position].writer_taken.swap(true, Ordering::AcqRel);
        if taken {
            return Err(FleetError::WriterTaken(index));
        }

        Ok(RecordWriter {
            slots: Arc::clone(&self.slots),
            position,
        })
    }

    pub fn get(&self, index: usize) -> Option<StatusRecord> {
        self.position(index)
            .map(|p| self.slots[p].record.read().clone())
    }

    /// Copy every row, each under its own read guard.
    pub fn snapshot(&self) -> BoardSnapshot {
        let records = self
            .slots
            .iter()
            .map(|slot| slot.record.read().clone())
            .collect();

        BoardSnapshot {
            taken_at: Utc::now(),
            records,
        }
    }
}

/// Exclusive write access to one row. Dropping it frees the row for a new
/// writer.
#[derive(Debug)]
pub struct RecordWriter {
    slots: Arc<[Slot]>,
    position: usize,
}

impl RecordWriter {
    /// Apply `f` in one critical section; readers see all of it or none.
    pub fn update<R>(&self, f: impl FnOnce(&mut StatusRecord) -> R) -> R {
        let mut record = self.slots[self.position].record.write();
        f(&mut record)
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        self.slots[self.position]
            .writer_taken
            .store(false, Ordering::Release);
    }
}

/// Point-in-time copy of the whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub taken_at: DateTime<Utc>,
    pub records: Vec<StatusRecord>,
}

impl BoardSnapshot {
    pub fn summary(&self) -> FleetSummary {
        FleetSummary {
            taken_at: self.taken_at,
            accounts: self.records.len(),
            total_claims: self.records.iter().map(|r| r.missions_claimed).sum(),
            successful_pings: self
                .records
                .iter()
                .filter(|r| r.ping_ok == Some(true))
                .count(),
            needs_attention: self.records.iter().filter(|r| r.needs_attention).count(),
            failing: self
                .records
                .iter()
                .filter(|r| r.consecutive_failures > 0)
                .count(),
            total_balance: self.records.iter().map(|r| r.balance).sum(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&StatusRecord> {
        self.records.iter().find(|r| r.index == index)
    }
}

/// Fleet-wide totals derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub taken_at: DateTime<Utc>,
    pub accounts: usize,
    pub total_claims: u64,
    pub successful_pings: usize,
    pub needs_attention: usize,
    pub failing: usize,
    pub total_balance: f64,
}
