use parking_lot::RwLock;
use std::collections::HashMap;

use docqa_core::traits::VectorIndexer;
use docqa_core::types::{IndexEntry, IndexSpec, PassageId, ScoredMatch};
use docqa_core::{Error, Result};

use crate::similarity::score;

/// Exact brute-force index.
///
/// Every search scores all entries. Entries keep the slot they were first
/// inserted into; an upsert of a known passage id overwrites that slot, so
/// tie order survives re-ingestion.
pub struct FlatIndex {
    spec: IndexSpec,
    slots: RwLock<Slots>,
}

#[derive(Default)]
struct Slots {
    entries: Vec<IndexEntry>,
    by_id: HashMap<PassageId, usize>,
}

impl FlatIndex {
    pub fn new(spec: IndexSpec) -> Self {
        Self { spec, slots: RwLock::new(Slots::default()) }
    }

    /// Snapshot of all entries in slot order.
    pub fn entries(&self) -> Vec<IndexEntry> {
        self.slots.read().entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<IndexEntry> {
        let slots = self.slots.read();
        slots.by_id.get(id).map(|&slot| slots.entries[slot].clone())
    }

    fn check_dim(&self, what: &str, len: usize) -> Result<()> {
        if len != self.spec.dimension {
            return Err(Error::IndexCompatibility(format!(
                "{what} has {len} dimensions, index expects {}",
                self.spec.dimension
            )));
        }
        Ok(())
    }
}

impl VectorIndexer for FlatIndex {
    fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    fn add(&self, entries: Vec<IndexEntry>) -> Result<()> {
        // validate the whole batch before taking the write lock so a bad
        // entry leaves the index untouched
        for entry in &entries {
            self.check_dim(&format!("embedding of passage {}", entry.passage.id), entry.embedding.len())?;
        }

        let mut slots = self.slots.write();
        for entry in entries {
            match slots.by_id.get(&entry.passage.id).copied() {
                Some(slot) => slots.entries[slot] = entry,
                None => {
                    let slot = slots.entries.len();
                    slots.by_id.insert(entry.passage.id.clone(), slot);
                    slots.entries.push(entry);
                }
            }
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredMatch>> {
        self.check_dim("query vector", query.len())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let slots = self.slots.read();
        let mut scored: Vec<(usize, f32)> = slots
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (slot, score(self.spec.metric, query, &entry.embedding)))
            .collect();

        // stable: equal scores keep slot order
        scored.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(slot, score)| ScoredMatch { passage: slots.entries[slot].passage.clone(), score })
            .collect())
    }

    fn len(&self) -> usize {
        self.slots.read().entries.len()
    }
}

/// NaN scores rank below everything else; `-0.0` ties with `0.0`.
fn rank_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score + 0.0 }
}
