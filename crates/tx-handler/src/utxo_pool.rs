use crate::transaction::{Output, UtxoId};
use std::collections::HashMap;

/// Unspent transaction outputs, keyed by the transaction that created them
/// and their position in it.
///
/// Pure bookkeeping: nothing here checks whether an insert or removal is
/// allowed. `Clone` yields a fully independent pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<UtxoId, Output>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Inserts `output` under `id`, replacing any previous entry
    pub fn add(&mut self, id: UtxoId, output: Output) {
        self.utxos.insert(id, output);
    }

    /// Removing an absent id is a no-op
    pub fn remove(&mut self, id: &UtxoId) {
        self.utxos.remove(id);
    }

    pub fn get(&self, id: &UtxoId) -> Option<&Output> {
        self.utxos.get(id)
    }

    /// All ids in the pool, sorted
    pub fn all_utxos(&self) -> Vec<UtxoId> {
        let mut ids: Vec<UtxoId> = self.utxos.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &Output)> {
        self.utxos.iter()
    }
}

impl FromIterator<(UtxoId, Output)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (UtxoId, Output)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
