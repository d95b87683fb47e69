use crate::crypto::{Ed25519Verifier, SignatureVerifier};
use crate::transaction::{Transaction, UtxoId};
use crate::utxo_pool::UtxoPool;
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Why a transaction was turned away. Only used for diagnostics; callers see
/// accepted or not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Rejection {
    #[error("input {index} spends {utxo}, which is not in the pool")]
    MissingInput { index: usize, utxo: UtxoId },
    #[error("input {index} spends {utxo} more than once")]
    DuplicateInput { index: usize, utxo: UtxoId },
    #[error("input {index} has an invalid signature for {utxo}")]
    BadSignature { index: usize, utxo: UtxoId },
    #[error("output {index} has negative value {value}")]
    NegativeOutput { index: usize, value: Decimal },
    #[error("outputs total exceeds inputs total")]
    ValueCreated,
    #[error("input values are out of range")]
    Overflow,
}

/// Validates transactions against its own UTXO pool and applies accepted
/// ones to it, one epoch at a time.
#[derive(Debug)]
pub struct TxHandler<V = Ed25519Verifier> {
    pool: UtxoPool,
    verifier: V,
    epoch: u64,
}

impl TxHandler {
    /// Starts from a copy of `pool`; the caller's pool is never touched.
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_verifier(pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: pool.clone(),
            verifier,
            epoch: 0,
        }
    }

    /// True if every input spends a distinct output of the current pool with
    /// a valid signature from its owner, no output is negative, and the
    /// outputs do not add up to more than the inputs.
    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        self.check(tx).is_ok()
    }

    /// Processes one epoch of candidates in the order given.
    ///
    /// Each candidate is checked against the pool as left by the candidates
    /// accepted before it, so of two transactions spending the same output
    /// only the earlier one gets in. Rejected candidates are not retried.
    /// Returns the accepted transactions in processing order.
    pub fn handle_txs(
        &mut self,
        candidates: impl IntoIterator<Item = Transaction>,
    ) -> Vec<Transaction> {
        self.epoch += 1;

        let mut accepted = Vec::new();
        let mut rejected = 0;

        for tx in candidates {
            match self.check(&tx) {
                Ok(()) => {
                    self.apply(&tx);
                    debug!("Accepted transaction {}", tx.hash());
                    accepted.push(tx);
                }
                Err(reason) => {
                    debug!("Rejected transaction {}: {reason}", tx.hash());
                    rejected += 1;
                }
            }
        }

        info!(
            "Epoch {}: accepted {} transactions, rejected {rejected}, {} unspent outputs",
            self.epoch,
            accepted.len(),
            self.pool.len()
        );

        accepted
    }

    pub const fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    fn check(&self, tx: &Transaction) -> Result<(), Rejection> {
        let mut claimed = HashSet::with_capacity(tx.num_inputs());
        let mut input_values = Vec::with_capacity(tx.num_inputs());

        for (index, input) in tx.inputs().iter().enumerate() {
            let utxo = input.utxo_id();

            let spent = self
                .pool
                .get(&utxo)
                .ok_or(Rejection::MissingInput { index, utxo })?;

            if !claimed.insert(utxo) {
                return Err(Rejection::DuplicateInput { index, utxo });
            }

            let payload = tx.raw_data_to_sign(index);
            if !self.verifier.verify(&spent.owner, &payload, &input.signature) {
                return Err(Rejection::BadSignature { index, utxo });
            }

            input_values.push(spent.value);
        }

        if let Some((index, output)) = tx
            .outputs()
            .iter()
            .enumerate()
            .find(|(_, output)| output.value.is_sign_negative() && !output.value.is_zero())
        {
            return Err(Rejection::NegativeOutput {
                index,
                value: output.value,
            });
        }

        let output_values: Vec<Decimal> =
            tx.outputs().iter().map(|output| output.value).collect();
        match covers(&input_values, &output_values) {
            Some(true) => Ok(()),
            Some(false) => Err(Rejection::ValueCreated),
            None => Err(Rejection::Overflow),
        }
    }

    // Only called after `check` succeeded against the same pool state.
    fn apply(&mut self, tx: &Transaction) {
        for input in tx.inputs() {
            self.pool.remove(&input.utxo_id());
        }

        let hash = tx.hash();
        for (index, output) in (0u32..).zip(tx.outputs()) {
            self.pool.add(UtxoId::new(hash, index), *output);
        }
    }
}

/// Whether `inputs` add up to at least `outputs`.
///
/// Works on the running difference, taking from `outputs` while it is
/// non-negative and from `inputs` otherwise, so it stays within
/// `[-Decimal::MAX, Decimal::MAX]` for non-negative values and neither total
/// has to be representable. `None` if a negative input pushes it out of range.
fn covers(inputs: &[Decimal], outputs: &[Decimal]) -> Option<bool> {
    let mut inputs = inputs.iter();
    let mut outputs = outputs.iter();
    let mut balance = Decimal::ZERO;

    loop {
        if balance.is_sign_negative() && !balance.is_zero() {
            match inputs.next() {
                Some(value) => balance = balance.checked_add(*value)?,
                None => return Some(false),
            }
        } else {
            match outputs.next() {
                Some(value) => balance = balance.checked_sub(*value)?,
                None => return Some(true),
            }
        }
    }
}
