pub mod crypto;
pub mod handler;
pub mod transaction;
pub mod utxo_pool;

use handler::TxHandler;
use transaction::Transaction;
use utxo_pool::UtxoPool;

/// Run consecutive epochs over a copy of `pool` and return what each epoch
/// accepted together with the final pool
pub fn process_epochs(
    pool: &UtxoPool,
    epochs: impl IntoIterator<Item = Vec<Transaction>>,
) -> (Vec<Vec<Transaction>>, UtxoPool) {
    let mut handler = TxHandler::new(pool);

    let accepted = epochs
        .into_iter()
        .map(|candidates| handler.handle_txs(candidates))
        .collect();

    (accepted, handler.into_pool())
}
