use clap::Parser;
use std::path::{Path, PathBuf};

/// Trait for reading configuration parameters
pub trait Config {
    fn pool_path(&self) -> &Path;
    fn epochs_path(&self) -> &Path;
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "utxo-ledger",
    about = "Validates epochs of UTXO transactions and prints the resulting unspent outputs as CSV",
    version
)]
pub struct CliConfig {
    /// CSV file with the initial pool (tx_hash,index,value,owner)
    #[arg(value_name = "POOL_FILE")]
    pool_file: PathBuf,

    /// JSON file holding an array of epochs, each an array of transactions
    #[arg(value_name = "EPOCHS_FILE")]
    epochs_file: PathBuf,
}

impl Config for CliConfig {
    fn pool_path(&self) -> &Path {
        &self.pool_file
    }

    fn epochs_path(&self) -> &Path {
        &self.epochs_file
    }
}
