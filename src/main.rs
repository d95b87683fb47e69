mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliConfig, Config};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs::File, io};
use tracing::{info, warn};
use tx_handler::{
    process_epochs,
    transaction::{Output, PublicKey, Transaction, TxHash, UtxoId},
    utxo_pool::UtxoPool,
};

/// One unspent output as it appears in the pool CSV
#[derive(Debug, Deserialize, Serialize)]
struct PoolRecord {
    tx_hash: TxHash,
    index: u32,
    value: Decimal,
    owner: PublicKey,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    run(&config)?;

    info!("Processing completed successfully");

    Ok(())
}

fn run<C: Config>(config: &C) -> Result<()> {
    let pool = read_pool(config)?;
    let epochs = read_epochs(config)?;

    info!(
        "Loaded {} unspent outputs and {} epochs",
        pool.len(),
        epochs.len()
    );

    let (accepted, pool) = process_epochs(&pool, epochs);

    for (epoch, txs) in accepted.iter().enumerate() {
        if txs.is_empty() {
            warn!("Epoch {}: no transactions accepted", epoch + 1);
        }
        for tx in txs {
            info!("Epoch {}: {}", epoch + 1, tx.hash());
        }
    }

    write_pool(&pool)
}

fn read_pool<C: Config>(config: &C) -> Result<UtxoPool> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(config.pool_path())
        .context("Failed to open pool file")?;

    let mut pool = UtxoPool::new();

    for (line, result) in reader.deserialize::<PoolRecord>().enumerate() {
        let record = result.with_context(|| format!("Failed to parse pool record {}", line + 1))?;
        let id = UtxoId::new(record.tx_hash, record.index);

        if pool.contains(&id) {
            warn!("Duplicate pool entry {id}, keeping the last one");
        }

        pool.add(id, Output::new(record.value, record.owner));
    }

    Ok(pool)
}

fn read_epochs<C: Config>(config: &C) -> Result<Vec<Vec<Transaction>>> {
    let file = File::open(config.epochs_path()).context("Failed to open epochs file")?;

    serde_json::from_reader(io::BufReader::new(file)).context("Failed to parse epochs file")
}

fn write_pool(pool: &UtxoPool) -> Result<()> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new().from_writer(handle);

    let mut entries: Vec<_> = pool.iter().collect();
    entries.sort_unstable_by_key(|(id, _)| **id);

    for (id, output) in entries {
        let record = PoolRecord {
            tx_hash: id.tx_hash,
            index: id.index,
            value: output.value,
            owner: output.owner,
        };
        writer
            .serialize(&record)
            .context("Failed to serialize pool record")?;
    }

    writer.flush().context("Failed to flush stdout")?;

    Ok(())
}
