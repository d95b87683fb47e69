use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

/// SHA-256 content hash of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TxHash(#[serde(with = "hex::serde")] pub [u8; 32]);

impl TxHash {
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Owner of an output. Spending it requires a signature checked against this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PublicKey(#[serde(with = "hex::serde")] pub [u8; 32]);

impl PublicKey {
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<ed25519_dalek::VerifyingKey> for PublicKey {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Identity of a spendable output: the transaction that created it and its
/// position among that transaction's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoId {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl UtxoId {
    pub const fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl Display for UtxoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// Value paid to an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Output {
    pub value: Decimal,
    pub owner: PublicKey,
}

impl Output {
    pub const fn new(value: Decimal, owner: PublicKey) -> Self {
        Self { value, owner }
    }

    fn write_raw(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.normalize().serialize());
        buf.extend_from_slice(self.owner.as_bytes());
    }
}

/// Claim on a previous output, authorized by `signature`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Input {
    pub prev_tx_hash: TxHash,
    pub output_index: u32,
    #[serde(with = "hex::serde", default)]
    pub signature: Vec<u8>,
}

impl Input {
    pub const fn new(prev_tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            prev_tx_hash,
            output_index,
            signature: Vec::new(),
        }
    }

    /// The output this input spends
    pub const fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.prev_tx_hash, self.output_index)
    }

    fn write_outpoint(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&self.output_index.to_be_bytes());
    }
}

/// A transfer consuming previous outputs and creating new ones.
///
/// The hash is derived from the content on demand, so a transaction's
/// identity changes whenever its inputs, signatures or outputs change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(default)]
    inputs: Vec<Input>,
    #[serde(default)]
    outputs: Vec<Output>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, prev_tx_hash: TxHash, output_index: u32) {
        self.inputs.push(Input::new(prev_tx_hash, output_index));
    }

    pub fn add_output(&mut self, value: Decimal, owner: PublicKey) {
        self.outputs.push(Output::new(value, owner));
    }

    /// Removes the input at `index`, shifting later inputs down.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn remove_input(&mut self, index: usize) -> Input {
        assert!(
            index < self.inputs.len(),
            "input index {index} out of range for {} inputs",
            self.inputs.len()
        );
        self.inputs.remove(index)
    }

    /// Attaches `signature` to the input at `index`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn add_signature(&mut self, index: usize, signature: Vec<u8>) {
        assert!(
            index < self.inputs.len(),
            "input index {index} out of range for {} inputs",
            self.inputs.len()
        );
        self.inputs[index].signature = signature;
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// # Panics
    /// If `index` is out of range.
    pub fn input(&self, index: usize) -> &Input {
        assert!(
            index < self.inputs.len(),
            "input index {index} out of range for {} inputs",
            self.inputs.len()
        );
        &self.inputs[index]
    }

    /// # Panics
    /// If `index` is out of range.
    pub fn output(&self, index: usize) -> &Output {
        assert!(
            index < self.outputs.len(),
            "output index {index} out of range for {} outputs",
            self.outputs.len()
        );
        &self.outputs[index]
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Bytes the signature of input `index` must cover: that input's outpoint
    /// followed by every output. Signatures of other inputs are excluded, so
    /// inputs can be signed in any order.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn raw_data_to_sign(&self, index: usize) -> Vec<u8> {
        assert!(
            index < self.inputs.len(),
            "input index {index} out of range for {} inputs",
            self.inputs.len()
        );
        let mut buf = Vec::with_capacity(36 + self.outputs.len() * 48);
        self.inputs[index].write_outpoint(&mut buf);
        for output in &self.outputs {
            output.write_raw(&mut buf);
        }
        buf
    }

    /// Full content of the transaction, signatures included
    ///
    /// # Panics
    /// If a signature is longer than `u32::MAX` bytes.
    pub fn raw_tx(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for input in &self.inputs {
            input.write_outpoint(&mut buf);
            buf.extend_from_slice(&length_prefix(input.signature.len()));
            buf.extend_from_slice(&input.signature);
        }
        for output in &self.outputs {
            output.write_raw(&mut buf);
        }
        buf
    }

    pub fn hash(&self) -> TxHash {
        TxHash(Sha256::digest(self.raw_tx()).into())
    }

    /// Sum of all output values, `None` if it does not fit in a `Decimal`
    pub fn total_output(&self) -> Option<Decimal> {
        self.outputs
            .iter()
            .try_fold(Decimal::ZERO, |total, output| total.checked_add(output.value))
    }
}

fn length_prefix(len: usize) -> [u8; 4] {
    match u32::try_from(len) {
        Ok(len) => len.to_be_bytes(),
        Err(_) => panic!("signature of {len} bytes does not fit a u32 length prefix"),
    }
}
