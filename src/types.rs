//! Domain values moved through the explorer API
//!
//! Identifiers are fixed-size hashes with a short text prefix (`addr:`,
//! `txid:`, `elem:`, `bid:`). The prefix is always written and is optional
//! when parsing. All values serialize to JSON through their text form.

use crate::error::ExplorerError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Serialize/deserialize a type through its `Display`/`FromStr` pair.
macro_rules! impl_string_serde {
    ($t:ty) => {
        impl serde::Serialize for $t {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $t {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_string_serde;

/// A 32-byte hash, written as 64 lower-case hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn digest(data: &[u8]) -> Self {
        Hash256(Sha256::digest(data).into())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Hash256 {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(ExplorerError::InvalidInput(format!(
                "hash must be 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| ExplorerError::InvalidInput(format!("invalid hex hash: {}", e)))?;
        Ok(Hash256(bytes))
    }
}

impl_string_serde!(Hash256);

/// Defines a hash-backed identifier with a text prefix.
macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub $crate::types::Hash256);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn as_bytes(&self) -> &[u8; 32] {
                &(self.0).0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                $name($crate::types::Hash256(bytes))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ExplorerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let hex_part = match s.split_once(':') {
                    Some(($prefix, rest)) => rest,
                    Some((other, _)) => {
                        return Err($crate::error::ExplorerError::InvalidInput(format!(
                            "expected prefix {:?}, got {:?}",
                            $prefix, other
                        )))
                    }
                    None => s,
                };
                hex_part.parse::<$crate::types::Hash256>().map($name)
            }
        }

        $crate::types::impl_string_serde!($name);
    };
}

pub(crate) use prefixed_id;

prefixed_id!(
    /// An account identifier; owns unspent elements and appears in transactions.
    Address,
    "addr"
);

prefixed_id!(
    /// Identifies a transaction by the hash of its contents.
    TransactionId,
    "txid"
);

/// Identifies a single output or contract: the object that created it plus
/// its position within that object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementId {
    pub source: Hash256,
    pub index: u64,
}

impl ElementId {
    pub const PREFIX: &'static str = "elem";

    pub fn new(source: Hash256, index: u64) -> Self {
        Self { source, index }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", Self::PREFIX, self.source, self.index)
    }
}

impl FromStr for ElementId {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("elem:").unwrap_or(s);
        let (source, index) = rest.split_once(':').ok_or_else(|| {
            ExplorerError::InvalidInput(format!("element id {:?} is missing an index", s))
        })?;
        let index = index
            .parse::<u64>()
            .map_err(|e| ExplorerError::InvalidInput(format!("invalid element index: {}", e)))?;
        Ok(ElementId {
            source: source.parse()?,
            index,
        })
    }
}

impl_string_serde!(ElementId);

/// An amount of the smallest siacoin unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Currency(pub u128);

impl Currency {
    pub const ZERO: Currency = Currency(0);

    pub fn checked_add(self, other: Currency) -> Option<Currency> {
        self.0.checked_add(other.0).map(Currency)
    }
}

impl From<u128> for Currency {
    fn from(v: u128) -> Self {
        Currency(v)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Currency)
            .map_err(|e| ExplorerError::InvalidInput(format!("invalid currency {:?}: {}", s, e)))
    }
}

impl_string_serde!(Currency);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinOutput {
    pub value: Currency,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundOutput {
    pub value: u64,
    pub address: Address,
}

/// An unspent (or historical) siacoin output tracked by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinElement {
    pub id: ElementId,
    pub output: SiacoinOutput,
    pub maturity_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundElement {
    pub id: ElementId,
    pub output: SiafundOutput,
    pub claim_start: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContract {
    pub filesize: u64,
    pub file_merkle_root: Hash256,
    pub window_start: u64,
    pub window_end: u64,
    pub renter_output: SiacoinOutput,
    pub host_output: SiacoinOutput,
    pub revision_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContractElement {
    pub id: ElementId,
    pub contract: FileContract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinInput {
    pub parent: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundInput {
    pub parent: ElementId,
    pub claim_address: Address,
}

/// A transaction as relayed by the pool and recorded by the index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub siacoin_inputs: Vec<SiacoinInput>,
    pub siacoin_outputs: Vec<SiacoinOutput>,
    pub siafund_inputs: Vec<SiafundInput>,
    pub siafund_outputs: Vec<SiafundOutput>,
    pub file_contracts: Vec<FileContract>,
    pub miner_fee: Currency,
}

impl Transaction {
    /// Calculate the id of this transaction
    pub fn id(&self) -> TransactionId {
        let mut hasher = Sha256::new();
        hasher.update(b"transaction");
        for input in &self.siacoin_inputs {
            update_element_id(&mut hasher, &input.parent);
        }
        for output in &self.siacoin_outputs {
            hasher.update(output.value.0.to_le_bytes());
            hasher.update(output.address.as_bytes());
        }
        for input in &self.siafund_inputs {
            update_element_id(&mut hasher, &input.parent);
            hasher.update(input.claim_address.as_bytes());
        }
        for output in &self.siafund_outputs {
            hasher.update(output.value.to_le_bytes());
            hasher.update(output.address.as_bytes());
        }
        for fc in &self.file_contracts {
            hasher.update(fc.filesize.to_le_bytes());
            hasher.update(fc.file_merkle_root.0);
            hasher.update(fc.window_start.to_le_bytes());
            hasher.update(fc.window_end.to_le_bytes());
            hasher.update(fc.renter_output.value.0.to_le_bytes());
            hasher.update(fc.renter_output.address.as_bytes());
            hasher.update(fc.host_output.value.0.to_le_bytes());
            hasher.update(fc.host_output.address.as_bytes());
            hasher.update(fc.revision_number.to_le_bytes());
        }
        hasher.update(self.miner_fee.0.to_le_bytes());
        let hash: [u8; 32] = hasher.finalize().into();
        TransactionId::from(hash)
    }

    pub fn is_empty(&self) -> bool {
        self.siacoin_inputs.is_empty()
            && self.siacoin_outputs.is_empty()
            && self.siafund_inputs.is_empty()
            && self.siafund_outputs.is_empty()
            && self.file_contracts.is_empty()
    }

    /// Id of the `index`th siacoin output created by this transaction.
    pub fn siacoin_output_id(&self, index: u64) -> ElementId {
        ElementId::new(self.id().0, index)
    }

    /// Every address that sends or receives value in this transaction.
    /// Input owners are not recorded on inputs, so only outputs and claim
    /// addresses are reported.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self
            .siacoin_outputs
            .iter()
            .map(|o| o.address)
            .chain(self.siafund_outputs.iter().map(|o| o.address))
            .chain(self.siafund_inputs.iter().map(|i| i.claim_address))
            .chain(
                self.file_contracts
                    .iter()
                    .flat_map(|fc| [fc.renter_output.address, fc.host_output.address]),
            )
            .collect();
        addrs.sort();
        addrs.dedup();
        addrs
    }
}

fn update_element_id(hasher: &mut Sha256, id: &ElementId) {
    hasher.update(id.source.0);
    hasher.update(id.index.to_le_bytes());
}
