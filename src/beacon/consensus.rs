//! Fork-versioned decoding of signed beacon blocks.
//!
//! SSZ is not self-describing, so the payload layout is selected by the fork
//! the beacon node reports (`Eth-Consensus-Version`). Unknown forks are
//! rejected outright rather than decoded against a guessed layout.

use alloy_primitives::B256;
use ethereum_consensus::ssz::prelude::*;
use ethereum_consensus::{altair, bellatrix, capella, deneb, phase0, Fork};

use crate::error::{ResolverError, ResolverResult};

/// A signed beacon block, one variant per supported consensus fork.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SignedBeaconBlock {
    Phase0(phase0::mainnet::SignedBeaconBlock),
    Altair(altair::mainnet::SignedBeaconBlock),
    Bellatrix(bellatrix::mainnet::SignedBeaconBlock),
    Capella(capella::mainnet::SignedBeaconBlock),
    Deneb(deneb::mainnet::SignedBeaconBlock),
}

/// The message body of a beacon block: header fields and operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BeaconBlockMessage {
    Phase0(phase0::mainnet::BeaconBlock),
    Altair(altair::mainnet::BeaconBlock),
    Bellatrix(bellatrix::mainnet::BeaconBlock),
    Capella(capella::mainnet::BeaconBlock),
    Deneb(deneb::mainnet::BeaconBlock),
}

macro_rules! with_variants {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Self::Phase0($inner) => $body,
            Self::Altair($inner) => $body,
            Self::Bellatrix($inner) => $body,
            Self::Capella($inner) => $body,
            Self::Deneb($inner) => $body,
        }
    };
}

impl SignedBeaconBlock {
    /// The fork this block is encoded for.
    pub const fn version(&self) -> Fork {
        match self {
            Self::Phase0(_) => Fork::Phase0,
            Self::Altair(_) => Fork::Altair,
            Self::Bellatrix(_) => Fork::Bellatrix,
            Self::Capella(_) => Fork::Capella,
            Self::Deneb(_) => Fork::Deneb,
        }
    }

    /// Extracts the block message, discarding the signature.
    pub fn into_message(self) -> BeaconBlockMessage {
        match self {
            Self::Phase0(block) => BeaconBlockMessage::Phase0(block.message),
            Self::Altair(block) => BeaconBlockMessage::Altair(block.message),
            Self::Bellatrix(block) => BeaconBlockMessage::Bellatrix(block.message),
            Self::Capella(block) => BeaconBlockMessage::Capella(block.message),
            Self::Deneb(block) => BeaconBlockMessage::Deneb(block.message),
        }
    }
}

impl BeaconBlockMessage {
    /// The slot this block was proposed for.
    pub fn slot(&self) -> u64 {
        with_variants!(self, message => message.slot)
    }

    /// Index of the proposing validator.
    pub fn proposer_index(&self) -> u64 {
        with_variants!(self, message => message.proposer_index as u64)
    }

    /// Root of the parent beacon block.
    pub fn parent_root(&self) -> B256 {
        with_variants!(self, message => B256::from_slice(message.parent_root.as_ref()))
    }

    /// Root of the post-state.
    pub fn state_root(&self) -> B256 {
        with_variants!(self, message => B256::from_slice(message.state_root.as_ref()))
    }
}

/// Decodes an SSZ-encoded signed beacon block for the given fork version.
///
/// `version` is the value of the beacon node's `Eth-Consensus-Version`
/// response header; anything without a decoder here fails with
/// [`ResolverError::UnsupportedFork`].
pub(crate) fn decode_signed_beacon_block(
    version: &str,
    data: &[u8],
) -> ResolverResult<SignedBeaconBlock> {
    let block = match version.to_ascii_lowercase().as_str() {
        "phase0" => deserialize::<phase0::mainnet::SignedBeaconBlock>(data)
            .map(SignedBeaconBlock::Phase0),
        "altair" => deserialize::<altair::mainnet::SignedBeaconBlock>(data)
            .map(SignedBeaconBlock::Altair),
        "bellatrix" => deserialize::<bellatrix::mainnet::SignedBeaconBlock>(data)
            .map(SignedBeaconBlock::Bellatrix),
        "capella" => deserialize::<capella::mainnet::SignedBeaconBlock>(data)
            .map(SignedBeaconBlock::Capella),
        "deneb" => {
            deserialize::<deneb::mainnet::SignedBeaconBlock>(data).map(SignedBeaconBlock::Deneb)
        }
        other => {
            return Err(ResolverError::UnsupportedFork { version: other.to_string() });
        }
    };

    block.map_err(|e| ResolverError::BeaconDecodeFailed {
        version: version.to_string(),
        message: e.to_string(),
    })
}
