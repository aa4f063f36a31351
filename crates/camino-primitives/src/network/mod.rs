//! Network configuration.
//!
//! A `NetworkConfig` names a network (ID and bech32 HRP), the chains the
//! SDK builds transactions for, and the flat fees burned by each
//! transaction kind.  Presets cover the public networks; anything else is
//! loaded from JSON.
//!
//! The platform chain ID is always the zero ID.  The asset-chain and EVM
//! chain IDs and the native asset ID are assigned at genesis, so presets
//! leave them unset until the caller fills them in from a node.

use serde::{Deserialize, Serialize};

use crate::ids::Id;
use crate::PrimitivesError;

/// One native token unit expressed in its smallest denomination.
pub const ONE_NATIVE: u64 = 1_000_000_000;

/// One thousandth of a native token.
pub const MILLI_NATIVE: u64 = ONE_NATIVE / 1000;

/// Fees burned by each transaction kind, in the smallest denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub tx_fee: u64,
    pub create_asset_tx_fee: u64,
    pub create_subnet_tx_fee: u64,
    pub create_chain_tx_fee: u64,
    pub add_validator_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            tx_fee: MILLI_NATIVE,
            create_asset_tx_fee: 10 * MILLI_NATIVE,
            create_subnet_tx_fee: 100 * MILLI_NATIVE,
            create_chain_tx_fee: 100 * MILLI_NATIVE,
            add_validator_fee: MILLI_NATIVE,
        }
    }
}

/// Description of a network the SDK builds transactions for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network_id: u32,
    pub hrp: String,
    #[serde(default)]
    pub p_chain_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_chain_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_chain_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_asset_id: Option<Id>,
    #[serde(default)]
    pub fees: FeeSchedule,
}

impl NetworkConfig {
    fn preset(network_id: u32, hrp: &str) -> Self {
        NetworkConfig {
            network_id,
            hrp: hrp.to_string(),
            p_chain_id: Id::ZERO,
            x_chain_id: None,
            c_chain_id: None,
            native_asset_id: None,
            fees: FeeSchedule::default(),
        }
    }

    /// Camino mainnet.
    pub fn camino() -> Self {
        Self::preset(1000, "camino")
    }

    /// Columbus testnet.
    pub fn columbus() -> Self {
        Self::preset(1001, "columbus")
    }

    /// Kopernikus devnet.
    pub fn kopernikus() -> Self {
        Self::preset(1002, "kopernikus")
    }

    /// Local development network.
    pub fn local() -> Self {
        Self::preset(12345, "local")
    }

    /// Look up a preset by network ID.
    pub fn for_network_id(network_id: u32) -> Option<Self> {
        match network_id {
            1000 => Some(Self::camino()),
            1001 => Some(Self::columbus()),
            1002 => Some(Self::kopernikus()),
            12345 => Some(Self::local()),
            _ => None,
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, PrimitivesError> {
        let config: NetworkConfig = serde_json::from_str(json)
            .map_err(|e| PrimitivesError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PrimitivesError> {
        serde_json::to_string_pretty(self).map_err(|e| PrimitivesError::InvalidConfig(e.to_string()))
    }

    /// Check the HRP is usable as a bech32 prefix.
    pub fn validate(&self) -> Result<(), PrimitivesError> {
        if self.hrp.is_empty() {
            return Err(PrimitivesError::InvalidConfig("hrp is empty".into()));
        }
        if !self
            .hrp
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(PrimitivesError::InvalidConfig(format!(
                "hrp must be lowercase ascii: {}",
                self.hrp
            )));
        }
        Ok(())
    }
}
