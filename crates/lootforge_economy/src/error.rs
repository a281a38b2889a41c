//! # Economy Error Types
//!
//! Errors that can occur in the economy system.
//!
//! Lookups (pools, templates, rarity resolution) never fail: they return
//! `Option` and the caller decides whether to skip. Errors are reserved for
//! rejected transactions and unparsable configuration.

use thiserror::Error;

use crate::item::{CurrencyKind, TemplateId};

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Consumables never enter the upgrade, cleanse or dismantle paths.
    #[error("item {template_id} cannot be upgraded, cleansed or dismantled")]
    NotUpgradeable {
        /// Template of the rejected item.
        template_id: TemplateId,
    },

    /// Cleanse requested on an item that has no upgrade levels.
    #[error("item {template_id} has no upgrades to cleanse")]
    NotUpgraded {
        /// Template of the rejected item.
        template_id: TemplateId,
    },

    /// The caller cannot pay for the transaction.
    #[error("insufficient {currency}: need {required}, have {available}")]
    InsufficientFunds {
        /// Currency that was short.
        currency: CurrencyKind,
        /// The amount required.
        required: u64,
        /// The amount available.
        available: u64,
    },

    /// Template not found in the catalog.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
