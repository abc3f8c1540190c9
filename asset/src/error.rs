//! Asset collaborator errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("transfer to or from the zero address")]
    ZeroAddress,

    #[error("arithmetic overflow in asset balance")]
    Overflow,

    #[error("transfer rejected: {0}")]
    Rejected(String),
}
