//! The fungible asset the vault takes custody of.
//!
//! The vault only ever talks to its asset through the [`FungibleAsset`] trait:
//! balances, allowances, and the two transfer flavours. Any backend (a host
//! runtime's token, an in-memory ledger for testing) implements the trait.
//! The vault never mints or burns.

pub mod error;
pub mod ledger;

pub use error::AssetError;
pub use ledger::TokenLedger;

use vault_types::Address;

/// Standard fungible-ledger operations consumed by the vault.
///
/// Implementations must be all-or-nothing: a call that returns `Err` leaves
/// every balance and allowance untouched.
pub trait FungibleAsset {
    /// The asset's own address. The zero address is never a valid asset.
    fn address(&self) -> Address;

    fn balance_of(&self, owner: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Set `spender`'s allowance over `owner`'s funds to exactly `amount`.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError>;
}
