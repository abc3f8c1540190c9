//! Nullable asset: an in-memory ledger that can be told to fail.

use vault_asset::{AssetError, FungibleAsset, TokenLedger};
use vault_types::Address;

/// A [`TokenLedger`] with programmable failures.
///
/// `fail_transfers(n)` makes the next `n` transfer or transfer_from calls
/// return [`AssetError::Rejected`] without touching any balance, which is how
/// tests prove that a vault operation rolls back completely when its outbound
/// call fails.
pub struct NullAsset {
    ledger: TokenLedger,
    pending_failures: usize,
    transfer_calls: usize,
}

impl NullAsset {
    pub fn new(address: Address) -> Self {
        Self {
            ledger: TokenLedger::new(address),
            pending_failures: 0,
            transfer_calls: 0,
        }
    }

    /// Credit `to` with fresh supply.
    pub fn mint(&mut self, to: &Address, amount: u128) {
        self.ledger
            .mint(to, amount)
            .expect("null asset mint must not overflow");
    }

    /// Reject the next `count` transfers.
    pub fn fail_transfers(&mut self, count: usize) {
        self.pending_failures = count;
    }

    /// Number of transfer / transfer_from calls seen, successful or not.
    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    fn take_failure(&mut self) -> Result<(), AssetError> {
        self.transfer_calls += 1;
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(AssetError::Rejected("injected failure".into()));
        }
        Ok(())
    }
}

impl FungibleAsset for NullAsset {
    fn address(&self) -> Address {
        self.ledger.address()
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.ledger.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        self.ledger.approve(owner, spender, amount)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.take_failure()?;
        self.ledger.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.take_failure()?;
        self.ledger.transfer_from(spender, from, to, amount)
    }
}
