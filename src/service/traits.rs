//! Read-side abstraction for price consumers.
//!
//! External bookkeeping components (the metered ledger, the custody vault)
//! never call into governance. They only read the committed price, through
//! this trait, so tests can substitute a fixed source.

use crate::governance::Price;
use async_trait::async_trait;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price committed by the last passing proposal (or the initial price).
    async fn current_price(&self) -> Price;
}

/// Constant price, for consumers under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrice(pub Price);

#[async_trait]
impl PriceSource for FixedPrice {
    async fn current_price(&self) -> Price {
        self.0
    }
}
