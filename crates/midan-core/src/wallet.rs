//! Wallet connection, reduced to a flag and an address.

use crate::model::Address;

/// Seed of the address the mock wallet hands out.
pub const DEFAULT_WALLET_SEED: &str = "YOU";

/// Something that can connect the session user's wallet.
pub trait WalletConnector {
    /// Connect if needed and return the session address. Connecting twice
    /// returns the same address.
    fn connect(&mut self) -> Address;

    /// The connected address, if any.
    fn address(&self) -> Option<&Address>;

    fn is_connected(&self) -> bool {
        self.address().is_some()
    }
}

/// Always succeeds with a deterministic mock address.
#[derive(Debug, Clone)]
pub struct MockWallet {
    seed: String,
    address: Option<Address>,
}

impl MockWallet {
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            address: None,
        }
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new(DEFAULT_WALLET_SEED)
    }
}

impl WalletConnector for MockWallet {
    fn connect(&mut self) -> Address {
        self.address
            .get_or_insert_with(|| Address::mock(&self.seed))
            .clone()
    }

    fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_is_idempotent() {
        let mut wallet = MockWallet::default();
        assert!(!wallet.is_connected());
        let first = wallet.connect();
        let second = wallet.connect();
        assert_eq!(first, second);
        assert_eq!(first, Address::mock("YOU"));
        assert!(wallet.is_connected());
    }

    #[test]
    fn custom_seed() {
        let mut wallet = MockWallet::new("C0FFEE");
        assert_eq!(wallet.connect().short(), "0xC0FF…0000");
    }
}
