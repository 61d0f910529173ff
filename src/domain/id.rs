//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Order identifier assigned by the contract at creation.
///
/// Identifiers are dense and monotonically increasing: every id in
/// `0..nextOrderId` names an order that was created at some point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create a new `OrderId`.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Encode as the contract's `uint256` argument.
    #[must_use]
    pub fn to_u256(self) -> U256 {
        U256::from(self.0)
    }

    /// Decode from a `uint256` value, returning `None` if it does not fit in 64 bits.
    #[must_use]
    pub fn from_u256(value: U256) -> Option<Self> {
        u64::try_from(value).ok().map(Self)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_sort_by_numeric_value() {
        let mut ids = vec![OrderId::new(10), OrderId::new(2), OrderId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![OrderId::new(2), OrderId::new(7), OrderId::new(10)]);
    }

    #[test]
    fn u256_conversion_rejects_oversized_values() {
        assert_eq!(OrderId::from_u256(U256::from(42u64)), Some(OrderId::new(42)));
        assert_eq!(OrderId::from_u256(U256::MAX), None);
    }

    #[test]
    fn parses_from_cli_string() {
        assert_eq!(" 17 ".parse::<OrderId>().unwrap(), OrderId::new(17));
        assert!("abc".parse::<OrderId>().is_err());
    }
}
