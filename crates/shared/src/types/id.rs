//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `WalletId` where a `TransactionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(AccountId, "Unique identifier for a shared ledger account.");
typed_id!(MemberId, "Unique identifier for a member.");
typed_id!(WalletId, "Unique identifier for a wallet.");
typed_id!(TransactionId, "Unique identifier for a transaction.");
typed_id!(ActivityId, "Unique identifier for a transaction activity row.");
typed_id!(BudgetId, "Unique identifier for a budget.");
typed_id!(InstallmentId, "Unique identifier for an installment.");

impl WalletId {
    /// Sorts wallet ids ascending and removes duplicates.
    ///
    /// Row locks on several wallets are always taken in this order.
    #[must_use]
    pub fn lock_order(ids: &[Self]) -> Vec<Self> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trip_through_string() {
        let id = WalletId::new();
        let parsed = WalletId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(WalletId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&MemberId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }

    #[test]
    fn test_lock_order_sorts_and_dedups() {
        let a = WalletId::from_uuid(Uuid::from_u128(3));
        let b = WalletId::from_uuid(Uuid::from_u128(1));
        let c = WalletId::from_uuid(Uuid::from_u128(2));
        assert_eq!(WalletId::lock_order(&[a, b, c, a]), vec![b, c, a]);
    }
}
