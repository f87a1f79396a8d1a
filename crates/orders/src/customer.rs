use serde::{Deserialize, Serialize};

use tradepost_core::CustomerId;

/// Customer directory entry. Read-only for this system; orders reference
/// customers but never modify them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}
