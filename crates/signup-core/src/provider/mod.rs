//! Account provider contract.
//!
//! The provider owns account creation, secret storage and e-mail
//! uniqueness. Registration only needs `create_account`.

mod memory;

pub use memory::{MemoryAccountProvider, DEFAULT_MIN_PASSWORD_LENGTH};

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a freshly created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHandle {
    pub uid: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl AccountHandle {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            uid: Uuid::new_v4(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}

/// External identity service that creates user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Create an account authenticated by `passphrase`.
    ///
    /// This is the only call of a registration attempt that may suspend.
    async fn create_account(
        &self,
        email: &str,
        passphrase: &str,
    ) -> Result<AccountHandle, ProviderError>;
}

/// Hash a secret using SHA-256.
///
/// Unsalted and fast: a 6-digit passphrase hashed this way falls to a
/// 10^6-entry lookup table. Fine for the in-process provider, not for a
/// real credential store.
pub fn hash_secret(secret: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
