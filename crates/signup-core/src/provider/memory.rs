//! In-process account provider.

use super::{hash_secret, AccountHandle, AccountProvider};
use crate::error::{ProviderError, ProviderErrorCode};
use crate::validators::is_email_valid;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default minimum password length, matching common identity services.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct AccountRecord {
    handle: AccountHandle,
    passphrase_hash: String,
}

/// Account provider that keeps accounts in memory.
///
/// E-mails are unique case-insensitively; only a SHA-256 hash of the
/// passphrase is retained.
///
/// This is a stand-in for a real identity service, not a credential store:
/// the hash is unsalted (see [`hash_secret`]) and nothing survives a restart.
#[derive(Debug)]
pub struct MemoryAccountProvider {
    /// Account records indexed by lowercased e-mail
    accounts: RwLock<HashMap<String, AccountRecord>>,
    min_password_length: usize,
}

impl Default for MemoryAccountProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl MemoryAccountProvider {
    pub fn new(min_password_length: usize) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            min_password_length,
        }
    }

    /// Number of accounts created so far.
    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Check whether an account exists for `email`.
    pub async fn contains(&self, email: &str) -> bool {
        self.accounts.read().await.contains_key(&normalize_email(email))
    }

    /// Look up the account registered for `email`.
    pub async fn get(&self, email: &str) -> Option<AccountHandle> {
        self.accounts
            .read()
            .await
            .get(&normalize_email(email))
            .map(|r| r.handle.clone())
    }

    /// Check a passphrase against the stored hash.
    pub async fn verify_passphrase(&self, email: &str, passphrase: &str) -> bool {
        self.accounts
            .read()
            .await
            .get(&normalize_email(email))
            .map(|r| r.passphrase_hash == hash_secret(passphrase))
            .unwrap_or(false)
    }
}

#[async_trait]
impl AccountProvider for MemoryAccountProvider {
    async fn create_account(
        &self,
        email: &str,
        passphrase: &str,
    ) -> Result<AccountHandle, ProviderError> {
        if !is_email_valid(email) {
            return Err(ProviderError::new(
                ProviderErrorCode::Other("invalid-email".into()),
                "The email address is badly formatted",
            ));
        }

        if passphrase.chars().count() < self.min_password_length {
            return Err(ProviderError::new(
                ProviderErrorCode::WeakPassword,
                format!(
                    "Password should be at least {} characters",
                    self.min_password_length
                ),
            ));
        }

        let key = normalize_email(email);
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            debug!("Rejected duplicate account e-mail");
            return Err(ProviderError::new(
                ProviderErrorCode::EmailAlreadyInUse,
                "The email address is already in use by another account",
            ));
        }

        let handle = AccountHandle::new(email);
        accounts.insert(
            key,
            AccountRecord {
                handle: handle.clone(),
                passphrase_hash: hash_secret(passphrase),
            },
        );

        info!(uid = %handle.uid, "Account created");
        Ok(handle)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
