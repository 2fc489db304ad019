//! Vault service access.
//!
//! The vault is an external HTTP service; the coordinator and router only see
//! the [`VaultApi`] trait.

mod api;
mod client;

use async_trait::async_trait;

use vaultlink_protocols::{
    CredentialEntry, GeneratePasswordOptions, StatusInfo, TotpCode, VaultError,
};

pub use api::UnlockGrant;
pub use client::HttpVaultClient;

/// Operations the background performs against the vault.
///
/// Every call but [`VaultApi::unlock`] is authenticated with the session
/// token. A rejected token surfaces as [`VaultError::Unauthorized`].
#[async_trait]
pub trait VaultApi: Send + Sync {
    async fn unlock(&self, password: &str) -> Result<UnlockGrant, VaultError>;

    async fn lock(&self, token: &str) -> Result<(), VaultError>;

    async fn status(&self, token: &str) -> Result<StatusInfo, VaultError>;

    async fn list_items(&self, token: &str) -> Result<Vec<CredentialEntry>, VaultError>;

    async fn totp(&self, token: &str, id: &str) -> Result<TotpCode, VaultError>;

    async fn generate_password(
        &self,
        token: &str,
        options: &GeneratePasswordOptions,
    ) -> Result<String, VaultError>;

    async fn create_item(
        &self,
        token: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError>;

    async fn update_item(
        &self,
        token: &str,
        id: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError>;

    async fn delete_item(&self, token: &str, id: &str) -> Result<(), VaultError>;
}
