//! HTTP implementation of [`VaultApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use vaultlink_config::VaultConfig;
use vaultlink_protocols::{
    CredentialEntry, GeneratePasswordOptions, StatusInfo, TotpCode, VaultError,
};

use super::VaultApi;
use super::api::{ErrorBody, PasswordResponse, UnlockGrant, UnlockRequest};

/// Vault client speaking JSON over HTTP to the loopback vault service.
pub struct HttpVaultClient {
    base_url: String,
    timeout_seconds: u64,
    client: reqwest::Client,
}

impl HttpVaultClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_seconds,
            client,
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout_seconds)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, VaultError> {
        let response = builder.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Vault request failed");
        Err(VaultError::from_status(
            status.as_u16(),
            ErrorBody::message_from(&body),
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, VaultError> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))
    }

    fn map_transport(&self, error: reqwest::Error) -> VaultError {
        if error.is_timeout() {
            VaultError::Timeout(self.timeout_seconds)
        } else {
            VaultError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl VaultApi for HttpVaultClient {
    async fn unlock(&self, password: &str) -> Result<UnlockGrant, VaultError> {
        let builder = self
            .request(Method::POST, "/unlock", None)
            .json(&UnlockRequest { password });
        match self.send_json(builder).await {
            Err(VaultError::Unauthorized) => Err(VaultError::InvalidPassword),
            other => other,
        }
    }

    async fn lock(&self, token: &str) -> Result<(), VaultError> {
        self.send(self.request(Method::POST, "/lock", Some(token)))
            .await
            .map(|_| ())
    }

    async fn status(&self, token: &str) -> Result<StatusInfo, VaultError> {
        self.send_json(self.request(Method::GET, "/status", Some(token)))
            .await
    }

    async fn list_items(&self, token: &str) -> Result<Vec<CredentialEntry>, VaultError> {
        self.send_json(self.request(Method::GET, "/items", Some(token)))
            .await
    }

    async fn totp(&self, token: &str, id: &str) -> Result<TotpCode, VaultError> {
        let path = format!("/items/{}/totp", id);
        self.send_json(self.request(Method::POST, &path, Some(token)))
            .await
    }

    async fn generate_password(
        &self,
        token: &str,
        options: &GeneratePasswordOptions,
    ) -> Result<String, VaultError> {
        let builder = self
            .request(Method::POST, "/generate/password", Some(token))
            .json(options);
        let response: PasswordResponse = self.send_json(builder).await?;
        Ok(response.password)
    }

    async fn create_item(
        &self,
        token: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError> {
        let builder = self.request(Method::POST, "/items", Some(token)).json(item);
        self.send_json(builder).await
    }

    async fn update_item(
        &self,
        token: &str,
        id: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError> {
        let path = format!("/items/{}", id);
        let builder = self.request(Method::PUT, &path, Some(token)).json(item);
        self.send_json(builder).await
    }

    async fn delete_item(&self, token: &str, id: &str) -> Result<(), VaultError> {
        let path = format!("/items/{}", id);
        self.send(self.request(Method::DELETE, &path, Some(token)))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
