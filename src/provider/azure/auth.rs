//! Bearer token acquisition for the management API.
//!
//! Sources are tried in this order when [`AuthSource::Auto`] is selected:
//!
//! 1. An explicit token (config file or `AZURE_ACCESS_TOKEN`)
//! 2. A service principal from `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` and
//!    `AZURE_TENANT_ID` (OAuth2 client-credentials grant)
//! 3. The Azure CLI (`az account get-access-token`)

use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::provider::{ProviderError, ProviderResult};

/// Default Microsoft Entra authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Scope requested for the public-cloud management endpoint.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Where the bearer token comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthSource {
    /// Explicit token, then service principal, then Azure CLI
    #[default]
    Auto,
    /// Explicit token only
    Token,
    /// Service principal only
    ServicePrincipal,
    /// Azure CLI only
    Cli,
}

/// An acquired bearer token.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    /// Subscription reported alongside the token (Azure CLI only).
    pub subscription_id: Option<String>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

/// Service principal credentials.
#[derive(Clone)]
pub struct ServicePrincipal {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    subscription: Option<String>,
}

impl ServicePrincipal {
    /// Reads the credentials from the standard Azure environment variables.
    pub fn from_env() -> Option<Self> {
        let var = |name| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            tenant_id: var("AZURE_TENANT_ID")?,
            client_id: var("AZURE_CLIENT_ID")?,
            client_secret: var("AZURE_CLIENT_SECRET")?,
        })
    }

    /// Requests a token with the client-credentials grant.
    pub async fn request_token(
        &self,
        client: &Client,
        authority_host: &str,
        scope: &str,
    ) -> ProviderResult<AccessToken> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            self.tenant_id
        );
        debug!(url = %url, client_id = %self.client_id, "Requesting service principal token");

        let response = client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Auth(format!(
                "token request failed with status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body: TokenResponse = serde_json::from_str(&text)?;
        Ok(AccessToken {
            token: body.access_token,
            subscription_id: None,
        })
    }
}

/// Obtains a token from the Azure CLI.
pub async fn cli_token() -> ProviderResult<AccessToken> {
    debug!("Requesting token from Azure CLI");

    let output = Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            "https://management.azure.com/",
            "--output",
            "json",
        ])
        .output()
        .await
        .map_err(|e| ProviderError::Auth(format!("Azure CLI is not available: {e}")))?;

    if !output.status.success() {
        return Err(ProviderError::Auth(format!(
            "az account get-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_cli_token(&output.stdout)
}

fn parse_cli_token(stdout: &[u8]) -> ProviderResult<AccessToken> {
    let token: CliToken = serde_json::from_slice(stdout)?;
    Ok(AccessToken {
        token: token.access_token,
        subscription_id: token.subscription,
    })
}

/// Token acquisition settings.
#[derive(Clone)]
pub struct TokenRequest {
    pub source: AuthSource,
    /// Explicit token, if one was configured.
    pub access_token: Option<String>,
    pub authority_host: String,
    pub scope: String,
}

impl Default for TokenRequest {
    fn default() -> Self {
        Self {
            source: AuthSource::Auto,
            access_token: None,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            scope: MANAGEMENT_SCOPE.to_string(),
        }
    }
}

impl TokenRequest {
    /// Acquires a token from the configured source.
    pub async fn acquire(&self, client: &Client) -> ProviderResult<AccessToken> {
        let explicit = self
            .access_token
            .as_ref()
            .filter(|t| !t.trim().is_empty())
            .map(|token| AccessToken {
                token: token.clone(),
                subscription_id: None,
            });

        match self.source {
            AuthSource::Token => explicit.ok_or_else(|| {
                ProviderError::Auth("no access token configured".to_string())
            }),
            AuthSource::ServicePrincipal => {
                let principal = ServicePrincipal::from_env().ok_or_else(|| {
                    ProviderError::Auth(
                        "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET must be set"
                            .to_string(),
                    )
                })?;
                principal
                    .request_token(client, &self.authority_host, &self.scope)
                    .await
            }
            AuthSource::Cli => cli_token().await,
            AuthSource::Auto => {
                if let Some(token) = explicit {
                    debug!("Using explicit access token");
                    return Ok(token);
                }
                if let Some(principal) = ServicePrincipal::from_env() {
                    info!(client_id = %principal.client_id, "Authenticating as service principal");
                    return principal
                        .request_token(client, &self.authority_host, &self.scope)
                        .await;
                }
                info!("Authenticating with Azure CLI credentials");
                cli_token().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_token() {
        let stdout = br#"{
            "accessToken": "eyJ0eXAi",
            "expiresOn": "2026-10-15 12:00:00.000000",
            "subscription": "11111111-2222-3333-4444-555555555555",
            "tenant": "tenant",
            "tokenType": "Bearer"
        }"#;
        let token = parse_cli_token(stdout).unwrap();
        assert_eq!(token.token, "eyJ0eXAi");
        assert_eq!(
            token.subscription_id.as_deref(),
            Some("11111111-2222-3333-4444-555555555555")
        );
    }

    #[test]
    fn test_auth_source_serde() {
        let source: AuthSource = serde_json::from_str("\"service-principal\"").unwrap();
        assert_eq!(source, AuthSource::ServicePrincipal);
        assert_eq!(AuthSource::default(), AuthSource::Auto);
    }

    #[tokio::test]
    async fn test_explicit_token_wins_in_auto_mode() {
        let request = TokenRequest {
            access_token: Some("configured".into()),
            ..TokenRequest::default()
        };
        let token = request.acquire(&Client::new()).await.unwrap();
        assert_eq!(token.token, "configured");
    }

    #[tokio::test]
    async fn test_token_source_requires_token() {
        let request = TokenRequest {
            source: AuthSource::Token,
            access_token: Some("  ".into()),
            ..TokenRequest::default()
        };
        assert!(matches!(
            request.acquire(&Client::new()).await,
            Err(ProviderError::Auth(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let principal = ServicePrincipal {
            tenant_id: "t".into(),
            client_id: "c".into(),
            client_secret: "hunter2".into(),
        };
        assert!(!format!("{:?}", principal).contains("hunter2"));
    }
}
