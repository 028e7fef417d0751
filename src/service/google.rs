use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleProfile {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<GoogleProfile, ApiError>;
}

/// Verifies Google ID tokens through the tokeninfo endpoint, which checks the
/// signature and expiry; the audience and issuer are checked here.
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: Option<String>,
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(client: reqwest::Client, tokeninfo_url: String, client_id: Option<String>) -> Self {
        Self {
            client,
            tokeninfo_url,
            client_id,
        }
    }

    fn invalid_token() -> ApiError {
        ApiError::authentication("invalid_google_token", "invalid Google token")
    }

    fn into_profile(info: TokenInfo, client_id: &str) -> Result<GoogleProfile, ApiError> {
        if info.aud != client_id {
            tracing::warn!(aud = %info.aud, "google token issued for another audience");
            return Err(Self::invalid_token());
        }
        if let Some(iss) = info.iss.as_deref() {
            if !GOOGLE_ISSUERS.contains(&iss) {
                return Err(Self::invalid_token());
            }
        }
        let email = info
            .email
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .ok_or_else(Self::invalid_token)?;
        let name = info
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(GoogleProfile {
            subject: info.sub,
            email,
            name,
            picture: info.picture,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleProfile, ApiError> {
        let Some(client_id) = self.client_id.as_deref() else {
            return Err(ApiError::unexpected("AUTH_GOOGLE_CLIENT_ID is not configured"));
        };

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|err| ApiError::unexpected(format!("google tokeninfo request: {err}")))?;

        if !response.status().is_success() {
            tracing::info!(status = %response.status(), "google rejected id token");
            return Err(Self::invalid_token());
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|_| Self::invalid_token())?;
        Self::into_profile(info, client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.to_string(),
            iss: Some("https://accounts.google.com".to_string()),
            sub: "1234".to_string(),
            email: Some("Ana@Gmail.com".to_string()),
            name: None,
            picture: Some("https://lh3.test/p".to_string()),
        }
    }

    #[test]
    fn accepts_matching_audience() {
        let profile = GoogleIdentityVerifier::into_profile(info("client"), "client").unwrap();
        assert_eq!(profile.subject, "1234");
        assert_eq!(profile.email, "ana@gmail.com");
        assert_eq!(profile.name, "ana");
        assert_eq!(profile.picture.as_deref(), Some("https://lh3.test/p"));
    }

    #[test]
    fn rejects_foreign_audience_and_issuer() {
        let err = GoogleIdentityVerifier::into_profile(info("other"), "client").unwrap_err();
        assert_eq!(err.code(), "invalid_google_token");

        let mut forged = info("client");
        forged.iss = Some("https://evil.test".to_string());
        assert!(GoogleIdentityVerifier::into_profile(forged, "client").is_err());
    }

    #[tokio::test]
    async fn missing_client_id_is_a_server_error() {
        let verifier =
            GoogleIdentityVerifier::new(reqwest::Client::new(), "http://127.0.0.1:9".into(), None);
        let err = verifier.verify("anything").await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
