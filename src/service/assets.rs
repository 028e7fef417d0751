use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{config::Config, error::ApiError};

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        public_id: &str,
    ) -> Result<UploadedAsset, ApiError>;
    async fn destroy(&self, public_id: &str) -> Result<(), ApiError>;
}

/// Recovers the public id from a delivery URL such as
/// `https://res.cloudinary.com/demo/image/upload/c_fill,w_200/v1712/folder/pic.png`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    if !url.contains("cloudinary") {
        return None;
    }
    let (_, rest) = url.split_once("/image/upload/")?;
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let (last, leading) = segments.split_last()?;

    let kept: Vec<&str> = match leading.iter().rposition(|s| is_version(s)) {
        Some(index) => leading[index + 1..].to_vec(),
        None => leading
            .iter()
            .copied()
            .skip_while(|s| is_transformation(s))
            .collect(),
    };

    let stem = last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last);
    if stem.is_empty() {
        return None;
    }

    let mut public_id = kept.join("/");
    if !public_id.is_empty() {
        public_id.push('/');
    }
    public_id.push_str(stem);
    Some(public_id)
}

fn is_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].bytes().all(|b| b.is_ascii_digit())
}

fn is_transformation(segment: &str) -> bool {
    segment.contains(',')
        || segment
            .split_once('_')
            .is_some_and(|(prefix, _)| (1..=2).contains(&prefix.len()))
}

pub struct CloudinaryAssetStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryAssetStore {
    /// `None` until all three credentials are configured.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Option<Self> {
        Some(Self {
            client,
            cloud_name: config.cloudinary_cloud_name.clone()?,
            api_key: config.cloudinary_api_key.clone()?,
            api_secret: config.cloudinary_api_secret.clone()?,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    /// Parameters must already be sorted by name.
    fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let payload = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{:x}", Sha256::digest(format!("{payload}{api_secret}")))
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        public_id: &str,
    ) -> Result<UploadedAsset, ApiError> {
        let timestamp = Self::timestamp();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.api_secret,
        );
        let data_uri = format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes));

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&[
                ("file", data_uri.as_str()),
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|err| ApiError::unexpected(format!("asset upload request: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::unexpected(format!(
                "asset upload failed with {status}: {body}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| ApiError::unexpected(format!("asset upload response: {err}")))?;
        Ok(UploadedAsset {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ApiError> {
        let timestamp = Self::timestamp();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|err| ApiError::unexpected(format!("asset destroy request: {err}")))?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|err| ApiError::unexpected(format!("asset destroy response: {err}")))?;
        if body.result != "ok" {
            return Err(ApiError::unexpected(format!(
                "asset destroy for {public_id} returned {}",
                body.result
            )));
        }
        Ok(())
    }
}

/// Stand-in used when no asset store credentials are configured.
pub struct UnconfiguredAssetStore;

#[async_trait]
impl AssetStore for UnconfiguredAssetStore {
    async fn upload(&self, _: Vec<u8>, _: &str, _: &str) -> Result<UploadedAsset, ApiError> {
        Err(ApiError::unexpected("asset store is not configured"))
    }

    async fn destroy(&self, _: &str) -> Result<(), ApiError> {
        Err(ApiError::unexpected("asset store is not configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_strips_version_and_extension() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712345678/user_abc_1712.jpg"
            )
            .as_deref(),
            Some("user_abc_1712")
        );
    }

    #[test]
    fn public_id_keeps_folders_and_drops_transformations() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/c_fill,w_200/v17/products/yz450f.png"
            )
            .as_deref(),
            Some("products/yz450f")
        );
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/w_300/products/raptor.webp?x=1"
            )
            .as_deref(),
            Some("products/raptor")
        );
    }

    #[test]
    fn foreign_urls_have_no_public_id() {
        assert_eq!(public_id_from_url("https://placehold.co/400x300"), None);
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/video/upload/v1/a.mp4"),
            None
        );
    }

    #[test]
    fn signature_is_sha256_of_sorted_params_and_secret() {
        let signature = CloudinaryAssetStore::sign(
            &[("public_id", "sample"), ("timestamp", "1315060510")],
            "abcd",
        );
        let expected = format!(
            "{:x}",
            Sha256::digest(b"public_id=sample&timestamp=1315060510abcd")
        );
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn store_requires_every_credential() {
        let mut config = Config::default();
        config.cloudinary_cloud_name = Some("demo".to_string());
        config.cloudinary_api_key = Some("key".to_string());
        assert!(CloudinaryAssetStore::from_config(reqwest::Client::new(), &config).is_none());

        config.cloudinary_api_secret = Some("secret".to_string());
        assert!(CloudinaryAssetStore::from_config(reqwest::Client::new(), &config).is_some());
    }
}
