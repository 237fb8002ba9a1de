//! Avatar image storage
//!
//! Uploads go to Cloudinary's signed upload endpoint. The returned public
//! id is turned into a delivery URL requesting a 100x100 fill crop as JPEG.

use crate::config::AvatarConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Image-store collaborator
#[async_trait]
pub trait AvatarUploader: Send + Sync {
    /// Store `bytes` as the avatar of `user_id`, returning its public URL
    async fn upload(&self, user_id: Uuid, filename: &str, bytes: Vec<u8>) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
}

/// Digest used for upload signatures
///
/// Cloudinary verifies SHA-1 unless the account was switched to SHA-256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => bail!("unsupported signature algorithm: {other}"),
        }
    }
}

/// Cloudinary uploader
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: AvatarConfig,
    algorithm: SignatureAlgorithm,
}

impl CloudinaryUploader {
    pub fn new(config: AvatarConfig) -> Result<Self> {
        let algorithm = config.signature_algorithm.parse()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            algorithm,
        })
    }

    fn is_configured(&self) -> bool {
        !self.config.cloud_name.is_empty()
            && !self.config.api_key.is_empty()
            && !self.config.api_secret.is_empty()
    }

    /// Signature over the alphabetically sorted upload parameters
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        match self.algorithm {
            SignatureAlgorithm::Sha1 => digest_hex::<Sha1>(&joined, &self.config.api_secret),
            SignatureAlgorithm::Sha256 => digest_hex::<Sha256>(&joined, &self.config.api_secret),
        }
    }

    fn delivery_url(&self, public_id: &str) -> String {
        format!(
            "{}/{}/image/upload/c_fill,h_100,w_100/{}.jpg",
            self.config.delivery_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            public_id
        )
    }
}

fn digest_hex<D: Digest>(payload: &str, secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AvatarUploader for CloudinaryUploader {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, user_id: Uuid, filename: &str, bytes: Vec<u8>) -> Result<String> {
        if !self.is_configured() {
            bail!("image store credentials are not configured");
        }

        let folder = format!("user_avatars/{user_id}");
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder.as_str()), ("timestamp", timestamp.as_str())]);

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename.to_string()))
            .text("api_key", self.config.api_key.clone())
            .text("folder", folder)
            .text("timestamp", timestamp)
            .text("signature", signature);
        if self.algorithm == SignatureAlgorithm::Sha256 {
            form = form.text("signature_algorithm", "sha256");
        }

        let url = format!(
            "{}/{}/image/upload",
            self.config.upload_base_url.trim_end_matches('/'),
            self.config.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("image store request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("image store rejected upload (status={status}): {body}");
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .context("unexpected image store response")?;
        debug!(public_id = %uploaded.public_id, "avatar stored");

        Ok(self.delivery_url(&uploaded.public_id))
    }
}
