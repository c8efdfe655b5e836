use anyhow::Result;
use reqwest::{header, Client};
use serde::Deserialize;
use url::Url;

use super::MirrorClient;
use crate::config::Config;
use crate::error::MirrorError;
use crate::tok_id::TokId;

pub struct TikwmMirror {
    client: Client,
    base: Box<str>,
}

impl TikwmMirror {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        // Fail early on a base that can never produce a valid endpoint
        Url::parse(&config.mirror_base)?;
        Ok(Self::with_client(client, &config.mirror_base))
    }

    pub fn with_client(client: Client, base: &str) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').into(),
        }
    }

    fn endpoint(&self, id: &TokId) -> Result<Url, MirrorError> {
        Url::parse(&format!("{}/video/media/hdplay/{}.mp4", self.base, id))
            .map_err(|_| MirrorError::BadUrl)
    }
}

impl MirrorClient for TikwmMirror {
    async fn hd_source(&self, id: &TokId) -> Result<Url, MirrorError> {
        #[derive(Deserialize, Debug)]
        struct Response {
            url: Option<Box<str>>,
        }

        let endpoint = self.endpoint(id)?;
        let response = self.client.get(endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status(status.as_u16()));
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.starts_with("application/json"));
        if !is_json {
            // Redirected straight to the video
            return Ok(response.url().clone());
        }

        let body = response.bytes().await?;
        let url = serde_json::from_slice::<Response>(&body)
            .map_err(|_| MirrorError::Body)?
            .url
            .ok_or(MirrorError::Body)?;
        Url::parse(&url).map_err(|_| MirrorError::BadUrl)
    }
}
