//! Async HTTP client over reqwest

use std::path::Path;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::request::{check_status, decode, encode_body, ensure_parent_dir, header_map, parse_url, redirect_policy};
use super::Headers;
use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Future-based client; cheap to clone
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .redirect(redirect_policy(&config));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    #[instrument(skip(self, headers, body))]
    async fn send(&self, method: Method, url: &str, headers: &Headers, body: Option<String>) -> Result<String> {
        let url = parse_url(url)?;
        let content_type = body.as_ref().map(|_| self.config.default_content_type.as_str());
        let mut request = self
            .client
            .request(method, url)
            .headers(header_map(headers, content_type)?);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Received {} ({} bytes)", status, text.len());
        check_status(status, text)
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_with_headers(url, &Headers::new()).await
    }

    pub async fn get_with_headers(&self, url: &str, headers: &Headers) -> Result<String> {
        self.send(Method::GET, url, headers, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        decode(&self.get_with_headers(url, headers).await?)
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.post_with_headers(url, body, &Headers::new()).await
    }

    pub async fn post_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::POST, url, headers, Some(encode_body(body)?)).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        headers: &Headers,
    ) -> Result<T> {
        decode(&self.post_with_headers(url, body, headers).await?)
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.put_with_headers(url, body, &Headers::new()).await
    }

    pub async fn put_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::PUT, url, headers, Some(encode_body(body)?)).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        headers: &Headers,
    ) -> Result<T> {
        decode(&self.put_with_headers(url, body, headers).await?)
    }

    pub async fn delete(&self, url: &str) -> Result<String> {
        self.delete_with_headers(url, &Headers::new()).await
    }

    pub async fn delete_with_headers(&self, url: &str, headers: &Headers) -> Result<String> {
        self.send(Method::DELETE, url, headers, None).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        decode(&self.delete_with_headers(url, headers).await?)
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.patch_with_headers(url, body, &Headers::new()).await
    }

    pub async fn patch_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::PATCH, url, headers, Some(encode_body(body)?)).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        headers: &Headers,
    ) -> Result<T> {
        decode(&self.patch_with_headers(url, body, headers).await?)
    }

    /// Saves the response body to `dest` and returns the byte count.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        self.download_file_with_progress(url, dest, |_| {}).await
    }

    /// Streams the body to `dest`, reporting progress in `0.0..=1.0`.
    /// Without a Content-Length only the final `1.0` is reported.
    #[instrument(skip(self, progress))]
    pub async fn download_file_with_progress<F>(&self, url: &str, dest: &Path, mut progress: F) -> Result<u64>
    where
        F: FnMut(f64),
    {
        let url = parse_url(url)?;
        let mut response = self
            .client
            .get(url)
            .timeout(self.config.download_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        ensure_parent_dir(dest)?;
        let expected = response.content_length().filter(|len| *len > 0);
        let mut file = File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(total) = expected {
                progress((written as f64 / total as f64).min(1.0));
            }
        }
        file.flush().await?;
        progress(1.0);

        info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
