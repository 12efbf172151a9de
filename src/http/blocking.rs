//! Synchronous HTTP client
//!
//! Must not be constructed or used from inside an async runtime.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::request::{check_status, decode, encode_body, ensure_parent_dir, header_map, parse_url, redirect_policy};
use super::Headers;
use crate::config::HttpConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct BlockingHttpClient {
    client: Client,
    config: HttpConfig,
}

impl BlockingHttpClient {
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
    fn send(&self, method: Method, url: &str, headers: &Headers, body: Option<String>) -> Result<String> {
        let url = parse_url(url)?;
        let content_type = body.as_ref().map(|_| self.config.default_content_type.as_str());
        let mut request = self
            .client
            .request(method, url)
            .headers(header_map(headers, content_type)?);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        debug!("Received {} ({} bytes)", status, text.len());
        check_status(status, text)
    }

    pub fn get(&self, url: &str) -> Result<String> {
        self.get_with_headers(url, &Headers::new())
    }

    pub fn get_with_headers(&self, url: &str, headers: &Headers) -> Result<String> {
        self.send(Method::GET, url, headers, None)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        decode(&self.get_with_headers(url, headers)?)
    }

    pub fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.post_with_headers(url, body, &Headers::new())
    }

    pub fn post_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::POST, url, headers, Some(encode_body(body)?))
    }

    pub fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B, headers: &Headers) -> Result<T> {
        decode(&self.post_with_headers(url, body, headers)?)
    }

    pub fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.put_with_headers(url, body, &Headers::new())
    }

    pub fn put_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::PUT, url, headers, Some(encode_body(body)?))
    }

    pub fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B, headers: &Headers) -> Result<T> {
        decode(&self.put_with_headers(url, body, headers)?)
    }

    pub fn delete(&self, url: &str) -> Result<String> {
        self.delete_with_headers(url, &Headers::new())
    }

    pub fn delete_with_headers(&self, url: &str, headers: &Headers) -> Result<String> {
        self.send(Method::DELETE, url, headers, None)
    }

    pub fn delete_json<T: DeserializeOwned>(&self, url: &str, headers: &Headers) -> Result<T> {
        decode(&self.delete_with_headers(url, headers)?)
    }

    pub fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        self.patch_with_headers(url, body, &Headers::new())
    }

    pub fn patch_with_headers<B: Serialize + ?Sized>(&self, url: &str, body: &B, headers: &Headers) -> Result<String> {
        self.send(Method::PATCH, url, headers, Some(encode_body(body)?))
    }

    pub fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &str, body: &B, headers: &Headers) -> Result<T> {
        decode(&self.patch_with_headers(url, body, headers)?)
    }

    /// Saves the response body to `dest`, creating parent directories.
    #[instrument(skip(self))]
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let url = parse_url(url)?;
        let mut response = self
            .client
            .get(url)
            .timeout(self.config.download_timeout())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        ensure_parent_dir(dest)?;
        let mut writer = BufWriter::new(File::create(dest)?);
        let written = response.copy_to(&mut writer)?;
        writer.flush()?;

        info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
