//! Request preparation shared by the async and blocking clients

use std::fs;
use std::path::Path;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::Headers;
use crate::config::HttpConfig;
use crate::error::{Error, Result};

const MAX_REDIRECTS: usize = 10;

pub(crate) fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
}

pub(crate) fn redirect_policy(config: &HttpConfig) -> Policy {
    if config.follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    }
}

/// A body that serialises to a JSON string is sent as-is.
pub(crate) fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String> {
    match serde_json::to_value(body)? {
        Value::String(raw) => Ok(raw),
        other => Ok(serde_json::to_string(&other)?),
    }
}

pub(crate) fn has_content_type(headers: &Headers) -> bool {
    headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
}

/// Converts caller headers, adding `default_content_type` when a body is sent without one.
pub(crate) fn header_map(headers: &Headers, default_content_type: Option<&str>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::validation(format!("Invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::validation(format!("Invalid value for header {}", name)))?;
        map.insert(name, value);
    }
    if let Some(content_type) = default_content_type.filter(|_| !has_content_type(headers)) {
        let value = HeaderValue::from_str(content_type)
            .map_err(|_| Error::validation(format!("Invalid content type: {}", content_type)))?;
        map.insert(CONTENT_TYPE, value);
    }
    Ok(map)
}

pub(crate) fn check_status(status: StatusCode, body: String) -> Result<String> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::parse(format!("Failed to deserialize response: {}", e)))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_string_bodies_are_sent_raw() {
        assert_eq!(encode_body("plain text").unwrap(), "plain text");
        assert_eq!(encode_body(&json!({"a": 1})).unwrap(), r#"{"a":1}"#);
        assert_eq!(encode_body(&vec![1, 2]).unwrap(), "[1,2]");
    }

    #[test]
    fn test_content_type_defaults_once() {
        let mut headers = Headers::new();
        headers.insert("X-Trace".into(), "abc".into());
        let map = header_map(&headers, Some("application/json")).unwrap();
        assert_eq!(map[CONTENT_TYPE], "application/json");
        assert_eq!(map["x-trace"], "abc");

        headers.insert("content-TYPE".into(), "text/plain".into());
        let map = header_map(&headers, Some("application/json")).unwrap();
        assert_eq!(map[CONTENT_TYPE], "text/plain");
        assert_eq!(map.get_all(CONTENT_TYPE).iter().count(), 1);

        assert!(header_map(&Headers::new(), None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(parse_url("not a url").unwrap_err().kind(), ErrorKind::ValidationFailure);
        let mut headers = Headers::new();
        headers.insert("bad header".into(), "x".into());
        assert!(header_map(&headers, None).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(check_status(StatusCode::CREATED, "ok".into()).unwrap(), "ok");
        let err = check_status(StatusCode::NOT_FOUND, "missing".into()).unwrap_err();
        assert_eq!(err.to_string(), "HTTP Error: 404 - missing");
        assert_eq!(decode::<u32>("nope").unwrap_err().kind(), ErrorKind::ParseFailure);
    }
}
