use std::collections::HashMap;

use mockito::{mock, Matcher};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utilkit::config::{HttpConfig, ToolkitConfig};
use utilkit::error::ErrorKind;
use utilkit::jwt::TokenService;
use utilkit::{BlockingHttpClient, Headers, HttpClient};

use crate::fixtures::TestFixtures;

#[derive(Debug, Serialize)]
struct NewNote<'a> {
    title: &'a str,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Note {
    id: u32,
    title: String,
}

fn url(path: &str) -> String {
    format!("{}{}", mockito::server_url(), path)
}

fn bearer_headers(service: &TokenService, subject: &str) -> Headers {
    let token = service.issue_access_token(subject, &TestFixtures::claims()).unwrap();
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), service.authorization_header(&token).unwrap());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authorized_json_post() {
        let config = ToolkitConfig::load(&TestFixtures::sample_config_path()).unwrap();
        let service = TokenService::new(TestFixtures::SECRET, config.jwt.clone()).unwrap();
        let headers = bearer_headers(&service, "ada");

        let m = mock("POST", "/it/notes")
            .match_header("authorization", Matcher::Regex(r"^Bearer [\w-]+\.[\w-]+\.[\w-]+$".into()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"title": "first"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "title": "first"}"#)
            .create();

        let client = HttpClient::with_config(config.http.clone()).unwrap();
        let note: Note = client
            .post_json(&url("/it/notes"), &NewNote { title: "first" }, &headers)
            .await
            .unwrap();

        assert_eq!(note, Note { id: 1, title: "first".into() });
        m.assert();
    }

    #[tokio::test]
    async fn test_header_token_round_trips_through_service() {
        let service = TokenService::new(TestFixtures::SECRET, Default::default()).unwrap();
        let headers = bearer_headers(&service, "grace");
        let header = headers.get("Authorization").unwrap();

        let token = service.token_from_header(header).unwrap();
        assert!(service.validate(&token).is_valid());
        let claims = service.claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("grace"));
        assert_eq!(claims.get("tenant"), Some(json!("acme")));
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status_and_body() {
        let m = mock("DELETE", "/it/notes/9")
            .with_status(503)
            .with_body("maintenance")
            .create();

        let client = HttpClient::new().unwrap();
        let err = client.delete(&url("/it/notes/9")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(err.to_string().contains("503"));
        m.assert();
    }

    #[tokio::test]
    async fn test_download_reports_progress() {
        let payload = "x".repeat(4096);
        let m = mock("GET", "/it/files/report.txt")
            .with_status(200)
            .with_body(&payload)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("downloads/report.txt");
        let mut seen = Vec::new();

        let client = HttpClient::new().unwrap();
        let written = client
            .download_file_with_progress(&url("/it/files/report.txt"), &dest, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(written, 4096);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), payload);
        assert_eq!(seen.last().copied(), Some(1.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        m.assert();
    }

    #[test]
    fn test_blocking_client_put_and_get() {
        let put = mock("PUT", "/it/blocking/notes/2")
            .match_body(Matcher::Json(json!({"title": "second"})))
            .with_status(200)
            .with_body(r#"{"id": 2, "title": "second"}"#)
            .create();
        let get = mock("GET", "/it/blocking/notes/2")
            .match_header("x-trace", "abc")
            .with_status(200)
            .with_body(r#"{"id": 2, "title": "second"}"#)
            .create();

        let config = HttpConfig {
            timeout_ms: 5_000,
            ..HttpConfig::default()
        };
        let client = BlockingHttpClient::with_config(config).unwrap();

        let updated: Note = client
            .put_json(&url("/it/blocking/notes/2"), &NewNote { title: "second" }, &Headers::new())
            .unwrap();
        assert_eq!(updated.id, 2);

        let mut headers = Headers::new();
        headers.insert("X-Trace".into(), "abc".into());
        let fetched: Note = client.get_json(&url("/it/blocking/notes/2"), &headers).unwrap();
        assert_eq!(fetched, updated);

        put.assert();
        get.assert();
    }

    #[test]
    fn test_async_client_from_sync_context() {
        let m = mock("PATCH", "/it/sync/notes/3")
            .match_body("raw body")
            .with_status(200)
            .with_body("patched")
            .create();

        let client = HttpClient::new().unwrap();
        let body = tokio_test::block_on(client.patch(&url("/it/sync/notes/3"), "raw body")).unwrap();

        assert_eq!(body, "patched");
        m.assert();
    }

    #[test]
    fn test_invalid_url_is_rejected_before_sending() {
        let client = BlockingHttpClient::new().unwrap();
        let err = client.get("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }
}
