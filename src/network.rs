//! Network diagnostics: reachability, DNS, local interfaces, URL helpers
//! Author: kartik4091
//! Created: 2025-06-05

use std::collections::HashSet;
use std::io::{self, BufRead, BufReader};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::process::{Command, Stdio};
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::patterns::{is_valid_hostname, IPV4_PATTERN, IPV6_PATTERN};

/// Echo port; a refused connection still proves the host is up.
const PROBE_PORT: u16 = 7;

/// Parts of a parsed URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlComponents {
    pub scheme: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterfaceInfo {
    pub name: String,
    pub is_loopback: bool,
    pub addresses: Vec<IpAddr>,
}

pub fn is_valid_ipv4_address(ip: &str) -> bool {
    IPV4_PATTERN.is_match(ip)
}

pub fn is_valid_ipv6_address(ip: &str) -> bool {
    IPV6_PATTERN.is_match(ip)
}

pub fn is_valid_ip_address(ip: &str) -> bool {
    is_valid_ipv4_address(ip) || is_valid_ipv6_address(ip)
}

/// Appends url-encoded parameters, continuing an existing query string if present.
pub fn build_url_with_query_params<I, K, V>(base_url: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut result = String::from(base_url);
    let mut separator = if base_url.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        result.push(separator);
        result.extend(byte_serialize(key.as_ref().as_bytes()));
        result.push('=');
        result.extend(byte_serialize(value.as_ref().as_bytes()));
        separator = '&';
    }
    result
}

pub fn parse_url(url: &str) -> Result<UrlComponents> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    Ok(UrlComponents {
        scheme: parsed.scheme().to_string(),
        host: parsed.host_str().map(String::from),
        port: parsed.port(),
        path: parsed.path().to_string(),
        query: parsed.query().map(String::from),
        fragment: parsed.fragment().map(String::from),
    })
}

fn resolve(host: &str, port: u16) -> Vec<SocketAddr> {
    match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            debug!("Cannot resolve {}: {}", host, e);
            Vec::new()
        }
    }
}

/// True if any resolved address answers a TCP probe, even with a refusal.
#[instrument]
pub fn is_host_reachable(host: &str, timeout: Duration) -> bool {
    resolve(host, PROBE_PORT).iter().any(|addr| {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => true,
            Err(e) => {
                debug!("Probe of {} failed: {}", addr, e);
                false
            }
        }
    })
}

#[instrument]
pub fn is_port_open(host: &str, port: u16, timeout: Duration) -> bool {
    resolve(host, port)
        .iter()
        .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
}

/// Resolved addresses in resolver order, without duplicates.
#[instrument]
pub fn dns_lookup(host: &str) -> Result<Vec<IpAddr>> {
    if host.trim().is_empty() {
        return Err(Error::validation("Host cannot be empty"));
    }
    let resolved = ::dns_lookup::lookup_host(host)
        .map_err(|e| Error::network(format!("Cannot resolve {}: {}", host, e)))?;
    let mut seen = HashSet::new();
    Ok(resolved.into_iter().filter(|addr| seen.insert(*addr)).collect())
}

/// Host name for `ip`, or the address itself when no PTR record exists.
#[instrument]
pub fn reverse_dns_lookup(ip: &str) -> Result<String> {
    let addr: IpAddr = ip
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("Invalid IP address: {}", ip)))?;
    match ::dns_lookup::lookup_addr(&addr) {
        Ok(name) => Ok(name),
        Err(e) => {
            debug!("No reverse entry for {}: {}", addr, e);
            Ok(addr.to_string())
        }
    }
}

pub fn get_network_interface_info() -> Result<Vec<NetworkInterfaceInfo>> {
    let mut by_name: IndexMap<String, NetworkInterfaceInfo> = IndexMap::new();
    for iface in if_addrs::get_if_addrs()? {
        let is_loopback = iface.is_loopback();
        let ip = iface.ip();
        let entry = by_name
            .entry(iface.name.clone())
            .or_insert_with(|| NetworkInterfaceInfo {
                name: iface.name,
                is_loopback,
                addresses: Vec::new(),
            });
        entry.addresses.push(ip);
    }
    Ok(by_name.into_values().collect())
}

pub fn get_local_ip_addresses(include_loopback: bool) -> Result<Vec<IpAddr>> {
    Ok(if_addrs::get_if_addrs()?
        .into_iter()
        .filter(|iface| include_loopback || !iface.is_loopback())
        .map(|iface| iface.ip())
        .collect())
}

fn require_host(host: &str) -> Result<()> {
    let host = host.trim();
    if is_valid_ip_address(host) || is_valid_hostname(host) {
        Ok(())
    } else {
        Err(Error::validation(format!("Invalid host: {}", host)))
    }
}

/// Runs a diagnostic tool and captures stdout followed by `Exit Code: n`.
fn run_diagnostic(program: &str, args: &[String]) -> Result<String> {
    debug!("Running {} {:?}", program, args);
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let mut output = String::new();
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            output.push_str(&line?);
            output.push('\n');
        }
    }

    let status = child.wait()?;
    let code = status.code().unwrap_or(-1);
    if code != 0 {
        warn!("{} exited with {}", program, code);
    }
    output.push_str(&format!("Exit Code: {}", code));
    Ok(output)
}

#[instrument]
pub fn ping(host: &str, count: u32) -> Result<String> {
    require_host(host)?;
    if count == 0 {
        return Err(Error::validation("Ping count must be at least 1"));
    }
    let flag = if cfg!(windows) { "-n" } else { "-c" };
    run_diagnostic("ping", &[flag.to_string(), count.to_string(), host.trim().to_string()])
}

#[instrument]
pub fn traceroute(host: &str) -> Result<String> {
    require_host(host)?;
    let program = if cfg!(windows) { "tracert" } else { "traceroute" };
    run_diagnostic(program, &[host.trim().to_string()])
}

/// HTTP-based probes sharing one client and the configured timeouts
#[derive(Debug, Clone)]
pub struct NetworkTools {
    client: Client,
    config: NetworkConfig,
}

impl NetworkTools {
    pub fn new(config: NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn request(&self, method: Method, url: &str) -> Result<Response> {
        let url = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(self.client.request(method, url).send().await?)
    }

    async fn fetch(&self, url: &str) -> Result<Response> {
        let response = self.request(Method::GET, url).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    pub async fn get_public_ip_address(&self) -> Result<String> {
        let endpoint = self.config.public_ip_endpoint.clone();
        self.get_public_ip_address_from(&endpoint).await
    }

    /// Asks `endpoint` for the caller's address; the body must be a bare IP.
    #[instrument(skip(self))]
    pub async fn get_public_ip_address_from(&self, endpoint: &str) -> Result<String> {
        let body = self.fetch(endpoint).await?.text().await?;
        let ip = body.trim();
        if !is_valid_ip_address(ip) {
            return Err(Error::parse(format!("Unexpected public IP response: {}", ip)));
        }
        info!("Public IP address is {}", ip);
        Ok(ip.to_string())
    }

    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.fetch(url).await?.bytes().await?.to_vec())
    }

    /// Content-Type reported for a HEAD request, if any.
    pub async fn get_mime_type(&self, url: &str) -> Result<Option<String>> {
        let response = self.request(Method::HEAD, url).await?;
        Ok(response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned()))
    }

    pub async fn url_exists(&self, url: &str) -> bool {
        match self.request(Method::HEAD, url).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }

    pub async fn get_http_response_code(&self, url: &str) -> Result<u16> {
        Ok(self.request(Method::HEAD, url).await?.status().as_u16())
    }

    /// Response headers of a HEAD request, grouped by lower-case name.
    pub async fn get_http_headers(&self, url: &str) -> Result<IndexMap<String, Vec<String>>> {
        let response = self.request(Method::HEAD, url).await?;
        let mut headers: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        Ok(headers)
    }

    /// True as soon as one of the configured hosts answers.
    pub fn has_internet_connectivity(&self) -> bool {
        let timeout = Duration::from_millis(self.config.connectivity_timeout_ms);
        self.config
            .connectivity_hosts
            .iter()
            .any(|host| is_host_reachable(host, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use mockito::mock;
    use std::net::TcpListener;

    fn tools() -> NetworkTools {
        NetworkTools::new(NetworkConfig::default()).unwrap()
    }

    fn url(path: &str) -> String {
        format!("{}{}", mockito::server_url(), path)
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_ipv4_address("10.0.0.1"));
        assert!(!is_valid_ipv4_address("10.0.0.256"));
        assert!(is_valid_ipv6_address("::1"));
        assert!(is_valid_ip_address("fe80::1%eth0"));
        assert!(!is_valid_ip_address("example.com"));
    }

    #[test]
    fn test_build_url_with_query_params() {
        let params = vec![("q", "rust lang"), ("page", "2")];
        assert_eq!(
            build_url_with_query_params("https://example.com/search", params.clone()),
            "https://example.com/search?q=rust+lang&page=2"
        );
        assert_eq!(
            build_url_with_query_params("https://example.com/search?lang=en", params),
            "https://example.com/search?lang=en&q=rust+lang&page=2"
        );
        let empty: Vec<(&str, &str)> = Vec::new();
        assert_eq!(build_url_with_query_params("https://example.com", empty), "https://example.com");
        assert_eq!(
            build_url_with_query_params("http://h", [("a&b", "c=d")]),
            "http://h?a%26b=c%3Dd"
        );
    }

    #[test]
    fn test_parse_url() {
        let parts = parse_url("https://user@example.com:8443/a/b?x=1&y=2#top").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.host.as_deref(), Some("example.com"));
        assert_eq!(parts.port, Some(8443));
        assert_eq!(parts.path, "/a/b");
        assert_eq!(parts.query.as_deref(), Some("x=1&y=2"));
        assert_eq!(parts.fragment.as_deref(), Some("top"));

        let plain = parse_url("http://example.com").unwrap();
        assert_eq!(plain.port, None);
        assert_eq!(plain.path, "/");

        assert_eq!(parse_url("no scheme here").unwrap_err().kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_port_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(is_port_open("127.0.0.1", port, Duration::from_secs(1)));
        drop(listener);
        assert!(!is_port_open("127.0.0.1", port, Duration::from_millis(500)));
        assert!(!is_port_open("host.invalid", 80, Duration::from_millis(200)));
    }

    #[test]
    fn test_loopback_is_reachable() {
        assert!(is_host_reachable("127.0.0.1", Duration::from_secs(1)));
        assert!(!is_host_reachable("host.invalid", Duration::from_millis(200)));
    }

    #[test]
    fn test_dns() {
        assert!(!dns_lookup("localhost").unwrap().is_empty());
        assert!(dns_lookup("").is_err());
        assert!(!reverse_dns_lookup("127.0.0.1").unwrap().is_empty());
        assert_eq!(reverse_dns_lookup("999.1.1.1").unwrap_err().kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_interfaces() {
        let without = get_local_ip_addresses(false).unwrap();
        assert!(without.iter().all(|ip| !ip.is_loopback()));
        for iface in get_network_interface_info().unwrap() {
            assert!(!iface.name.is_empty());
            assert!(!iface.addresses.is_empty());
        }
    }

    #[test]
    fn test_diagnostics_reject_bad_hosts() {
        assert_eq!(ping("bad host; rm -rf /", 1).unwrap_err().kind(), ErrorKind::ValidationFailure);
        assert_eq!(ping("127.0.0.1", 0).unwrap_err().kind(), ErrorKind::ValidationFailure);
        assert!(traceroute("-invalid-").is_err());
    }

    #[tokio::test]
    async fn test_head_probes() {
        let _m = mock("HEAD", "/net/doc.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_header("x-extra", "1")
            .create();
        let _missing = mock("HEAD", "/net/missing").with_status(404).create();

        let tools = tools();
        assert!(tools.url_exists(&url("/net/doc.pdf")).await);
        assert!(!tools.url_exists(&url("/net/missing")).await);
        assert!(!tools.url_exists("not a url").await);
        assert_eq!(tools.get_http_response_code(&url("/net/missing")).await.unwrap(), 404);
        assert_eq!(
            tools.get_mime_type(&url("/net/doc.pdf")).await.unwrap().as_deref(),
            Some("application/pdf")
        );
        let headers = tools.get_http_headers(&url("/net/doc.pdf")).await.unwrap();
        assert_eq!(headers.get("x-extra"), Some(&vec!["1".to_string()]));
    }

    #[tokio::test]
    async fn test_public_ip_and_download() {
        let _ip = mock("GET", "/net/ip").with_status(200).with_body("203.0.113.7\n").create();
        let _junk = mock("GET", "/net/ip-junk").with_status(200).with_body("<html>").create();
        let _blob = mock("GET", "/net/blob").with_status(200).with_body(vec![1u8, 2, 3]).create();
        let _err = mock("GET", "/net/err").with_status(503).create();

        let tools = tools();
        assert_eq!(tools.get_public_ip_address_from(&url("/net/ip")).await.unwrap(), "203.0.113.7");
        assert_eq!(
            tools.get_public_ip_address_from(&url("/net/ip-junk")).await.unwrap_err().kind(),
            ErrorKind::ParseFailure
        );
        assert_eq!(tools.download_bytes(&url("/net/blob")).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            tools.download_bytes(&url("/net/err")).await.unwrap_err().kind(),
            ErrorKind::NetworkFailure
        );
    }

    #[test]
    fn test_connectivity_uses_configured_hosts() {
        let mut config = NetworkConfig::default();
        config.connectivity_hosts = vec!["127.0.0.1".into()];
        config.connectivity_timeout_ms = 500;
        assert!(NetworkTools::new(config.clone()).unwrap().has_internet_connectivity());

        config.connectivity_hosts.clear();
        assert!(!NetworkTools::new(config).unwrap().has_internet_connectivity());
    }
}
