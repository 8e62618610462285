use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response, Url};
use tracing::debug;

use crate::config::Config;
use crate::models::TemplateEntry;

/// Contents listing of the upstream template repository, relative to the API base.
const CONTENTS_PATH: &str = "repos/github/gitignore/contents";

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// The two remote reads the generator needs.
pub trait TemplateSource {
    /// Fetches the metadata of every entry in the template repository.
    async fn fetch_directory(&self) -> Result<Vec<TemplateEntry>>;

    /// Fetches the unprocessed bytes behind a download locator.
    async fn fetch_raw(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Talks to the GitHub REST API.
pub struct ApiClient {
    client: reqwest::Client,
    config: Config,
}

impl ApiClient {
    /// Builds the HTTP client. No timeouts are set.
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gh-gitignore"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Attaches the token, but only for requests to the API host itself.
    fn authorize(&self, request: RequestBuilder, url: &Url) -> RequestBuilder {
        match &self.config.token {
            Some(token) if same_origin(url, &self.config.api_url) => {
                request.header(AUTHORIZATION, format!("token {token}"))
            }
            _ => request,
        }
    }
}

impl TemplateSource for ApiClient {
    async fn fetch_directory(&self) -> Result<Vec<TemplateEntry>> {
        let url = self.config.api_url.join(CONTENTS_PATH)?;
        debug!(%url, "fetching template listing");

        let request = self.client.get(url.clone()).header(ACCEPT, JSON_MEDIA_TYPE);
        let response = self
            .authorize(request, &url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let response = check_status(response)?;

        let entries: Vec<TemplateEntry> = response
            .json()
            .await
            .context("malformed template listing")?;
        debug!(count = entries.len(), "received template listing");
        Ok(entries)
    }

    async fn fetch_raw(&self, locator: &str) -> Result<Vec<u8>> {
        let url =
            Url::parse(locator).with_context(|| format!("invalid download URL '{locator}'"))?;
        debug!(%url, "fetching raw template");

        let request = self.client.get(url.clone()).header(ACCEPT, RAW_MEDIA_TYPE);
        let response = self
            .authorize(request, &url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let response = check_status(response)?;

        let body = response.bytes().await.context("reading response body")?;
        debug!(bytes = body.len(), "received raw template");
        Ok(body.to_vec())
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("GitHub API error: {} ({})", status, response.url()));
    }
    Ok(response)
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves a single canned HTTP response and hands back the raw request.
    async fn serve_once(status: &str, body: &str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (Url::parse(&format!("http://{addr}/")).unwrap(), handle)
    }

    fn client(api_url: Url, token: Option<&str>) -> ApiClient {
        ApiClient::new(Config {
            api_url,
            token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_directory_parses_listing_and_sends_token() {
        let body = r#"[{"name":"Go.gitignore","path":"Go.gitignore","download_url":"https://example.com/Go.gitignore"}]"#;
        let (base, server) = serve_once("200 OK", body).await;

        let entries = client(base, Some("secret")).fetch_directory().await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Go.gitignore");
        assert!(request.starts_with("get /repos/github/gitignore/contents "));
        assert!(request.contains("authorization: token secret"));
        assert!(request.contains("accept: application/vnd.github+json"));
        assert!(request.contains("user-agent: gh-gitignore"));
    }

    #[tokio::test]
    async fn fetch_directory_reports_http_status() {
        let (base, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#).await;

        let err = client(base, None).fetch_directory().await.unwrap_err();
        server.await.unwrap();

        assert!(format!("{err:#}").contains("404"));
    }

    #[tokio::test]
    async fn fetch_directory_rejects_malformed_body() {
        let (base, server) = serve_once("200 OK", "{not json").await;

        let err = client(base, None).fetch_directory().await.unwrap_err();
        server.await.unwrap();

        assert!(format!("{err:#}").contains("malformed template listing"));
    }

    #[tokio::test]
    async fn fetch_raw_asks_for_raw_media_type_without_leaking_token() {
        let (download, server) = serve_once("200 OK", "bin/\n*.o\n").await;
        let api_url = Url::parse("http://127.0.0.1:1/").unwrap();

        let bytes = client(api_url, Some("secret"))
            .fetch_raw(download.join("Go.gitignore").unwrap().as_str())
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(bytes, b"bin/\n*.o\n");
        assert!(request.starts_with("get /go.gitignore "));
        assert!(request.contains("accept: application/vnd.github.v3.raw"));
        assert!(!request.contains("authorization"));
    }

    #[tokio::test]
    async fn fetch_raw_reports_http_status() {
        let (download, server) = serve_once("500 Internal Server Error", "oops").await;
        let api_url = Url::parse("http://127.0.0.1:1/").unwrap();

        let err = client(api_url, None)
            .fetch_raw(download.join("Go.gitignore").unwrap().as_str())
            .await
            .unwrap_err();
        server.await.unwrap();

        let msg = format!("{err:#}");
        assert!(msg.contains("GitHub API error: 500"));
        assert!(msg.contains("/Go.gitignore"));
    }

    #[tokio::test]
    async fn fetch_raw_rejects_unparseable_locator() {
        let api_url = Url::parse("https://api.github.com/").unwrap();
        let err = client(api_url, None).fetch_raw("::nope").await.unwrap_err();
        assert!(err.to_string().contains("invalid download URL"));
    }

    #[test]
    fn same_origin_compares_scheme_host_and_port() {
        let api = Url::parse("https://api.github.com/").unwrap();
        assert!(same_origin(&Url::parse("https://api.github.com:443/x").unwrap(), &api));
        assert!(!same_origin(&Url::parse("https://raw.githubusercontent.com/x").unwrap(), &api));
        assert!(!same_origin(&Url::parse("http://api.github.com/x").unwrap(), &api));
    }
}
