//! REST client for the platform API.
//!
//! Every payload comes wrapped: single objects as `{"response": ...}`, lists
//! as `{"response": [...], "pagination": {...}}`. Errors carry
//! `{"error": ..., "error_description": ...}`. [`ApiClient`] unwraps both and
//! implements the engine's source traits so the poller and the build wait can
//! run against the live API.

use std::time::Duration;

use cx_core::resolve::find_stack;
use cx_core::{
    ActionRequest, ActionStatusSource, ActionSubmitter, CoreError, CoreResult, StackStatusSource,
};
use cx_proto::{
    ActionId, ApiErrorBody, AsyncAction, Backup, Container, Envelope, Job, PagedEnvelope,
    ResourceRef, Server, Service, Stack,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::config::Settings;
use crate::error::CliError;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on pages fetched for one listing.
const DEFAULT_MAX_PAGES: u32 = 100;

/// Options for a new stack.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewStack {
    /// Stack name.
    pub name: String,
    /// Environment.
    pub environment: String,
    /// Service definition, as YAML text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_yaml: Option<String>,
    /// Manifest, as YAML text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_yaml: Option<String>,
}

/// Platform API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    max_pages: u32,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, CliError> {
        Self::with_timeout(settings, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(settings: &Settings, request_timeout: Duration) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cx/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| CliError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base: settings.api_url.clone(),
            token: settings.token.clone(),
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Refuse listings longer than `max_pages` pages.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Base URL requests are made against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, CliError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| CliError::Config(format!("API URL '{}' cannot take a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CliError> {
        let request = request.bearer_auth(&self.token).build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %url, "Sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        trace!(%method, url = %url, status = status.as_u16(), "Received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| CliError::Format(format!("unexpected response from {url}: {e}")))
    }

    async fn get<T: DeserializeOwned, S: AsRef<str>>(&self, path: &[S]) -> Result<T, CliError> {
        let envelope: Envelope<T> = self.send(self.http.get(self.url(path)?)).await?;
        Ok(envelope.response)
    }

    async fn post<B, T, S>(&self, path: &[S], body: &B) -> Result<T, CliError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        let envelope: Envelope<T> = self.send(self.http.post(self.url(path)?).json(body)).await?;
        Ok(envelope.response)
    }

    /// Fetch every page of a listing.
    ///
    /// A listing that cannot be read in full is an error, never a shorter
    /// list: name resolution runs over the result.
    async fn get_paged<T: DeserializeOwned, S: AsRef<str>>(
        &self,
        path: &[S],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, CliError> {
        let url = self.url(path)?;
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let request = self
                .http
                .get(url.clone())
                .query(query)
                .query(&[("page", page)]);
            let envelope: PagedEnvelope<T> = self.send(request).await?;
            let next_page = envelope.next_page();
            items.extend(envelope.response);
            match next_page {
                None => break,
                Some(next) if next <= page => {
                    return Err(CliError::Format(format!(
                        "listing {url} points back from page {page} to page {next}"
                    )));
                }
                Some(next) if next > self.max_pages => {
                    return Err(CliError::Format(format!(
                        "listing {url} exceeds {} pages",
                        self.max_pages
                    )));
                }
                Some(next) => page = next,
            }
        }
        debug!(url = %url, pages = page, items = items.len(), "Listing complete");
        Ok(items)
    }

    /// List all stacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_stacks(&self) -> Result<Vec<Stack>, CliError> {
        self.get_paged(&["stacks"], &[]).await
    }

    /// Fetch one stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_stack(&self, uid: &str) -> Result<Stack, CliError> {
        self.get(&ResourceRef::stack(uid).segments()[..]).await
    }

    /// Resolve a stack by name, optionally within one environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails or the name does not resolve.
    pub async fn find_stack(&self, name: &str, environment: Option<&str>) -> Result<Stack, CliError> {
        let stacks = self.list_stacks().await?;
        let stack = find_stack(&stacks, name, environment, false)?;
        debug!(name, uid = %stack.uid, environment = %stack.environment, "Resolved stack");
        Ok(stack.clone())
    }

    /// Create a stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_stack(&self, new_stack: &NewStack) -> Result<Stack, CliError> {
        self.post(&["stacks"], new_stack).await
    }

    /// List the servers of a stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_servers(&self, stack_uid: &str) -> Result<Vec<Server>, CliError> {
        self.get_paged(&["stacks", stack_uid, "servers"], &[]).await
    }

    /// List the containers of a stack, optionally on one server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_containers(
        &self,
        stack_uid: &str,
        server_uid: Option<&str>,
    ) -> Result<Vec<Container>, CliError> {
        let query: Vec<(&str, &str)> = server_uid.map(|uid| ("server_uid", uid)).into_iter().collect();
        self.get_paged(&["stacks", stack_uid, "containers"], &query).await
    }

    /// List the services of a stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_services(&self, stack_uid: &str) -> Result<Vec<Service>, CliError> {
        self.get_paged(&["stacks", stack_uid, "services"], &[]).await
    }

    /// List the backups of a stack, optionally of one database type.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_backups(
        &self,
        stack_uid: &str,
        db_type: Option<&str>,
    ) -> Result<Vec<Backup>, CliError> {
        let query: Vec<(&str, &str)> = db_type.map(|t| ("db_type", t)).into_iter().collect();
        self.get_paged(&["stacks", stack_uid, "backups"], &query).await
    }

    /// List the jobs of a stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_jobs(&self, stack_uid: &str) -> Result<Vec<Job>, CliError> {
        self.get_paged(&["stacks", stack_uid, "jobs"], &[]).await
    }

    /// Submit an action.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn submit(&self, request: &ActionRequest) -> Result<AsyncAction, CliError> {
        let mut body = Map::new();
        body.insert("command".into(), Value::from(request.kind.command()));
        body.extend(request.params.clone());
        self.post(&request.resource.action_segments()[..], &body).await
    }

    /// Fetch the current state of an action.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_action(
        &self,
        resource: &ResourceRef,
        id: ActionId,
    ) -> Result<AsyncAction, CliError> {
        let mut path = resource.action_segments();
        path.push(id.to_string());
        self.get(&path[..]).await
    }
}

fn api_error(status: StatusCode, body: &str) -> CliError {
    let message = serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        },
        |err| err.message().to_string(),
    );
    CliError::Api {
        status: status.as_u16(),
        message,
    }
}

impl ActionSubmitter for ApiClient {
    async fn submit_action(&self, request: &ActionRequest) -> CoreResult<AsyncAction> {
        self.submit(request).await.map_err(CoreError::transport)
    }
}

impl ActionStatusSource for ApiClient {
    async fn fetch_action(&self, resource: &ResourceRef, id: ActionId) -> CoreResult<AsyncAction> {
        self.get_action(resource, id).await.map_err(CoreError::transport)
    }
}

impl StackStatusSource for ApiClient {
    async fn fetch_stack(&self, uid: &str) -> CoreResult<Stack> {
        self.get_stack(uid).await.map_err(CoreError::transport)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::parse_api_url;
    use cx_core::ActionKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve one canned response per connection, returning the raw requests.
    pub(crate) async fn canned_server(responses: Vec<(u16, String)>) -> (ApiClient, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.expect("accept");
                requests.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.expect("write");
                let _ = socket.shutdown().await;
            }
            requests
        });
        let settings = Settings {
            api_url: parse_api_url(&format!("http://{addr}/api/3")).expect("url"),
            token: "secret".into(),
        };
        (ApiClient::new(&settings).expect("client"), handle)
    }

    pub(crate) fn stack_json(uid: &str, name: &str, env: &str) -> String {
        format!(r#"{{"uid":"{uid}","name":"{name}","environment":"{env}","status":1,"health":3}}"#)
    }

    #[tokio::test]
    async fn lists_stacks_across_pages() {
        let page1 = format!(
            r#"{{"response":[{}],"pagination":{{"previous":null,"next":2,"current":1,"per_page":1,"count":2,"pages":2}}}}"#,
            stack_json("s-1", "shop", "staging")
        );
        let page2 = format!(
            r#"{{"response":[{}],"pagination":{{"previous":1,"next":null,"current":2,"per_page":1,"count":2,"pages":2}}}}"#,
            stack_json("s-2", "blog", "production")
        );
        let (client, server) = canned_server(vec![(200, page1), (200, page2)]).await;

        let stacks = client.list_stacks().await.expect("stacks");
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[1].name, "blog");

        let requests = server.await.expect("server");
        assert!(requests[0].starts_with("GET /api/3/stacks?page=1 "));
        assert!(requests[1].starts_with("GET /api/3/stacks?page=2 "));
        assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer secret"));
        assert!(requests[0].to_ascii_lowercase().contains("user-agent: cx/"));
    }

    fn linked_page(uid: &str, page: u32) -> String {
        format!(
            r#"{{"response":[{}],"pagination":{{"previous":null,"next":{},"current":{page},"per_page":1,"count":500,"pages":500}}}}"#,
            stack_json(uid, uid, "staging"),
            page + 1
        )
    }

    #[tokio::test]
    async fn listing_beyond_page_limit_is_an_error() {
        let pages = (1..=2).map(|n| (200, linked_page(&format!("s-{n}"), n))).collect();
        let (client, server) = canned_server(pages).await;
        let client = client.with_max_pages(2);

        let err = client.list_stacks().await.expect_err("truncated listing");
        assert!(matches!(err, CliError::Format(ref m) if m.contains("exceeds 2 pages")));
        assert_eq!(server.await.expect("server").len(), 2);
    }

    #[tokio::test]
    async fn listing_beyond_default_page_limit_is_an_error() {
        let pages = (1..=100).map(|n| (200, linked_page(&format!("s-{n}"), n))).collect();
        let (client, server) = canned_server(pages).await;

        let err = client.list_servers("s-1").await.expect_err("101 pages offered");
        assert!(matches!(err, CliError::Format(ref m) if m.contains("exceeds 100 pages")));
        assert_eq!(server.await.expect("server").len(), 100);
    }

    #[tokio::test]
    async fn listing_pointing_backwards_is_an_error() {
        let page = format!(
            r#"{{"response":[{}],"pagination":{{"next":1,"current":1}}}}"#,
            stack_json("s-1", "shop", "staging")
        );
        let (client, server) = canned_server(vec![(200, page)]).await;

        let err = client.list_stacks().await.expect_err("loop");
        assert!(matches!(err, CliError::Format(_)));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn identifiers_are_percent_encoded() {
        let reply = r#"{"response":{"id":8,"resource_type":"service","resource_id":"web/admin?x#y","action":"service_restart","started_at":"2026-01-01T00:00:00Z"}}"#;
        let (client, server) = canned_server(vec![(200, reply.to_string())]).await;

        let request = ActionRequest::new(
            ResourceRef::service("s-1", "web/admin?x#y"),
            ActionKind::ServiceRestart,
        );
        client.submit(&request).await.expect("submitted");

        let requests = server.await.expect("server");
        assert!(
            requests[0].starts_with("POST /api/3/stacks/s-1/services/web%2Fadmin%3Fx%23y/actions "),
            "request was {}",
            requests[0]
        );
    }

    #[tokio::test]
    async fn submit_posts_command_and_params() {
        let reply = r#"{"response":{"id":7,"resource_type":"service","resource_id":"web","action":"service_scale","started_at":"2026-01-01T00:00:00Z"}}"#;
        let (client, server) = canned_server(vec![(200, reply.to_string())]).await;

        let request = ActionRequest::new(ResourceRef::service("s-1", "web"), ActionKind::ServiceScale)
            .with_param("count", 3);
        let action = client.submit(&request).await.expect("submitted");
        assert_eq!(action.id, ActionId::new(7));
        assert!(action.is_pending());

        let requests = server.await.expect("server");
        assert!(requests[0].starts_with("POST /api/3/stacks/s-1/services/web/actions "));
        assert!(requests[0].contains(r#""command":"service_scale""#));
        assert!(requests[0].contains(r#""count":3"#));
    }

    #[tokio::test]
    async fn api_error_body_is_surfaced() {
        let body = r#"{"error":"not_found","error_description":"Stack not found"}"#;
        let (client, server) = canned_server(vec![(404, body.to_string())]).await;

        let err = client.get_stack("s-9").await.expect_err("404");
        assert!(matches!(
            err,
            CliError::Api { status: 404, ref message } if message == "Stack not found"
        ));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn status_source_wraps_errors_as_transport() {
        let (client, server) = canned_server(vec![(500, "oops".to_string())]).await;

        let err = client
            .fetch_action(&ResourceRef::stack("s-1"), ActionId::new(1))
            .await
            .expect_err("500");
        assert!(matches!(err, CoreError::Transport(ref m) if m.contains("500")));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn find_stack_resolves_by_prefix() {
        let page = format!(
            r#"{{"response":[{},{}]}}"#,
            stack_json("s-1", "shop", "staging"),
            stack_json("s-2", "blog", "production")
        );
        let (client, server) = canned_server(vec![(200, page)]).await;

        let stack = client.find_stack("sh", None).await.expect("found");
        assert_eq!(stack.uid, "s-1");
        server.await.expect("server");
    }

    #[test]
    fn debug_hides_token() {
        let settings = Settings {
            api_url: parse_api_url("https://app.example.com").expect("url"),
            token: "secret".into(),
        };
        let client = ApiClient::new(&settings).expect("client");
        assert!(!format!("{client:?}").contains("secret"));
    }
}
