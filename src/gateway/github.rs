//! GitHub pull request review comment API.
//!
//! Talks to the REST endpoints directly with reqwest:
//!
//! | Operation | Endpoint |
//! |---|---|
//! | list | `GET /repos/{repo}/pulls/{n}/comments` (paginated) |
//! | post | `POST /repos/{repo}/pulls/{n}/comments` |
//! | delete | `DELETE {comment.url}` |

use async_trait::async_trait;
use serde_json::json;

use crate::constants::{APP_NAME, GITHUB_ACCEPT, VERSION};
use crate::models::{ReviewComment, RunContext};

use super::{GatewayError, ReviewGateway};

/// Review comment gateway backed by the GitHub REST API.
pub struct GithubGateway {
    client: reqwest::Client,
    api_url: String,
    token: String,
    repository: String,
    pull_request_number: u64,
    commit_id: String,
    per_page: u32,
}

impl GithubGateway {
    /// Create a gateway for the pull request described by `ctx`.
    pub fn new(ctx: &RunContext, api_url: &str, per_page: u32) -> Result<Self, GatewayError> {
        let token = ctx.access_token.clone().ok_or(GatewayError::MissingToken)?;
        let client = reqwest::Client::builder()
            .user_agent(format!("{APP_NAME}/{VERSION}"))
            .build()
            .map_err(|e| GatewayError::ApiError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            repository: ctx.repository.clone(),
            pull_request_number: ctx.pull_request_number,
            commit_id: ctx.commit_id.clone(),
            per_page,
        })
    }

    fn comments_url(&self) -> String {
        format!(
            "{}/repos/{}/pulls/{}/comments",
            self.api_url, self.repository, self.pull_request_number
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", GITHUB_ACCEPT)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::ApiError(format!("{what}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            tracing::error!(%status, %body, "{what} failed");
            return Err(GatewayError::ApiError(format!(
                "{what} failed with HTTP {status}: {body}"
            )));
        }

        Ok(response)
    }
}

/// Build the JSON payload for a suggestion comment.
///
/// Suggestions always target the head side of the diff. Single-line
/// comments must omit the range start fields or the API rejects them.
pub fn suggestion_payload(
    commit_id: &str,
    path: &str,
    begin_line: u32,
    end_line: u32,
    body: &str,
) -> serde_json::Value {
    let mut payload = json!({
        "body": body,
        "commit_id": commit_id,
        "path": path,
        "side": "RIGHT",
        "line": end_line,
    });
    if begin_line != end_line {
        payload["start_line"] = json!(begin_line);
        payload["start_side"] = json!("RIGHT");
    }
    payload
}

/// Parse the `Link` header to find the `rel="next"` URL.
fn parse_next_link(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let part = part.trim();
        if !part.contains(r#"rel="next""#) {
            return None;
        }
        let start = part.find('<')? + 1;
        let end = part.find('>')?;
        Some(part[start..end].to_string())
    })
}

#[async_trait]
impl ReviewGateway for GithubGateway {
    async fn list_comments(&self) -> Result<Vec<ReviewComment>, GatewayError> {
        let mut comments = Vec::new();
        let mut next_url = Some(format!("{}?per_page={}", self.comments_url(), self.per_page));

        while let Some(url) = next_url.take() {
            tracing::debug!(%url, "listing review comments");
            let response = self
                .send(self.request(reqwest::Method::GET, &url), "listing review comments")
                .await?;
            next_url = parse_next_link(response.headers());
            let page: Vec<ReviewComment> = response
                .json()
                .await
                .map_err(|e| GatewayError::DecodeError(e.to_string()))?;
            comments.extend(page);
        }

        Ok(comments)
    }

    async fn post_suggestion(
        &self,
        path: &str,
        begin_line: u32,
        end_line: u32,
        body: &str,
    ) -> Result<ReviewComment, GatewayError> {
        let payload = suggestion_payload(&self.commit_id, path, begin_line, end_line, body);
        tracing::debug!(%payload, "posting suggestion");

        let url = self.comments_url();
        let response = self
            .send(
                self.request(reqwest::Method::POST, &url).json(&payload),
                &format!("posting suggestion on {path}:{begin_line}-{end_line}"),
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| GatewayError::DecodeError(e.to_string()))
    }

    async fn delete_comment(&self, url: &str) -> Result<(), GatewayError> {
        tracing::debug!(%url, "deleting review comment");
        self.send(
            self.request(reqwest::Method::DELETE, url),
            &format!("deleting comment {url}"),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::context::{GitRef, PullRequest, PullRequestEvent};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn context(token: Option<&str>) -> RunContext {
        RunContext::from_event(
            token.map(str::to_string),
            "octo/widgets".to_string(),
            PathBuf::from("/w"),
            PullRequestEvent {
                pull_request: PullRequest {
                    number: 7,
                    head: GitRef {
                        ref_name: "feature".to_string(),
                        sha: "abc123".to_string(),
                    },
                    base: GitRef {
                        ref_name: "main".to_string(),
                        sha: String::new(),
                    },
                },
            },
        )
    }

    /// Serve one canned HTTP response per connection and record each raw request.
    ///
    /// `responses` receives the server's base URL so pagination links can
    /// point back at it.
    async fn serve(
        responses: impl FnOnce(&str) -> Vec<String>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let responses = responses(&base);
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });
        (base, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length || n == 0 {
                    return text;
                }
            } else if n == 0 {
                return text;
            }
        }
    }

    fn http(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn single_line_payload_omits_range_start() {
        let payload = suggestion_payload("abc", "src/a.js", 5, 5, "body");
        assert_eq!(
            payload,
            json!({
                "body": "body",
                "commit_id": "abc",
                "path": "src/a.js",
                "side": "RIGHT",
                "line": 5,
            })
        );
    }

    #[test]
    fn multi_line_payload_includes_range_start() {
        let payload = suggestion_payload("abc", "src/a.js", 12, 13, "body");
        assert_eq!(payload["line"], 13);
        assert_eq!(payload["start_line"], 12);
        assert_eq!(payload["start_side"], "RIGHT");
        assert_eq!(payload["side"], "RIGHT");
    }

    #[test]
    fn parse_next_link_finds_next() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::LINK,
            r#"<https://api.github.com/x?page=2>; rel="next", <https://api.github.com/x?page=5>; rel="last""#
                .parse()
                .unwrap(),
        );
        assert_eq!(
            parse_next_link(&headers).as_deref(),
            Some("https://api.github.com/x?page=2")
        );
    }

    #[test]
    fn parse_next_link_absent_on_last_page() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::LINK,
            r#"<https://api.github.com/x?page=1>; rel="first""#.parse().unwrap(),
        );
        assert_eq!(parse_next_link(&headers), None);
        assert_eq!(parse_next_link(&reqwest::header::HeaderMap::new()), None);
    }

    #[test]
    fn new_requires_token() {
        let result = GithubGateway::new(&context(None), "https://api.github.com", 100);
        assert!(matches!(result, Err(GatewayError::MissingToken)));
    }

    #[test]
    fn comments_url_uses_repository_and_number() {
        let gateway = GithubGateway::new(&context(Some("t")), "https://ghe.example/api/v3/", 100).unwrap();
        assert_eq!(
            gateway.comments_url(),
            "https://ghe.example/api/v3/repos/octo/widgets/pulls/7/comments"
        );
    }

    #[tokio::test]
    async fn list_comments_follows_pagination() {
        let first_page = r#"[{"id": 1, "body": "a", "url": "u1"}]"#;
        let second_page = r#"[{"id": 2, "body": "b", "url": "u2", "in_reply_to_id": 1}]"#;
        let (base, server) = serve(|base| {
            let link = format!("Link: <{base}/next-page>; rel=\"next\"\r\n");
            vec![http("200 OK", &link, first_page), http("200 OK", "", second_page)]
        })
        .await;

        let gateway = GithubGateway::new(&context(Some("tok")), &base, 50).unwrap();
        let comments = gateway.list_comments().await.unwrap();
        assert_eq!(comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(comments[1].in_reply_to_id, Some(1));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /repos/octo/widgets/pulls/7/comments?per_page=50 "));
        assert!(requests[0].to_lowercase().contains("authorization: bearer tok"));
        assert!(requests[1].starts_with("GET /next-page "));
    }

    #[tokio::test]
    async fn post_suggestion_sends_payload() {
        let created = r#"{"id": 99, "body": "b", "url": "https://api/comments/99"}"#;
        let (base, server) = serve(|_| vec![http("201 Created", "", created)]).await;

        let gateway = GithubGateway::new(&context(Some("tok")), &base, 100).unwrap();
        let comment = gateway.post_suggestion("src/a.js", 3, 4, "b").await.unwrap();
        assert_eq!(comment.id, 99);

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("POST /repos/octo/widgets/pulls/7/comments "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["commit_id"], "abc123");
        assert_eq!(sent["start_line"], 3);
        assert_eq!(sent["line"], 4);
    }

    #[tokio::test]
    async fn http_error_carries_response_body() {
        let (base, server) = serve(|_| {
            vec![http(
                "422 Unprocessable Entity",
                "",
                r#"{"message": "line must be part of the diff"}"#,
            )]
        })
        .await;

        let gateway = GithubGateway::new(&context(Some("tok")), &base, 100).unwrap();
        let err = gateway
            .post_suggestion("src/a.js", 3, 3, "b")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("422"), "got: {err}");
        assert!(err.contains("line must be part of the diff"), "got: {err}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn delete_comment_uses_comment_url() {
        let (base, server) = serve(|_| vec![http("204 No Content", "", "")]).await;

        let gateway = GithubGateway::new(&context(Some("tok")), &base, 100).unwrap();
        gateway
            .delete_comment(&format!("{base}/repos/octo/widgets/pulls/comments/5"))
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("DELETE /repos/octo/widgets/pulls/comments/5 "));
    }
}
