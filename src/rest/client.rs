use super::models::{ServerCount, UpdateCountBody};
use crate::types::{API_BASE_URL, GatewayError, Result};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

/// Thin wrapper around the discordbots.group REST API.
///
/// Every method returns the parsed JSON body, or [`GatewayError::Api`] with
/// the HTTP status and the `message` the API sent back.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    bot_id: String,
    token: Option<String>,
}

impl RestClient {
    /// `token` is only needed for [`update_count`](Self::update_count) and
    /// the vote endpoints.
    pub fn new(bot_id: impl Into<String>, token: Option<String>) -> Result<Self> {
        let bot_id = bot_id.into();
        if bot_id.trim().is_empty() {
            return Err(GatewayError::config("bot id must be a non-empty string"));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: API_BASE_URL.to_string(),
            bot_id,
            token,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// Statistics about the list
    pub async fn get_stats(&self) -> Result<Value> {
        self.execute(self.http.get(&self.base_url)).await
    }

    /// All bots on the site
    pub async fn get_bots(&self) -> Result<Value> {
        self.execute(self.http.get(self.url("/bots"))).await
    }

    /// All users on the site
    pub async fn get_users(&self) -> Result<Value> {
        self.execute(self.http.get(self.url("/users"))).await
    }

    pub async fn get_bot(&self, id: &str) -> Result<Value> {
        if id.trim().is_empty() {
            return Err(GatewayError::config("bot id must be a non-empty string"));
        }
        self.execute(self.http.get(self.url(&format!("/bot/{}", id))))
            .await
    }

    /// The bot this client was created for
    pub async fn get_current(&self) -> Result<Value> {
        self.get_bot(&self.bot_id).await
    }

    /// Posts the server count, either a total or per-shard counts.
    pub async fn update_count(&self, count: impl Into<ServerCount>) -> Result<Value> {
        let body = UpdateCountBody {
            server_count: count.into(),
        };
        let request = self
            .http
            .post(self.url(&format!("/bot/{}", self.bot_id)))
            .json(&body);

        tracing::debug!("Updating server count for bot {}", self.bot_id);
        self.execute(self.authorized(request)?).await
    }

    /// All votes for the current bot
    pub async fn get_votes(&self) -> Result<Value> {
        let request = self
            .http
            .get(self.url(&format!("/bot/{}/votes", self.bot_id)));
        self.execute(self.authorized(request)?).await
    }

    pub async fn has_voted(&self, user: &str) -> Result<bool> {
        if user.trim().is_empty() {
            return Err(GatewayError::config("user id must be a non-empty string"));
        }

        let votes = self.get_votes().await?;
        let voted = votes
            .get("users")
            .and_then(Value::as_array)
            .is_some_and(|users| users.iter().any(|u| u.as_str() == Some(user)));
        Ok(voted)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| GatewayError::config("a bot token is required for this endpoint"))?;
        Ok(request.header("Authorization", token))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        Self::parse(response).await
    }

    async fn parse(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| value.get("message")?.as_str().map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            tracing::warn!("API request failed with {}: {}", status, message);
            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(GatewayError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request and returns its raw text.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    #[test]
    fn test_new_requires_bot_id() {
        assert!(matches!(
            RestClient::new("", None),
            Err(GatewayError::Config(_))
        ));
        let client = RestClient::new("123", None).unwrap();
        assert_eq!(client.bot_id(), "123");
        assert_eq!(client.url("/bots"), "https://discordbots.group/api/bots");
    }

    #[tokio::test]
    async fn test_get_bot() {
        let (base, server) = serve_once("200 OK", r#"{"id":"42","name":"Bot"}"#).await;
        let client = RestClient::new("1", None).unwrap().with_base_url(format!("{}/", base));

        let bot = client.get_bot("42").await.unwrap();
        assert_eq!(bot["name"], "Bot");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /bot/42 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_update_count_sends_token_and_body() {
        let (base, server) = serve_once("200 OK", "").await;
        let client = RestClient::new("7", Some("secret".to_string()))
            .unwrap()
            .with_base_url(base);

        let result = client.update_count(vec![3, 4]).await.unwrap();
        assert_eq!(result, Value::Null);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /bot/7 HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: secret"));
        assert!(request.ends_with(r#"{"server_count":[3,4]}"#));
    }

    #[tokio::test]
    async fn test_update_count_requires_token() {
        let client = RestClient::new("7", None).unwrap();
        assert!(matches!(
            client.update_count(1).await,
            Err(GatewayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_api_error_uses_body_message() {
        let (base, _server) = serve_once("404 Not Found", r#"{"message":"Bot not found"}"#).await;
        let client = RestClient::new("1", None).unwrap().with_base_url(base);

        match client.get_bot("missing").await {
            Err(GatewayError::Api { code, message }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "Bot not found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_api_error_falls_back_to_status_reason() {
        let (base, _server) = serve_once("502 Bad Gateway", "<html></html>").await;
        let client = RestClient::new("1", None).unwrap().with_base_url(base);

        match client.get_stats().await {
            Err(GatewayError::Api { code, message }) => {
                assert_eq!(code, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_has_voted() {
        let (base, server) = serve_once("200 OK", r#"{"users":["10","20"]}"#).await;
        let client = RestClient::new("1", Some("secret".to_string()))
            .unwrap()
            .with_base_url(base);

        assert!(client.has_voted("20").await.unwrap());
        assert!(server.await.unwrap().starts_with("GET /bot/1/votes"));

        let (base, _server) = serve_once("200 OK", r#"{"users":["10"]}"#).await;
        let client = client.with_base_url(base);
        assert!(!client.has_voted("20").await.unwrap());
    }
}
