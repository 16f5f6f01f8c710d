//! Blocking request/response primitive used by the query layer
//!
//! The query layer only ever sends one request and awaits one response; the
//! [`Transport`] trait is that seam. [`ReqwestTransport`] is the HTTP
//! implementation, carrying the session token as the `GBSESSIONID` cookie.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{COOKIE, SET_COOKIE};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::OmogenConfig;
use crate::constants::SESSION_COOKIE;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One part of a multipart upload
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text {
        name: String,
        contents: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl MultipartPart {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartPart>),
}

/// Outgoing request, fully composed
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub token: Option<String>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            token: None,
            body: RequestBody::Empty,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Set-Cookie` header values, in order
    pub cookies: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Session token from the first `Set-Cookie` header
    pub fn session_token(&self) -> Option<String> {
        let first = self.cookies.first()?;
        let pair = first.split(';').next()?.trim();
        let token = pair
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .unwrap_or(pair);
        (!token.is_empty()).then(|| token.to_string())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the whole response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Send a request and stream the response body into `sink`
    async fn download(
        &self,
        request: HttpRequest,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &OmogenConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("omogen-talk/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        if let Some(token) = &request.token {
            builder = builder.header(COOKIE, format!("{}={}", SESSION_COOKIE, token));
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match part {
                        MultipartPart::Text { name, contents } => form.text(name, contents),
                        MultipartPart::File {
                            name,
                            file_name,
                            bytes,
                        } => form.part(
                            name,
                            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
                        ),
                    };
                }
                builder.multipart(form)
            }
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("{:?} {}", request.method, request.url);
        let response = self.build(request)?.send().await?;

        let status = response.status().as_u16();
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            cookies,
            body,
        })
    }

    async fn download(
        &self,
        request: HttpRequest,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64> {
        debug!("{:?} {} (download)", request.method, request.url);
        let mut response = self.build(request)?.send().await?.error_for_status()?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// In-memory transport replaying canned responses in order
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, body: &str) -> Self {
            self.respond_with(HttpResponse {
                status: 200,
                cookies: Vec::new(),
                body: body.as_bytes().to_vec(),
            })
        }

        pub fn respond_with(self, response: HttpResponse) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("no request was sent")
        }

        fn next(&self, request: HttpRequest) -> HttpResponse {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            Ok(self.next(request))
        }

        async fn download(
            &self,
            request: HttpRequest,
            sink: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<u64> {
            let response = self.next(request);
            sink.write_all(&response.body).await?;
            Ok(response.body.len() as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_cookie() {
        let response = HttpResponse {
            status: 200,
            cookies: vec!["GBSESSIONID=abc123; Path=/; HttpOnly".into(), "other=1".into()],
            body: Vec::new(),
        };
        assert_eq!(response.session_token().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_missing() {
        assert_eq!(HttpResponse::default().session_token(), None);

        let empty = HttpResponse {
            cookies: vec!["GBSESSIONID=; Path=/".into()],
            ..HttpResponse::default()
        };
        assert_eq!(empty.session_token(), None);
    }

    #[test]
    fn test_request_builders() {
        let request = HttpRequest::post("https://omogen.test/guygle/pda/put?id=1")
            .with_token(Some("tok".into()))
            .with_body(RequestBody::Form(vec![("Nom".into(), "Dupont".into())]));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.token.as_deref(), Some("tok"));
        assert!(matches!(request.body, RequestBody::Form(ref f) if f.len() == 1));
    }

    #[tokio::test]
    async fn test_reqwest_transport_builds_multipart() {
        let transport = ReqwestTransport::from_client(reqwest::Client::new());
        let request = HttpRequest::post("https://omogen.test/guygle/pda/put").with_body(
            RequestBody::Multipart(vec![
                MultipartPart::Text {
                    name: "class".into(),
                    contents: "#C12".into(),
                },
                MultipartPart::File {
                    name: "@scan.pdf".into(),
                    file_name: "scan.pdf".into(),
                    bytes: b"%PDF".to_vec(),
                },
            ]),
        );

        let built = transport.build(request).unwrap().build().unwrap();
        let content_type = built
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));
    }
}
