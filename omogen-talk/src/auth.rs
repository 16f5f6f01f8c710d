//! Session acquisition and password reset
//!
//! The session token is the `GBSESSIONID` cookie set by the login call. It
//! is then passed to every builder as an opaque string.

use base64::Engine;
use log::{debug, info};

use crate::client::OmogenClient;
use crate::constants::{STATE_AUTH_IMPOSSIBLE, STATE_OK};
use crate::error::{OmogenError, Result};
use crate::response::PdaResponse;
use crate::transport::{HttpRequest, HttpResponse, RequestBody};

/// Outcome of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub code: String,
    pub text: String,
    /// Full user information returned by the store
    pub info: serde_json::Value,
}

impl OmogenClient {
    /// Open a session for a user
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginResponse> {
        let response = self.send_login(login, password).await?;
        let token = response.session_token();
        let info: serde_json::Value = serde_json::from_slice(&response.body)?;

        let code = match info.get("code") {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let text = info
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        match token {
            Some(token) if code == STATE_OK => {
                info!("Opened Omogen session for {}", login);
                Ok(LoginResponse {
                    token,
                    code,
                    text,
                    info,
                })
            }
            _ if code == STATE_AUTH_IMPOSSIBLE => {
                Err(OmogenError::AuthImpossible(format!("{} {}", code, text)))
            }
            _ => Err(OmogenError::Remote { code, text }),
        }
    }

    /// Open a session with the configured admin credentials
    pub async fn admin_token(&self) -> Result<String> {
        let (login, password) = self.config().admin_credentials()?;
        let response = self.send_login(login, password).await?;
        response
            .session_token()
            .ok_or_else(|| OmogenError::AuthImpossible("no session cookie for admin".into()))
    }

    async fn send_login(&self, login: &str, password: &str) -> Result<HttpResponse> {
        let url = format!("{}api/login?info", self.config().endpoint());
        let request = HttpRequest::post(url).with_body(RequestBody::Form(vec![
            ("login".to_string(), login.to_string()),
            ("password".to_string(), password.to_string()),
            ("timeout".to_string(), "0".to_string()),
        ]));
        self.transport().send(request).await
    }

    /// Ask for a password reset; the returned identifier feeds [`OmogenClient::set_new_password`]
    pub async fn reset_password_id(&self, email: &str) -> Result<PdaResponse> {
        let url = format!(
            "{}pda/password?email={}",
            self.config().endpoint(),
            urlencoding::encode(email)
        );
        let response = self.transport().send(HttpRequest::get(url)).await?;
        PdaResponse::decode(&response.text()).into_result()
    }

    pub async fn set_new_password(&self, reset_id: &str, password: &str) -> Result<PdaResponse> {
        let password = urlencoding::encode(password);
        let url = format!(
            "{}pda/password?reset-id={}&password={}&confirm-password={}",
            self.config().endpoint(),
            urlencoding::encode(reset_id),
            password,
            password
        );
        debug!("Setting new password for reset id {}", reset_id);
        let response = self.transport().send(HttpRequest::post(url)).await?;
        PdaResponse::decode(&response.text()).into_result()
    }
}

/// Encode a user id the way the store expects it: base64, upper-cased, unpadded
pub fn prepare_user_id(user_id: &str) -> String {
    base64::engine::general_purpose::STANDARD
        .encode(user_id)
        .to_uppercase()
        .replace('=', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OmogenConfig;
    use crate::registry::TypeRegistry;
    use crate::transport::mock::MockTransport;
    use crate::transport::HttpMethod;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>) -> OmogenClient {
        let config = OmogenConfig::builder("https://omogen.test")
            .admin_credentials("admin", "secret")
            .build();
        OmogenClient::with_transport(config, TypeRegistry::new(), transport)
    }

    fn login_response(body: &str, cookie: Option<&str>) -> HttpResponse {
        HttpResponse {
            status: 200,
            cookies: cookie.map(|c| vec![c.to_string()]).unwrap_or_default(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let transport = Arc::new(MockTransport::new().respond_with(login_response(
            r#"{"code":"10","text":"Bienvenue","user":"jdupont"}"#,
            Some("GBSESSIONID=tok42; path=/"),
        )));
        let client = client(Arc::clone(&transport));

        let login = client.login("jdupont", "pw").await.unwrap();
        assert_eq!(login.token, "tok42");
        assert_eq!(login.info["user"], "jdupont");

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://omogen.test/guygle/api/login?info");
        assert!(matches!(
            request.body,
            RequestBody::Form(ref fields) if fields.contains(&("timeout".into(), "0".into()))
        ));
    }

    #[tokio::test]
    async fn test_login_impossible() {
        let transport = Arc::new(MockTransport::new().respond_with(login_response(
            r#"{"code":"21","text":"Identifiants invalides"}"#,
            None,
        )));
        let err = client(transport).login("jdupont", "bad").await.unwrap_err();
        assert!(matches!(err, OmogenError::AuthImpossible(ref m) if m == "21 Identifiants invalides"));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_login_without_cookie() {
        let transport = Arc::new(
            MockTransport::new().respond_with(login_response(r#"{"code":"10","text":"OK"}"#, None)),
        );
        let err = client(transport).login("jdupont", "pw").await.unwrap_err();
        assert!(matches!(err, OmogenError::Remote { .. }));
    }

    #[tokio::test]
    async fn test_admin_token() {
        let transport = Arc::new(MockTransport::new().respond_with(login_response(
            r#"{"code":"10"}"#,
            Some("GBSESSIONID=admintok"),
        )));
        let client = client(Arc::clone(&transport));

        assert_eq!(client.admin_token().await.unwrap(), "admintok");
        assert!(matches!(
            transport.last_request().body,
            RequestBody::Form(ref fields) if fields[0] == ("login".into(), "admin".into())
        ));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let transport = Arc::new(
            MockTransport::new()
                .respond("10\nRESET1\n")
                .respond("10\nRESET1\n"),
        );
        let client = client(Arc::clone(&transport));

        let reset = client.reset_password_id("j.dupont+test@example.com").await.unwrap();
        assert_eq!(reset.id.as_deref(), Some("RESET1"));
        client.set_new_password("RESET1", "n3w&pass").await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "https://omogen.test/guygle/pda/password?email=j.dupont%2Btest%40example.com"
        );
        assert_eq!(
            requests[1].url,
            "https://omogen.test/guygle/pda/password?reset-id=RESET1&password=n3w%26pass&confirm-password=n3w%26pass"
        );
        assert_eq!(requests[1].method, HttpMethod::Post);
    }

    #[test]
    fn test_prepare_user_id() {
        // base64("user@example.com") = dXNlckBleGFtcGxlLmNvbQ==
        assert_eq!(prepare_user_id("user@example.com"), "DXNLCKBLEGFTCGXLLMNVBQ");
    }
}
