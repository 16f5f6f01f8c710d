//! Per-call request state and wire composition

use crate::transport::{HttpMethod, HttpRequest, MultipartPart, RequestBody};

/// Remote method segment of the request target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
    Doc,
    Stock,
    Click,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Doc => "doc",
            Self::Stock => "stock",
            Self::Click => "click",
        }
    }

    /// Wire format used unless an operation overrides it
    pub fn default_format(self) -> Format {
        match self {
            Self::Put | Self::Delete => Format::Pda,
            Self::Get | Self::Doc | Self::Stock | Self::Click => Format::Api,
        }
    }

    /// HTTP verb carrying this method
    pub fn http_method(self) -> HttpMethod {
        match self {
            Self::Get | Self::Doc | Self::Stock => HttpMethod::Get,
            Self::Put | Self::Delete | Self::Click => HttpMethod::Post,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exchange format with the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Api,
    Pda,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Pda => "pda",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Session token, sent as cookie
    pub token: Option<String>,
    /// Remote type tag appended as `class`
    pub class: Option<String>,
    /// Ask for full records instead of identifiers only
    pub data: bool,
    /// Ask for normalized field names
    pub canonicalize: bool,
    /// Relation-expansion expression
    pub look: Option<String>,
    pub form: Vec<(String, String)>,
    pub multipart: Option<Vec<MultipartPart>>,
}

/// Mutable state of a single remote call
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    method: Method,
    format: Format,
    fragment: String,
    suppress_id: bool,
    pub options: RequestOptions,
}

impl QueryRequest {
    pub fn new(token: Option<String>) -> Self {
        Self {
            method: Method::Get,
            format: Format::Api,
            fragment: String::new(),
            suppress_id: false,
            options: RequestOptions {
                token,
                ..RequestOptions::default()
            },
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Switch method, resetting the format to the method's default
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
        self.format = method.default_format();
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Replace the query fragment
    pub fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.fragment = fragment.into();
    }

    /// Append a `key=value` token to the fragment
    pub fn push(&mut self, token: impl AsRef<str>) {
        if !self.fragment.is_empty() {
            self.fragment.push('&');
        }
        self.fragment.push_str(token.as_ref());
    }

    /// Put a token in front of the fragment
    pub fn prepend(&mut self, token: impl AsRef<str>) {
        self.fragment = if self.fragment.is_empty() {
            token.as_ref().to_string()
        } else {
            format!("{}&{}", token.as_ref(), self.fragment)
        };
    }

    /// The identifier is already part of the fragment
    pub fn suppress_id(&mut self) {
        self.suppress_id = true;
    }

    pub fn is_id_suppressed(&self) -> bool {
        self.suppress_id
    }

    /// Compose `<endpoint><format>/<method>?<fragment>` plus option tokens
    ///
    /// Every `#` is escaped, as the remote store uses it in type tags.
    pub fn target(&self, endpoint: &str) -> String {
        let mut tokens: Vec<String> = Vec::new();
        if !self.fragment.is_empty() {
            tokens.push(self.fragment.clone());
        }
        if let Some(class) = &self.options.class {
            tokens.push(format!("class={}", class));
        }
        if self.options.data {
            tokens.push("data".to_string());
        }
        if self.options.canonicalize {
            tokens.push("canonicalize=php".to_string());
        }
        if let Some(look) = &self.options.look {
            tokens.push(format!("look={}", look));
        }

        format!(
            "{}{}/{}?{}",
            endpoint,
            self.format,
            self.method,
            tokens.join("&")
        )
        .replace('#', "%23")
    }

    /// Turn the request into the transport primitive
    pub fn into_http(self, endpoint: &str) -> HttpRequest {
        let url = self.target(endpoint);
        let body = match self.options.multipart {
            Some(parts) => RequestBody::Multipart(parts),
            None if !self.options.form.is_empty() => RequestBody::Form(self.options.form),
            None => RequestBody::Empty,
        };

        HttpRequest {
            method: self.method.http_method(),
            url,
            token: self.options.token,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://omogen.test/guygle/";

    #[test]
    fn test_method_defaults() {
        assert_eq!(Method::Get.default_format(), Format::Api);
        assert_eq!(Method::Put.default_format(), Format::Pda);
        assert_eq!(Method::Delete.default_format(), Format::Pda);
        assert_eq!(Method::Doc.default_format(), Format::Api);
        assert_eq!(Method::Put.http_method(), HttpMethod::Post);
        assert_eq!(Method::Stock.to_string(), "stock");
        assert_eq!(Method::Click.to_string(), "click");
    }

    #[test]
    fn test_fragment_accumulates_left_to_right() {
        let mut request = QueryRequest::new(None);
        request.push("id=P1");
        request.push("Nom=Dupont");
        request.prepend("class=Patient");
        assert_eq!(request.fragment(), "class=Patient&id=P1&Nom=Dupont");
    }

    #[test]
    fn test_target_with_options() {
        let mut request = QueryRequest::new(Some("tok".into()));
        request.set_fragment("query=Patient");
        request.options.class = Some("#C12".into());
        request.options.data = true;
        request.options.canonicalize = true;
        request.options.look = Some(r##"["#3"]"##.into());

        assert_eq!(
            request.target(ENDPOINT),
            r#"https://omogen.test/guygle/api/get?query=Patient&class=%23C12&data&canonicalize=php&look=["%233"]"#
        );
    }

    #[test]
    fn test_target_without_fragment() {
        let mut request = QueryRequest::new(None);
        request.set_method(Method::Put);
        assert_eq!(request.target(ENDPOINT), "https://omogen.test/guygle/pda/put?");
    }

    #[test]
    fn test_into_http_body() {
        let mut request = QueryRequest::new(Some("tok".into()));
        request.set_method(Method::Put);
        request.options.form = vec![("Nom".into(), "Dupont".into())];

        let http = request.into_http(ENDPOINT);
        assert_eq!(http.method, HttpMethod::Post);
        assert_eq!(http.token.as_deref(), Some("tok"));
        assert_eq!(
            http.body,
            RequestBody::Form(vec![("Nom".into(), "Dupont".into())])
        );
    }

    #[test]
    fn test_suppress_flag_is_per_request() {
        let mut first = QueryRequest::new(None);
        first.suppress_id();
        assert!(first.is_id_suppressed());
        assert!(!QueryRequest::new(None).is_id_suppressed());
    }
}
