//! Pending HTTP call description.

use reqwest::Method;

/// Request body variants.
#[derive(Clone, Debug)]
pub enum CallBody {
    /// JSON payload.
    Json(serde_json::Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

/// One logical outbound HTTP call, before authorization and dispatch.
///
/// The path may be relative; [`AuthSession::authorize`] fills in the active
/// environment's base URL for calls that did not set one, so a client module
/// can write `HttpCall::get("/v1/orders")` and stay environment-agnostic.
///
/// [`AuthSession::authorize`]: crate::AuthSession::authorize
#[derive(Clone, Debug)]
pub struct HttpCall {
    method: Method,
    base_url: Option<String>,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<CallBody>,
}

impl HttpCall {
    /// Create a call with an explicit method.
    ///
    /// `path` is either a path relative to a base URL supplied later or a
    /// full absolute URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: None,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET call.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST call.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT call.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// PATCH call.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// DELETE call.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set the base URL the path is resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a URL query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(CallBody::Json(value));
        self
    }

    /// Set a URL-encoded form body.
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(CallBody::Form(fields));
        self
    }

    /// Whether the call already carries an absolute URL, either via an
    /// explicit base or an absolute path.
    pub fn has_base_url(&self) -> bool {
        self.base_url.is_some() || is_absolute(&self.path)
    }

    /// Fill in the base URL only if the caller did not set one.
    pub(crate) fn set_base_url_if_absent(&mut self, url: &str) {
        if !self.has_base_url() {
            self.base_url = Some(url.to_string());
        }
    }

    /// Insert or replace a single header, leaving every other header alone.
    pub(crate) fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            existing.1 = value;
        } else {
            self.headers.push((name.to_string(), value));
        }
    }

    /// Effective absolute URL, if resolvable.
    pub fn url(&self) -> Option<String> {
        if is_absolute(&self.path) {
            return Some(self.path.clone());
        }
        self.base_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.path.trim_start_matches('/')
            )
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn header_pairs(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&CallBody> {
        self.body.as_ref()
    }

    /// Render the prepared request for troubleshooting: request line,
    /// headers, blank line, body.
    pub fn dump(&self) -> String {
        let mut out = String::from("-----------START-----------\n");
        let url = self.url().unwrap_or_else(|| self.path.clone());
        out.push_str(&format!("{} {}", self.method, url));
        if !self.query.is_empty() {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            out.push_str(&format!("?{}", query.join("&")));
        }
        out.push('\n');
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\n"));
        }
        out.push('\n');
        match &self.body {
            Some(CallBody::Json(value)) => out.push_str(&value.to_string()),
            Some(CallBody::Form(fields)) => {
                let encoded: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                out.push_str(&encoded.join("&"));
            }
            None => {}
        }
        out
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let call = HttpCall::get("/v1/orders").base_url("https://api.example.com/");
        assert_eq!(call.url().as_deref(), Some("https://api.example.com/v1/orders"));
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let mut call = HttpCall::post("https://auth.example.com/token");
        assert!(call.has_base_url());
        call.set_base_url_if_absent("https://api.example.com");
        assert_eq!(call.url().as_deref(), Some("https://auth.example.com/token"));
    }

    #[test]
    fn test_relative_call_without_base_has_no_url() {
        let call = HttpCall::get("/v1/orders");
        assert!(!call.has_base_url());
        assert_eq!(call.url(), None);
    }

    #[test]
    fn test_set_base_url_if_absent_respects_caller() {
        let mut call = HttpCall::get("/health").base_url("https://override.example.com");
        call.set_base_url_if_absent("https://api.example.com");
        assert_eq!(call.url().as_deref(), Some("https://override.example.com/health"));
    }

    #[test]
    fn test_set_header_replaces_only_matching_name() {
        let mut call = HttpCall::get("/v1/orders")
            .header("Accept", "application/json")
            .header("Authorization", "Bearer stale");
        call.set_header("Authorization", "Bearer fresh");

        assert_eq!(
            call.header_pairs(),
            &[
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer fresh".to_string()),
            ]
        );
    }

    #[test]
    fn test_dump_contains_request_line_headers_and_body() {
        let dump = HttpCall::post("https://auth.example.com/token")
            .header("Accept", "application/json")
            .form(vec![("grant_type".into(), "client_credentials".into())])
            .dump();

        assert!(dump.contains("POST https://auth.example.com/token"));
        assert!(dump.contains("Accept: application/json"));
        assert!(dump.ends_with("grant_type=client_credentials"));
    }
}
