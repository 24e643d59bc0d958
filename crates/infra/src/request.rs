//! Request descriptors
//!
//! A [`RequestDescriptor`] is the transport-independent description of one
//! call: method, path, query, body, field selector and the auth scope to sign
//! with. Building one performs no I/O; the only failure is a missing required
//! argument, reported as [`BoxError::InvalidArgument`] before anything is
//! sent.
//!
//! Rendering a descriptor is deterministic: the same inputs always produce
//! byte-identical HTTP requests, which keeps retries exact.

use boxapi_domain::constants::FIELDS_PARAM;
use boxapi_domain::{BoxError, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::auth::AuthScope;

/// Which base URL a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSurface {
    /// Versioned REST API
    Api,
    /// Content upload host
    Upload,
    /// OAuth2 authorize/token/revoke endpoints
    OAuth,
    /// Legacy ticket-auth action endpoint
    Legacy,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Bytes { data: Bytes, content_type: String },
}

/// Everything needed to send one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    surface: ApiSurface,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    fields: Option<Vec<String>>,
    scope: AuthScope,
    authenticated: bool,
    retryable: bool,
}

impl RequestDescriptor {
    pub fn builder(method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(method, path.into())
    }

    /// Start a request for `operation` on `resource`.
    ///
    /// # Errors
    /// Returns `BoxError::InvalidArgument` when the operation needs an
    /// identifier and `id` is missing or empty.
    pub fn for_resource(
        resource: Resource,
        operation: Operation,
        id: Option<&str>,
    ) -> Result<RequestDescriptorBuilder> {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        let item = || id.map(|id| resource.item_path(id)).ok_or_else(|| resource.missing_id());

        let (path, surface) = match operation {
            Operation::List | Operation::Create => (resource.collection_path(), ApiSurface::Api),
            Operation::Upload => match id {
                Some(id) => (format!("{}/content", resource.item_path(id)), ApiSurface::Upload),
                None => (format!("{}/content", resource.collection_path()), ApiSurface::Upload),
            },
            Operation::Get | Operation::Update | Operation::Delete | Operation::Restore => {
                (item()?, ApiSurface::Api)
            }
            Operation::Copy
            | Operation::Download
            | Operation::Items
            | Operation::Comments
            | Operation::Collaborations
            | Operation::Discussions
            | Operation::Trash => {
                (format!("{}/{}", item()?, operation.suffix()), ApiSurface::Api)
            }
        };

        Ok(Self::builder(operation.method(), path).surface(surface))
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn surface(&self) -> ApiSurface {
        self.surface
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    #[must_use]
    pub fn scope(&self) -> &AuthScope {
        &self.scope
    }

    /// Token-acquisition requests are not signed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether a transport failure may be retried. False for requests that
    /// consume a single-use grant.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Full URL against `base_url`, with query and field selector applied.
    ///
    /// # Errors
    /// Returns `BoxError::Config` if `base_url` is not a valid URL.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| BoxError::Config(format!("invalid request url {raw}: {e}")))?;

        let has_query = !self.query.is_empty() || self.fields.is_some();
        if has_query {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
            if let Some(fields) = &self.fields {
                pairs.append_pair(FIELDS_PARAM, &fields.join(","));
            }
        }

        Ok(url)
    }

    /// Render into a transport request carrying `auth_headers`.
    ///
    /// # Errors
    /// Returns `BoxError::Config` for an invalid base URL and
    /// `BoxError::Serialization` if the JSON body cannot be encoded.
    pub fn to_http(&self, base_url: &str, auth_headers: HeaderMap) -> Result<reqwest::Request> {
        let url = self.url(base_url)?;
        let mut request = reqwest::Request::new(self.method.clone(), url);
        let headers = request.headers_mut();
        headers.extend(auth_headers);

        let payload = match &self.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Some(Bytes::from(serde_json::to_vec(value)?))
            }
            RequestBody::Form(params) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish();
                Some(Bytes::from(encoded))
            }
            RequestBody::Bytes { data, content_type } => {
                let value = HeaderValue::from_str(content_type).map_err(|_| {
                    BoxError::InvalidArgument(format!("invalid content type: {content_type}"))
                })?;
                headers.insert(CONTENT_TYPE, value);
                Some(data.clone())
            }
        };

        if let Some(payload) = payload {
            *request.body_mut() = Some(reqwest::Body::from(payload));
        }

        Ok(request)
    }
}

/// Fluent construction of a [`RequestDescriptor`].
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    method: Method,
    surface: ApiSurface,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    fields: Option<Vec<String>>,
    scope: AuthScope,
    authenticated: bool,
    retryable: bool,
    error: Option<BoxError>,
}

impl RequestDescriptorBuilder {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            surface: ApiSurface::Api,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
            fields: None,
            scope: AuthScope::default(),
            authenticated: true,
            retryable: true,
            error: None,
        }
    }

    pub fn surface(mut self, surface: ApiSurface) -> Self {
        self.surface = surface;
        self
    }

    /// Append a query parameter; order is preserved.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter only when `value` is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Restrict the response to these fields. An empty selector means the
    /// server's default field set.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> =
            fields.into_iter().map(Into::into).filter(|f: &String| !f.is_empty()).collect();
        self.fields = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = RequestBody::Json(value),
            Err(e) => self.error = Some(BoxError::Serialization(e.to_string())),
        }
        self
    }

    pub fn form<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body =
            RequestBody::Form(params.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn bytes(mut self, data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = RequestBody::Bytes { data: data.into(), content_type: content_type.into() };
        self
    }

    /// Sign with this scope instead of an empty one.
    pub fn scope(mut self, scope: AuthScope) -> Self {
        self.scope = scope;
        self
    }

    /// Send without credentials (token-acquisition endpoints only).
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Never resend after a transport failure. A lost response may already
    /// have consumed an authorization code or refresh token.
    pub fn no_retry(mut self) -> Self {
        self.retryable = false;
        self
    }

    /// Finish the descriptor.
    ///
    /// # Errors
    /// Returns `BoxError::InvalidArgument` for an empty path and
    /// `BoxError::Serialization` if a JSON body failed to serialize.
    pub fn build(self) -> Result<RequestDescriptor> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let path = self.path.trim();
        if path.is_empty() || path == "/" {
            return Err(BoxError::missing("path"));
        }
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };

        Ok(RequestDescriptor {
            method: self.method,
            surface: self.surface,
            path,
            query: self.query,
            body: self.body,
            fields: self.fields,
            scope: self.scope,
            authenticated: self.authenticated,
            retryable: self.retryable,
        })
    }
}

/// Resource types exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    File,
    Folder,
    Comment,
    Discussion,
    Collaboration,
    User,
    Event,
    SharedItem,
    Search,
}

impl Resource {
    fn segment(self) -> &'static str {
        match self {
            Self::File => "files",
            Self::Folder => "folders",
            Self::Comment => "comments",
            Self::Discussion => "discussions",
            Self::Collaboration => "collaborations",
            Self::User => "users",
            Self::Event => "events",
            Self::SharedItem => "shared_items",
            Self::Search => "search",
        }
    }

    #[must_use]
    pub fn collection_path(self) -> String {
        format!("/{}", self.segment())
    }

    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("/{}/{}", self.segment(), urlencoding::encode(id))
    }

    fn missing_id(self) -> BoxError {
        BoxError::missing(&format!("{} id", self.segment()))
    }
}

/// Operations a request can perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
    Copy,
    Download,
    Upload,
    Items,
    Comments,
    Collaborations,
    Discussions,
    Trash,
    Restore,
}

impl Operation {
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Get
            | Self::List
            | Self::Download
            | Self::Items
            | Self::Comments
            | Self::Collaborations
            | Self::Discussions
            | Self::Trash => Method::GET,
            Self::Create | Self::Copy | Self::Upload | Self::Restore => Method::POST,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Download => "content",
            Self::Items => "items",
            Self::Comments => "comments",
            Self::Collaborations => "collaborations",
            Self::Discussions => "discussions",
            Self::Trash => "trash",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://api.box.com/2.0";

    fn body_bytes(request: &reqwest::Request) -> Option<Vec<u8>> {
        request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec)
    }

    #[test]
    fn test_for_resource_builds_item_paths() {
        let descriptor =
            RequestDescriptor::for_resource(Resource::Folder, Operation::Items, Some("0"))
                .unwrap()
                .build()
                .unwrap();

        assert_eq!(*descriptor.method(), Method::GET);
        assert_eq!(descriptor.path(), "/folders/0/items");
        assert_eq!(descriptor.surface(), ApiSurface::Api);
    }

    #[test]
    fn test_missing_id_is_invalid_argument() {
        for id in [None, Some(""), Some("  ")] {
            let result = RequestDescriptor::for_resource(Resource::File, Operation::Get, id);
            assert!(matches!(result, Err(BoxError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_upload_routes_to_upload_surface() {
        let new_file = RequestDescriptor::for_resource(Resource::File, Operation::Upload, None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(new_file.path(), "/files/content");
        assert_eq!(new_file.surface(), ApiSurface::Upload);

        let new_version =
            RequestDescriptor::for_resource(Resource::File, Operation::Upload, Some("55"))
                .unwrap()
                .build()
                .unwrap();
        assert_eq!(new_version.path(), "/files/55/content");
        assert_eq!(*new_version.method(), Method::POST);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let result = RequestDescriptor::builder(Method::GET, " ").build();
        assert!(matches!(result, Err(BoxError::InvalidArgument(_))));
    }

    #[test]
    fn test_path_gets_leading_slash() {
        let descriptor = RequestDescriptor::builder(Method::GET, "users/me").build().unwrap();
        assert_eq!(descriptor.path(), "/users/me");
    }

    #[test]
    fn test_fields_render_as_single_parameter() {
        let descriptor = RequestDescriptor::builder(Method::GET, "/files/1")
            .fields(["name", "size", "modified_at"])
            .build()
            .unwrap();

        let url = descriptor.url(BASE).unwrap();
        assert_eq!(url.as_str(), "https://api.box.com/2.0/files/1?fields=name%2Csize%2Cmodified_at");
    }

    #[test]
    fn test_empty_field_selector_means_server_defaults() {
        let descriptor = RequestDescriptor::builder(Method::GET, "/files/1")
            .fields(Vec::<String>::new())
            .build()
            .unwrap();

        assert!(descriptor.fields().is_none());
        assert_eq!(descriptor.url(BASE).unwrap().query(), None);
    }

    #[test]
    fn test_query_order_is_preserved() {
        let descriptor = RequestDescriptor::builder(Method::GET, "/folders/0/items")
            .query("limit", "100")
            .query("offset", "200")
            .query_opt("marker", None::<String>)
            .build()
            .unwrap();

        assert_eq!(descriptor.url(BASE).unwrap().query(), Some("limit=100&offset=200"));
    }

    #[test]
    fn test_identical_inputs_render_identical_requests() {
        let build = || {
            RequestDescriptor::builder(Method::POST, "/folders")
                .json(&json!({"name": "Reports", "parent": {"id": "0"}}))
                .query("fields", "id")
                .build()
                .unwrap()
        };
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));

        let first = build().to_http(BASE, headers.clone()).unwrap();
        let second = build().to_http(BASE, headers).unwrap();

        assert_eq!(first.method(), second.method());
        assert_eq!(first.url(), second.url());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(body_bytes(&first), body_bytes(&second));
    }

    #[test]
    fn test_form_body_is_urlencoded() {
        let descriptor = RequestDescriptor::builder(Method::POST, "/token")
            .form([("grant_type", "refresh_token"), ("refresh_token", "a b")])
            .unauthenticated()
            .build()
            .unwrap();

        let request = descriptor.to_http(BASE, HeaderMap::new()).unwrap();
        assert!(!descriptor.is_authenticated());
        assert!(descriptor.is_retryable());
        assert_eq!(request.headers()[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(body_bytes(&request).unwrap(), b"grant_type=refresh_token&refresh_token=a+b");
    }

    #[test]
    fn test_raw_bytes_body_keeps_content_type() {
        let descriptor = RequestDescriptor::builder(Method::POST, "/files/content")
            .bytes(vec![1u8, 2, 3], "application/octet-stream")
            .build()
            .unwrap();

        let request = descriptor.to_http(BASE, HeaderMap::new()).unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(body_bytes(&request).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_scope_travels_with_descriptor() {
        let scope = AuthScope::new().with_shared_link("L");
        let descriptor = RequestDescriptor::for_resource(Resource::SharedItem, Operation::List, None)
            .unwrap()
            .scope(scope.clone())
            .build()
            .unwrap();

        assert_eq!(descriptor.scope(), &scope);
        assert_eq!(descriptor.path(), "/shared_items");
    }

    #[test]
    fn test_identifiers_are_percent_encoded() {
        assert_eq!(Resource::File.item_path("a/b"), "/files/a%2Fb");
    }
}
