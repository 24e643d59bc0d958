//! Per-request authentication scope

/// Optional shared-link and on-behalf-of scope applied when a request is
/// signed.
///
/// A scope is copied into every [`RequestDescriptor`](crate::request::RequestDescriptor)
/// when the descriptor is built, so concurrent calls never observe each
/// other's scope. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthScope {
    shared_link: Option<String>,
    on_behalf_of: Option<String>,
}

impl AuthScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`AuthScope::set_shared_link`].
    #[must_use]
    pub fn with_shared_link(mut self, link: impl Into<String>) -> Self {
        self.set_shared_link(link);
        self
    }

    /// Builder form of [`AuthScope::set_on_behalf_of`].
    #[must_use]
    pub fn with_on_behalf_of(mut self, user_login: impl Into<String>) -> Self {
        self.set_on_behalf_of(user_login);
        self
    }

    pub fn set_shared_link(&mut self, link: impl Into<String>) {
        self.shared_link = non_empty(link.into());
    }

    pub fn clear_shared_link(&mut self) {
        self.shared_link = None;
    }

    pub fn set_on_behalf_of(&mut self, user_login: impl Into<String>) {
        self.on_behalf_of = non_empty(user_login.into());
    }

    pub fn clear_on_behalf_of(&mut self) {
        self.on_behalf_of = None;
    }

    #[must_use]
    pub fn shared_link(&self) -> Option<&str> {
        self.shared_link.as_deref()
    }

    #[must_use]
    pub fn on_behalf_of(&self) -> Option<&str> {
        self.on_behalf_of.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared_link.is_none() && self.on_behalf_of.is_none()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
