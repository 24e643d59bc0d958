use std::io;
use std::sync::{Arc, Mutex};

use boxapi_domain::{ClientConfig, OAuthCredentials, TokenSet};
use boxapi_infra::BoxClient;
use serde_json::{json, Value};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::MockServer;

pub const API_KEY: &str = "K";
pub const AUTH_TOKEN: &str = "T";

/// Client using the legacy scheme against `server`.
pub fn legacy_client(server: &MockServer) -> BoxClient {
    BoxClient::with_legacy(ClientConfig::with_base_url(server.uri()), API_KEY, Some(AUTH_TOKEN))
        .expect("legacy client should be created")
}

/// Client using OAuth2 against `server`, holding `refresh_token`.
pub fn oauth_client(server: &MockServer, access_token: &str, refresh_token: &str) -> BoxClient {
    BoxClient::with_oauth2(
        ClientConfig::with_base_url(server.uri()),
        OAuthCredentials::new("client-id", "client-secret"),
        TokenSet::new(access_token.to_string(), Some(refresh_token.to_string()), 3600),
    )
    .expect("oauth client should be created")
}

/// A single error object as the service sends it.
pub fn error_body(status: u16, code: &str) -> Value {
    json!({
        "type": "error",
        "status": status,
        "code": code,
        "help_url": "http://developers.box.com/docs/#errors",
        "message": code.replace('_', " "),
        "request_id": format!("req-{status}")
    })
}

/// Buffer collecting formatted tracing output.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Handle for inspecting log output captured on the current thread.
pub struct LogCapture {
    buffer: SharedBuffer,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.0.lock().expect("log buffer poisoned")).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.output().contains(needle)
    }
}

/// Capture `DEBUG` and above for the current thread until the handle drops.
///
/// Only sees events emitted on this thread, which covers `#[tokio::test]`'s
/// current-thread runtime.
pub fn capture_logs() -> LogCapture {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();

    LogCapture { buffer, _guard: tracing::subscriber::set_default(subscriber) }
}
