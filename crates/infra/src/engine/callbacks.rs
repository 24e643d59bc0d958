//! Callback-style execution
//!
//! For callers that take completion callbacks instead of awaiting: the
//! request runs on a spawned task and the result is delivered to exactly one
//! of two callbacks. Needs an ambient tokio runtime; synchronous callers go
//! through [`BlockingBoxClient::execute_with_callbacks`], which provides one.
//!
//! [`BlockingBoxClient::execute_with_callbacks`]: crate::blocking::BlockingBoxClient::execute_with_callbacks

use boxapi_domain::{BoxError, Result};
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use super::RequestEngine;
use crate::request::RequestDescriptor;

impl RequestEngine {
    /// Run `descriptor` in the background.
    ///
    /// `on_success` receives the typed payload; `on_failure`, if given,
    /// receives the classified error. A missing `on_success` is rejected
    /// before anything is sent.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` when `on_success` is `None`,
    /// `BoxError::Config` when called outside a tokio runtime.
    pub fn execute_with_callbacks<T, S, F>(
        &self,
        descriptor: RequestDescriptor,
        on_success: Option<S>,
        on_failure: Option<F>,
    ) -> Result<JoinHandle<()>>
    where
        T: DeserializeOwned + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(BoxError) + Send + 'static,
    {
        let on_success = on_success.ok_or_else(|| BoxError::missing("on_success"))?;
        let runtime = Handle::try_current()
            .map_err(|e| BoxError::Config(format!("no async runtime available: {e}")))?;

        let engine = self.clone();
        Ok(runtime.spawn(async move {
            match engine.execute::<T>(&descriptor).await {
                Ok(value) => on_success(value),
                Err(err) => match on_failure {
                    Some(on_failure) => on_failure(err),
                    None => debug!(error = %err, "request failed with no failure callback"),
                },
            }
        }))
    }
}
