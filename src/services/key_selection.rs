//! Upstream credential handle and the optional "select an API key" host hook.

use crate::error::{GenerationError, Result};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::oneshot;

/// Shared, swappable upstream credential.
///
/// The key-selection flow writes a new value; every request reads the
/// current one.
#[derive(Debug, Clone, Default)]
pub struct ApiCredential {
    inner: Arc<RwLock<String>>,
}

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(key.into())),
        }
    }

    /// Current key, `None` when blank.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        let key = match self.inner.read() {
            Ok(guard) => guard.trim().to_string(),
            Err(poisoned) => poisoned.into_inner().trim().to_string(),
        };
        (!key.is_empty()).then_some(key)
    }

    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        match self.inner.write() {
            Ok(mut guard) => *guard = key,
            Err(poisoned) => *poisoned.into_inner() = key,
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current().is_some()
    }
}

/// Host capability for choosing which API key the video path uses.
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// Whether the host offers key selection at all.
    fn is_available(&self) -> bool;

    async fn has_selected_key(&self) -> bool;

    /// Opens the selection flow and waits until the user is done with it.
    async fn open_select_key(&self) -> Result<()>;
}

/// Default for hosts without key selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopKeySelector;

#[async_trait]
impl KeySelector for NoopKeySelector {
    fn is_available(&self) -> bool {
        false
    }

    async fn has_selected_key(&self) -> bool {
        true
    }

    async fn open_select_key(&self) -> Result<()> {
        Ok(())
    }
}

/// A pending request for the UI to collect a key.
#[derive(Debug)]
pub struct KeyRequest {
    pub responder: oneshot::Sender<Option<String>>,
}

/// Key selection backed by the terminal UI's key dialog.
///
/// `open_select_key` hands a [`KeyRequest`] to the UI thread and waits for
/// the dialog to answer. A submitted key replaces the shared credential.
pub struct DialogKeySelector {
    credential: ApiCredential,
    requests: std::sync::mpsc::Sender<KeyRequest>,
}

impl DialogKeySelector {
    pub fn new(credential: ApiCredential, requests: std::sync::mpsc::Sender<KeyRequest>) -> Self {
        Self {
            credential,
            requests,
        }
    }
}

#[async_trait]
impl KeySelector for DialogKeySelector {
    fn is_available(&self) -> bool {
        true
    }

    async fn has_selected_key(&self) -> bool {
        self.credential.is_set()
    }

    async fn open_select_key(&self) -> Result<()> {
        let (responder, answer) = oneshot::channel();
        self.requests
            .send(KeyRequest { responder })
            .map_err(|_| GenerationError::MissingCredential)?;

        match answer.await {
            Ok(Some(key)) if !key.trim().is_empty() => {
                self.credential.set(key.trim());
                tracing::info!("api key selected through dialog");
                Ok(())
            }
            Ok(_) => {
                tracing::info!("key dialog dismissed without a key");
                Ok(())
            }
            Err(_) => Err(GenerationError::MissingCredential),
        }
    }
}
