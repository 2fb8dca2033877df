//! Push payload parsing.
//!
//! The server-side admin action sends a JSON object
//! `{ "title": ..., "body": ..., "url": ... }`, every field optional. The
//! payload is untrusted: anything that is not such an object is treated as
//! plain UTF-8 body text rather than failing the push event. One deployed
//! variant of the storefront worker had no such fallback and died on
//! malformed payloads; the fallback behavior is taken as canonical here and
//! the fallback path logs a warning so non-JSON traffic stays visible.

use serde::Deserialize;
use tracing::warn;

/// Structured push message fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    /// Notification title.
    pub title: Option<String>,

    /// Notification body text.
    pub body: Option<String>,

    /// Click-target URL.
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse raw push bytes.
    ///
    /// Returns `None` for an empty payload (the event is a no-op, matching
    /// the original worker's `if (event.data)` guard). A JSON object yields
    /// its fields; anything else becomes plain-text body with no title so
    /// the configured default applies.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        match serde_json::from_slice::<PushPayload>(data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %e, "push payload is not structured JSON, treating as plain text");
                Some(PushPayload {
                    title: None,
                    body: Some(String::from_utf8_lossy(data).into_owned()),
                    url: None,
                })
            }
        }
    }
}
