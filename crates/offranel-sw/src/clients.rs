//! Window clients.
//!
//! Models the pages the worker controls: enumerate open windows, focus one,
//! open a new one, and claim control at activation. The notification click
//! path reuses an existing window showing the site root instead of opening
//! a duplicate.

use hashbrown::HashMap;
use offranel_common::{OptionExt, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// An open window controlled by (or visible to) the worker.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client identifier.
    pub id: String,

    /// URL the window is showing.
    pub url: String,

    /// Whether the window is in the foreground.
    pub focused: bool,

    /// Whether this worker controls the window.
    pub controlled: bool,
}

fn next_client_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("client-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Registry of open windows.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-open, uncontrolled window. Returns its id.
    pub fn add_window(&mut self, url: impl Into<String>) -> String {
        let id = next_client_id();
        self.clients.insert(
            id.clone(),
            Client {
                id: id.clone(),
                url: url.into(),
                focused: false,
                controlled: false,
            },
        );
        id
    }

    /// Get a client by id.
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Remove a closed window.
    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    /// All open windows.
    pub fn match_all(&self) -> Vec<&Client> {
        self.clients.values().collect()
    }

    /// Number of open windows.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no windows are open.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Find an open window showing exactly this URL.
    pub fn find_at(&self, url: &str) -> Option<String> {
        self.clients
            .values()
            .find(|c| c.url == url)
            .map(|c| c.id.clone())
    }

    /// Bring a window to the foreground, unfocusing the others.
    pub fn focus(&mut self, id: &str) -> Result<()> {
        self.clients
            .get(id)
            .ok_or_not_found(format!("client {id}"))?;
        for client in self.clients.values_mut() {
            client.focused = client.id == id;
        }
        debug!(client = id, "focused window");
        Ok(())
    }

    /// Open a new focused window at a URL. Returns its id.
    pub fn open_window(&mut self, url: impl Into<String>) -> String {
        let url = url.into();
        for client in self.clients.values_mut() {
            client.focused = false;
        }
        let id = next_client_id();
        self.clients.insert(
            id.clone(),
            Client {
                id: id.clone(),
                url: url.clone(),
                focused: true,
                controlled: true,
            },
        );
        debug!(client = %id, url = %url, "opened window");
        id
    }

    /// Take control of every open window without a reload.
    pub fn claim(&mut self) -> usize {
        let mut claimed = 0;
        for client in self.clients.values_mut() {
            if !client.controlled {
                client.controlled = true;
                claimed += 1;
            }
        }
        claimed
    }
}
