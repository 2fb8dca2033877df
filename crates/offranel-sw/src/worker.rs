//! The offline worker.
//!
//! [`OfflineWorker`] wires configuration, cache storage, the client
//! registry, the notification shelf, and the network seam into the five
//! service worker event handlers: install, activate, fetch, push, and
//! notification click. Each handler is an `async fn`; awaiting the returned
//! future is the host's `waitUntil` obligation — dropping it mid-flight is
//! the platform terminating the worker.

use std::sync::Arc;

use offranel_common::{OffranelError, OptionExt, Result};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheEntry, CacheStorage};
use crate::clients::ClientRegistry;
use crate::config::WorkerConfig;
use crate::fetch::{FetchRequest, FetchResponse, RemoteFetch};
use crate::lifecycle::{Registration, VersionId};
use crate::notify::{dispatch_click, ClickAction, Notification, NotificationShelf};
use crate::push::PushPayload;

/// Observable worker happenings, for hosts and tests.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// A version finished precaching and installed.
    Installed { version: VersionId },
    /// A version failed to install and was discarded.
    InstallFailed { version: VersionId },
    /// A version took control; stale cache stores were deleted.
    Activated {
        version: VersionId,
        deleted_caches: Vec<String>,
    },
    /// A notification was displayed.
    NotificationShown { tag: String, replaced: bool },
    /// A notification was closed (click or dismissal).
    NotificationClosed { tag: String },
    /// An existing window was brought to the foreground.
    WindowFocused { client: String },
    /// A new window was opened.
    WindowOpened { client: String, url: String },
}

/// The offline cache and notification worker.
pub struct OfflineWorker {
    config: WorkerConfig,
    registration: Arc<RwLock<Registration>>,
    caches: Arc<RwLock<CacheStorage>>,
    clients: Arc<RwLock<ClientRegistry>>,
    shelf: Arc<RwLock<NotificationShelf>>,
    network: Arc<dyn RemoteFetch>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl OfflineWorker {
    /// Create a worker with the given configuration and network layer.
    pub fn new(
        config: WorkerConfig,
        network: Arc<dyn RemoteFetch>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<WorkerEvent>)> {
        config.validate()?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok((
            Self {
                config,
                registration: Arc::new(RwLock::new(Registration::new())),
                caches: Arc::new(RwLock::new(CacheStorage::new())),
                clients: Arc::new(RwLock::new(ClientRegistry::new())),
                shelf: Arc::new(RwLock::new(NotificationShelf::new())),
                network,
                event_tx,
            },
            event_rx,
        ))
    }

    /// The worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Shared cache storage.
    pub fn caches(&self) -> Arc<RwLock<CacheStorage>> {
        Arc::clone(&self.caches)
    }

    /// Shared client registry.
    pub fn clients(&self) -> Arc<RwLock<ClientRegistry>> {
        Arc::clone(&self.clients)
    }

    /// Shared notification shelf.
    pub fn shelf(&self) -> Arc<RwLock<NotificationShelf>> {
        Arc::clone(&self.shelf)
    }

    /// Shared registration.
    pub fn registration(&self) -> Arc<RwLock<Registration>> {
        Arc::clone(&self.registration)
    }

    /// Install handler: precache the configured URLs.
    ///
    /// All URLs are fetched into a staged store which replaces the named
    /// cache in one step; on any failure nothing is committed and the
    /// previously active version stays in control. With `skip_waiting` the
    /// new version activates immediately after a successful install.
    pub async fn install(&self) -> Result<()> {
        let version = self.registration.write().await.start_install();
        info!(version = version.raw(), cache = %self.config.cache_name, "installing");

        match self.precache().await {
            Ok(staged) => {
                self.caches.write().await.replace(staged);
                self.registration.write().await.install_complete();
                let _ = self.event_tx.send(WorkerEvent::Installed { version });

                if self.config.skip_waiting {
                    self.activate().await?;
                }
                Ok(())
            }
            Err(e) => {
                self.registration.write().await.fail_install();
                let _ = self.event_tx.send(WorkerEvent::InstallFailed { version });
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<Cache> {
        let mut staged = Cache::new(&self.config.cache_name);
        for url in &self.config.precache_urls {
            let response = self.network.fetch(url).await?;
            if !response.is_success() {
                return Err(OffranelError::cache(format!(
                    "precache fetch for {url} returned status {}",
                    response.status
                )));
            }
            debug!(url = %url, bytes = response.body.len(), "precached");
            staged.put(CacheEntry::from_response(url, &response));
        }
        Ok(staged)
    }

    /// Activate handler: delete stale cache stores and take control.
    ///
    /// Every store whose name differs from the configured one is deleted
    /// before activation completes; with `claim_clients` all open windows
    /// come under this version's control without a reload.
    pub async fn activate(&self) -> Result<()> {
        let version = self
            .registration
            .write()
            .await
            .activate()
            .ok_or_not_found("waiting worker version")?;

        let deleted = self.caches.write().await.retain_only(&self.config.cache_name);
        for name in &deleted {
            debug!(cache = %name, "deleted stale cache store");
        }

        if self.config.claim_clients {
            let claimed = self.clients.write().await.claim();
            debug!(claimed, "claimed open windows");
        }

        info!(version = version.raw(), deleted = deleted.len(), "activated");
        let _ = self.event_tx.send(WorkerEvent::Activated {
            version,
            deleted_caches: deleted,
        });
        Ok(())
    }

    /// Fetch handler: cache-first.
    ///
    /// A hit in the current store is returned without touching the network;
    /// a miss goes to the network exactly once and the response is returned
    /// unmodified, never stored. A miss plus network failure propagates the
    /// network error; there is no offline fallback page.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let cached = {
            let caches = self.caches.read().await;
            caches
                .match_in(&self.config.cache_name, &request.url)
                .map(FetchResponse::from_entry)
        };

        if let Some(response) = cached {
            debug!(url = %request.url, "cache hit");
            return Ok(response);
        }

        debug!(url = %request.url, "cache miss, going to network");
        self.network.fetch(&request.url).await
    }

    /// Push handler: parse the payload and display a notification.
    ///
    /// An empty payload is a no-op. Display problems are logged, not
    /// propagated; the platform gives the worker no way to recover anyway.
    pub async fn handle_push(&self, data: &[u8]) -> Result<()> {
        let Some(payload) = PushPayload::parse(data) else {
            debug!("push event with empty payload, ignoring");
            return Ok(());
        };

        let notification = Notification::from_payload(&self.config.notification, &payload);
        let tag = notification.tag.clone();
        info!(tag = %tag, title = %notification.title, "showing notification");

        let replaced = self.shelf.write().await.show(notification);
        if replaced {
            debug!(tag = %tag, "replaced notification with same tag");
        }
        let _ = self
            .event_tx
            .send(WorkerEvent::NotificationShown { tag, replaced });
        Ok(())
    }

    /// Notification click handler.
    ///
    /// The notification always closes first, whatever happens next. The
    /// `close` action stops there; the `open` action and a body click focus
    /// an existing window at the site root, or open a new window at the
    /// notification's target URL.
    pub async fn handle_notification_click(
        &self,
        tag: &str,
        action_id: Option<&str>,
    ) -> Result<()> {
        let closed = self.shelf.write().await.close(tag);
        if closed.is_some() {
            let _ = self
                .event_tx
                .send(WorkerEvent::NotificationClosed { tag: tag.to_string() });
        } else {
            warn!(tag = %tag, "click for a notification that is not shown");
        }

        match dispatch_click(action_id) {
            ClickAction::Dismiss => Ok(()),
            ClickAction::OpenTarget => {
                let target = closed
                    .map(|n| n.target_url)
                    .unwrap_or_else(|| self.config.notification.target_url.clone());

                let mut clients = self.clients.write().await;
                if let Some(id) = clients.find_at(&self.config.site_root) {
                    clients.focus(&id)?;
                    let _ = self.event_tx.send(WorkerEvent::WindowFocused { client: id });
                } else {
                    let id = clients.open_window(&target);
                    let _ = self.event_tx.send(WorkerEvent::WindowOpened {
                        client: id,
                        url: target,
                    });
                }
                Ok(())
            }
        }
    }
}
