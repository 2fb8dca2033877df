//! Worker configuration.
//!
//! The original storefront worker kept `CACHE_NAME`, the precache list and
//! the notification options as script-level globals. Here they form one
//! immutable [`WorkerConfig`] handed to the worker at construction; nothing
//! writes to it afterwards.

use offranel_common::{OffranelError, Result};

use crate::notify::NotificationAction;

/// Default notification content and presentation.
#[derive(Debug, Clone)]
pub struct NotificationDefaults {
    /// Title used when the push payload carries none.
    pub title: String,

    /// Body used when the push payload carries none.
    pub body: String,

    /// Icon asset path.
    pub icon: String,

    /// Status-bar badge asset path.
    pub badge: String,

    /// Vibration sequence in milliseconds.
    pub vibrate: Vec<u32>,

    /// Dedup tag: a new notification with the same tag replaces the old one.
    pub tag: String,

    /// Alert again when a notification replaces one with the same tag.
    pub renotify: bool,

    /// Click target when the push payload carries no URL.
    pub target_url: String,

    /// Action buttons offered on the notification.
    pub actions: Vec<NotificationAction>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "OFFRANEL 🍊".to_string(),
            body: "Nouvel arrivage disponible !".to_string(),
            icon: "/static/img/image.png".to_string(),
            badge: "/static/img/image.png".to_string(),
            vibrate: vec![200, 100, 200, 100, 200],
            tag: "new-product-alert".to_string(),
            renotify: true,
            target_url: "/".to_string(),
            actions: vec![
                NotificationAction::open("Voir le produit 🛍️"),
                NotificationAction::close("Fermer"),
            ],
        }
    }
}

/// Immutable configuration for the offline worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of the current cache store. Changing it on deployment is the
    /// sole cache-busting mechanism: every other store is deleted at
    /// activation.
    pub cache_name: String,

    /// Site-relative paths fetched and stored at install time.
    pub precache_urls: Vec<String>,

    /// Root URL used to decide whether an already-open window should be
    /// focused instead of opening a duplicate.
    pub site_root: String,

    /// Activate a freshly installed version immediately instead of leaving
    /// it waiting behind the running one.
    pub skip_waiting: bool,

    /// Take control of already-open windows at activation without a reload.
    pub claim_clients: bool,

    /// Notification defaults.
    pub notification: NotificationDefaults,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: "offranel-cache-v1".to_string(),
            precache_urls: vec![
                "/".to_string(),
                "/static/css/style.css".to_string(),
                "/static/img/image.png".to_string(),
            ],
            site_root: "/".to_string(),
            skip_waiting: true,
            claim_clients: true,
            notification: NotificationDefaults::default(),
        }
    }
}

impl WorkerConfig {
    /// Set the cache store name.
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    /// Set the precache list.
    pub fn with_precache_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Keep a new version waiting until the running one releases control.
    pub fn with_skip_waiting(mut self, skip: bool) -> Self {
        self.skip_waiting = skip;
        self
    }

    /// Control whether activation claims open windows.
    pub fn with_claim_clients(mut self, claim: bool) -> Self {
        self.claim_clients = claim;
        self
    }

    /// Check the configuration for values the worker cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.cache_name.is_empty() {
            return Err(OffranelError::config("cache name must not be empty"));
        }
        if self.precache_urls.iter().any(|u| u.is_empty()) {
            return Err(OffranelError::config("precache list contains an empty URL"));
        }
        if self.notification.tag.is_empty() {
            return Err(OffranelError::config("notification tag must not be empty"));
        }
        Ok(())
    }
}
