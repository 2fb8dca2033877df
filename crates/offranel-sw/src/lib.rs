//! # Offranel Service Worker
//!
//! Offline caching and push notifications for the Offranel storefront,
//! modeled as an explicit service worker engine.
//!
//! ## Features
//!
//! - **Install**: atomic precache of the configured asset list
//! - **Activate**: stale cache store cleanup, client claiming
//! - **Fetch**: cache-first interception with a pluggable network seam
//! - **Push**: untrusted payload parsing with plain-text fallback
//! - **Notification click**: explicit action dispatch, window focus/reuse
//!
//! ## Architecture
//!
//! ```text
//! OfflineWorker
//!     ├── WorkerConfig        (cache name, precache list, defaults)
//!     ├── Registration        (installing / waiting / active versions)
//!     ├── CacheStorage        (name → Cache → URL → CacheEntry)
//!     ├── ClientRegistry      (open windows: focus, open, claim)
//!     ├── NotificationShelf   (shown notifications, keyed by tag)
//!     └── dyn RemoteFetch     (network; HttpFetch over reqwest)
//! ```
//!
//! The host drives the worker by awaiting the handler futures; that await
//! is the `event.waitUntil` contract of the web platform.

pub mod cache;
pub mod clients;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod notify;
pub mod push;
pub mod worker;

pub use cache::{Cache, CacheEntry, CacheStorage};
pub use clients::{Client, ClientRegistry};
pub use config::{NotificationDefaults, WorkerConfig};
pub use fetch::{FetchRequest, FetchResponse, HttpFetch, RemoteFetch};
pub use lifecycle::{Registration, VersionId, WorkerState, WorkerVersion};
pub use notify::{
    dispatch_click, ClickAction, Notification, NotificationAction, NotificationShelf,
};
pub use push::PushPayload;
pub use worker::{OfflineWorker, WorkerEvent};

pub use offranel_common::{OffranelError, Result};
