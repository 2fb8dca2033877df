//! Notifications.
//!
//! [`Notification`] is the OS-level alert built from a push payload and the
//! configured defaults. Shown notifications live on a [`NotificationShelf`]
//! keyed by dedup tag, so a repeated push replaces the previous alert
//! instead of stacking. Click dispatch is an explicit mapping from action
//! identifier to [`ClickAction`]; the original worker declared its action
//! buttons but never branched on them, which turned "Fermer" into a silent
//! navigation.

use hashbrown::HashMap;
use tracing::warn;

use crate::config::NotificationDefaults;
use crate::push::PushPayload;

/// Action identifier for the "open" button.
pub const ACTION_OPEN: &str = "open";
/// Action identifier for the "close" button.
pub const ACTION_CLOSE: &str = "close";

/// An action button offered on a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    /// Platform action identifier reported back on click.
    pub id: String,

    /// Button label.
    pub title: String,
}

impl NotificationAction {
    /// The "open the product" button.
    pub fn open(title: impl Into<String>) -> Self {
        Self {
            id: ACTION_OPEN.to_string(),
            title: title.into(),
        }
    }

    /// The "dismiss" button.
    pub fn close(title: impl Into<String>) -> Self {
        Self {
            id: ACTION_CLOSE.to_string(),
            title: title.into(),
        }
    }
}

/// What a notification click should do, after the notification closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Focus an existing window at the site root or open the target URL.
    OpenTarget,
    /// Nothing beyond dismissing the notification.
    Dismiss,
}

/// Map a click's action identifier to its behavior.
///
/// `None` is a click on the notification body. An unrecognized identifier
/// dismisses rather than navigating, with a warning.
pub fn dispatch_click(action_id: Option<&str>) -> ClickAction {
    match action_id {
        None => ClickAction::OpenTarget,
        Some(ACTION_OPEN) => ClickAction::OpenTarget,
        Some(ACTION_CLOSE) => ClickAction::Dismiss,
        Some(other) => {
            warn!(action = other, "unknown notification action, dismissing");
            ClickAction::Dismiss
        }
    }
}

/// A displayed (or displayable) notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title line.
    pub title: String,

    /// Body text.
    pub body: String,

    /// Icon asset path.
    pub icon: String,

    /// Status-bar badge asset path.
    pub badge: String,

    /// Vibration sequence in milliseconds.
    pub vibrate: Vec<u32>,

    /// Dedup tag.
    pub tag: String,

    /// Alert again when replacing a notification with the same tag.
    pub renotify: bool,

    /// URL navigated to on click.
    pub target_url: String,

    /// Action buttons.
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build a notification from a parsed payload, filling every missing
    /// field from the configured defaults.
    pub fn from_payload(defaults: &NotificationDefaults, payload: &PushPayload) -> Self {
        Self {
            title: payload.title.clone().unwrap_or_else(|| defaults.title.clone()),
            body: payload.body.clone().unwrap_or_else(|| defaults.body.clone()),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            tag: defaults.tag.clone(),
            renotify: defaults.renotify,
            target_url: payload
                .url
                .clone()
                .unwrap_or_else(|| defaults.target_url.clone()),
            actions: defaults.actions.clone(),
        }
    }
}

/// The set of currently displayed notifications, keyed by tag.
#[derive(Debug, Default)]
pub struct NotificationShelf {
    shown: HashMap<String, Notification>,
}

impl NotificationShelf {
    /// Create an empty shelf.
    pub fn new() -> Self {
        Self::default()
    }

    /// Display a notification. Returns `true` when it replaced an existing
    /// one with the same tag.
    pub fn show(&mut self, notification: Notification) -> bool {
        self.shown
            .insert(notification.tag.clone(), notification)
            .is_some()
    }

    /// Close a notification by tag, returning it if it was shown.
    pub fn close(&mut self, tag: &str) -> Option<Notification> {
        self.shown.remove(tag)
    }

    /// Get a displayed notification by tag.
    pub fn get(&self, tag: &str) -> Option<&Notification> {
        self.shown.get(tag)
    }

    /// Number of displayed notifications.
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    /// Whether nothing is displayed.
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> NotificationDefaults {
        NotificationDefaults::default()
    }

    #[test]
    fn test_from_payload_uses_payload_fields() {
        let payload = PushPayload {
            title: Some("New Drop".to_string()),
            body: Some("Fresh stock!".to_string()),
            url: Some("/p/42".to_string()),
        };
        let n = Notification::from_payload(&defaults(), &payload);

        assert_eq!(n.title, "New Drop");
        assert_eq!(n.body, "Fresh stock!");
        assert_eq!(n.target_url, "/p/42");
        assert_eq!(n.tag, "new-product-alert");
    }

    #[test]
    fn test_from_payload_fills_defaults() {
        let n = Notification::from_payload(&defaults(), &PushPayload::default());

        assert_eq!(n.title, "OFFRANEL 🍊");
        assert_eq!(n.body, "Nouvel arrivage disponible !");
        assert_eq!(n.target_url, "/");
        assert_eq!(n.vibrate, vec![200, 100, 200, 100, 200]);
        assert!(n.renotify);
    }

    #[test]
    fn test_dispatch_click_mapping() {
        assert_eq!(dispatch_click(None), ClickAction::OpenTarget);
        assert_eq!(dispatch_click(Some(ACTION_OPEN)), ClickAction::OpenTarget);
        assert_eq!(dispatch_click(Some(ACTION_CLOSE)), ClickAction::Dismiss);
        assert_eq!(dispatch_click(Some("share")), ClickAction::Dismiss);
    }

    #[test]
    fn test_shelf_tag_dedup() {
        let mut shelf = NotificationShelf::new();

        let first = Notification::from_payload(&defaults(), &PushPayload::default());
        let second = Notification::from_payload(
            &defaults(),
            &PushPayload {
                title: Some("Second".to_string()),
                ..Default::default()
            },
        );

        assert!(!shelf.show(first));
        assert!(shelf.show(second));
        assert_eq!(shelf.len(), 1);
        assert_eq!(
            shelf.get("new-product-alert").map(|n| n.title.as_str()),
            Some("Second")
        );
    }

    #[test]
    fn test_shelf_close() {
        let mut shelf = NotificationShelf::new();
        shelf.show(Notification::from_payload(&defaults(), &PushPayload::default()));

        let closed = shelf.close("new-product-alert");
        assert!(closed.is_some());
        assert!(shelf.is_empty());
        assert!(shelf.close("new-product-alert").is_none());
    }
}
