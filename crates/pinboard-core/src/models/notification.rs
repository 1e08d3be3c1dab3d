//! Notification model.

use serde::{Deserialize, Serialize};

use crate::models::pin::Pin;
use crate::models::user::AuthContext;
use crate::util::{new_id, unique_millis};

/// Message text attached to every like notification.
pub const LIKE_MESSAGE: &str = "liked your pin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
}

/// A notification event delivered to a pin owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub pin_id: String,
    pub pin_image: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

impl Notification {
    /// Build the notification for a like on `pin` by `liker`.
    ///
    /// Returns `None` when the pin has no owner or the liker owns it;
    /// self-likes and likes on unclaimed pins never notify anyone. This is
    /// the single place that rule lives.
    #[must_use]
    pub fn for_like(pin: &Pin, liker: &AuthContext) -> Option<Self> {
        let recipient_id = pin.user_id.as_deref()?;
        if recipient_id == liker.user_id {
            return None;
        }

        Some(Self {
            id: new_id(),
            recipient_id: recipient_id.to_string(),
            sender_id: liker.user_id.clone(),
            sender_name: liker.username.clone(),
            kind: NotificationKind::Like,
            pin_id: pin.id.clone(),
            pin_image: pin.image_url.clone(),
            message: LIKE_MESSAGE.to_string(),
            is_read: false,
            created_at: unique_millis(),
        })
    }

    #[must_use]
    pub fn is_for(&self, user_id: &str) -> bool {
        self.recipient_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::user::Role;

    fn liker(user_id: &str) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            role: Role::User,
        }
    }

    fn owned_pin(owner: Option<&str>) -> Pin {
        Pin {
            id: "p1".to_string(),
            title: "Sunset".to_string(),
            image_url: "https://example.com/sunset.jpg".to_string(),
            author: "alice".to_string(),
            user_id: owner.map(ToString::to_string),
            height_ratio: None,
            liked_by: None,
        }
    }

    #[test]
    fn like_on_owned_pin_notifies_owner() {
        let notification = Notification::for_like(&owned_pin(Some("alice")), &liker("bob")).unwrap();
        assert_eq!(notification.recipient_id, "alice");
        assert_eq!(notification.sender_id, "bob");
        assert_eq!(notification.message, LIKE_MESSAGE);
        assert!(!notification.is_read);
    }

    #[test]
    fn self_like_never_notifies() {
        assert!(Notification::for_like(&owned_pin(Some("bob")), &liker("bob")).is_none());
    }

    #[test]
    fn like_on_unclaimed_pin_never_notifies() {
        assert!(Notification::for_like(&owned_pin(None), &liker("bob")).is_none());
    }

    #[test]
    fn timestamps_are_strictly_ordered() {
        let pin = owned_pin(Some("alice"));
        let first = Notification::for_like(&pin, &liker("bob")).unwrap();
        let second = Notification::for_like(&pin, &liker("carol")).unwrap();
        assert!(second.created_at > first.created_at);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn notification_round_trips_field_for_field() {
        let notification = Notification::for_like(&owned_pin(Some("alice")), &liker("bob")).unwrap();
        let decoded: Notification =
            serde_json::from_str(&serde_json::to_string(&notification).unwrap()).unwrap();
        assert_eq!(notification, decoded);
    }

    #[test]
    fn wire_type_field_is_like() {
        let notification = Notification::for_like(&owned_pin(Some("alice")), &liker("bob")).unwrap();
        let serialized = serde_json::to_string(&notification).unwrap();
        assert!(serialized.contains("\"type\":\"like\""));
        assert!(serialized.contains("\"recipientId\""));
        assert!(serialized.contains("\"isRead\""));
    }
}
