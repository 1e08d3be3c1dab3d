//! Notification service: recipient-scoped listing, unread counts, and
//! mark-read, plus the cross-component refresh signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::models::{AuthContext, Notification};
use crate::probe::{Availability, Mode};
use crate::services::ChangeSignal;
use crate::store::{LocalStore, StoreExt, NOTIFICATIONS_KEY};

/// How often remote mode refreshes the feed while a session is active.
pub const REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct NotificationService<S: LocalStore> {
    store: Arc<S>,
    gateway: RemoteGateway,
    availability: Availability,
    changes: ChangeSignal,
}

impl<S: LocalStore> NotificationService<S> {
    pub fn new(
        store: Arc<S>,
        gateway: RemoteGateway,
        availability: Availability,
        changes: ChangeSignal,
    ) -> Self {
        Self {
            store,
            gateway,
            availability,
            changes,
        }
    }

    /// Notifications for the given recipient, most recent first.
    ///
    /// The descending creation-time order is a hard contract for the feed.
    pub async fn list(&self, ctx: &AuthContext) -> Result<Vec<Notification>> {
        let mut notifications = match self.availability.mode() {
            Mode::Remote => self.gateway.notifications(ctx).await?,
            Mode::Local => {
                let all: Vec<Notification> =
                    self.store.load_collection_or_default(NOTIFICATIONS_KEY)?;
                all.into_iter()
                    .filter(|notification| notification.is_for(&ctx.user_id))
                    .collect()
            }
        };
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub async fn unread_count(&self, ctx: &AuthContext) -> Result<usize> {
        let notifications = self.list(ctx).await?;
        Ok(notifications
            .iter()
            .filter(|notification| !notification.is_read)
            .count())
    }

    /// Mark every notification for the recipient read. Skips the write
    /// entirely when nothing is unread; other recipients' records are never
    /// touched.
    pub async fn mark_all_read(&self, ctx: &AuthContext) -> Result<()> {
        if self.unread_count(ctx).await? == 0 {
            return Ok(());
        }

        match self.availability.mode() {
            Mode::Remote => self.gateway.mark_notifications_read(ctx).await,
            Mode::Local => {
                let mut all: Vec<Notification> =
                    self.store.load_collection_or_default(NOTIFICATIONS_KEY)?;
                for notification in &mut all {
                    if notification.is_for(&ctx.user_id) {
                        notification.is_read = true;
                    }
                }
                self.store.save_collection(NOTIFICATIONS_KEY, &all)
            }
        }
    }

    /// Subscribe to the "data changed" broadcast. Consumers refresh on each
    /// event; a missed event only means staleness until the next refresh.
    #[must_use]
    pub fn changes(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }

    /// Emit refresh events on a fixed interval while the probe's last
    /// verdict is remote. Aborting the returned handle stops the poller.
    #[must_use]
    pub fn spawn_remote_poller(&self, interval: Duration) -> JoinHandle<()> {
        let availability = self.availability.clone();
        let changes = self.changes.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a fresh interval fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if availability.is_remote() {
                    changes.notify();
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Config;
    use crate::models::{Pin, Role};
    use crate::store::MemoryStore;

    fn service() -> NotificationService<MemoryStore> {
        let config = Config::new("http://127.0.0.1:1/api", "/unused").unwrap();
        let gateway = RemoteGateway::new(&config.api_url).unwrap();
        NotificationService::new(
            Arc::new(MemoryStore::new()),
            gateway,
            Availability::new(),
            ChangeSignal::new(),
        )
    }

    fn ctx(user_id: &str) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            role: Role::User,
        }
    }

    fn pin_owned_by(owner: &str, id: &str) -> Pin {
        Pin {
            id: id.to_string(),
            title: "Sunset".to_string(),
            image_url: "data:image/png;base64,AA==".to_string(),
            author: owner.to_string(),
            user_id: Some(owner.to_string()),
            height_ratio: None,
            liked_by: None,
        }
    }

    fn seed(service: &NotificationService<MemoryStore>, notifications: &[Notification]) {
        service
            .store
            .save_collection(NOTIFICATIONS_KEY, notifications)
            .unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_recipient_and_sorts_descending() {
        let notifications = service();
        let pin = pin_owned_by("alice", "p1");
        let first = Notification::for_like(&pin, &ctx("bob")).unwrap();
        let second = Notification::for_like(&pin, &ctx("carol")).unwrap();
        let foreign = Notification::for_like(&pin_owned_by("dave", "p2"), &ctx("bob")).unwrap();
        seed(&notifications, &[first.clone(), second.clone(), foreign]);

        let inbox = notifications.list(&ctx("alice")).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].id, second.id);
        assert_eq!(inbox[1].id, first.id);
    }

    #[tokio::test]
    async fn unread_count_ignores_read_entries() {
        let notifications = service();
        let pin = pin_owned_by("alice", "p1");
        let mut read = Notification::for_like(&pin, &ctx("bob")).unwrap();
        read.is_read = true;
        let unread = Notification::for_like(&pin, &ctx("carol")).unwrap();
        seed(&notifications, &[read, unread]);

        assert_eq!(notifications.unread_count(&ctx("alice")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mark_all_read_is_idempotent_and_scoped() {
        let notifications = service();
        let mine = Notification::for_like(&pin_owned_by("alice", "p1"), &ctx("bob")).unwrap();
        let theirs = Notification::for_like(&pin_owned_by("dave", "p2"), &ctx("bob")).unwrap();
        seed(&notifications, &[mine, theirs]);

        let alice = ctx("alice");
        notifications.mark_all_read(&alice).await.unwrap();
        assert_eq!(notifications.unread_count(&alice).await.unwrap(), 0);

        // Second call: same unread count, same flags, no new writes.
        notifications.mark_all_read(&alice).await.unwrap();
        assert_eq!(notifications.unread_count(&alice).await.unwrap(), 0);

        // Other recipients' records are untouched.
        assert_eq!(notifications.unread_count(&ctx("dave")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mark_all_read_with_empty_inbox_writes_nothing() {
        let notifications = service();
        notifications.mark_all_read(&ctx("alice")).await.unwrap();
        // The slot was never created.
        assert!(notifications
            .store
            .load_collection::<Notification>(NOTIFICATIONS_KEY)
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn remote_poller_stays_quiet_in_local_mode() {
        let notifications = service();
        let mut changes = notifications.changes();
        let poller = notifications.spawn_remote_poller(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.abort();
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn remote_poller_emits_while_remote() {
        let notifications = service();
        notifications.availability.mark(true);
        let mut changes = notifications.changes();
        let poller = notifications.spawn_remote_poller(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        poller.abort();
        assert!(changes.try_recv().is_ok());
    }
}
