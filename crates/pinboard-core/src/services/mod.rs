//! Dual-mode services: one operation set, two backing paths.
//!
//! Each service consults the shared [`Availability`] verdict and executes
//! either the remote gateway path or the local store path. Authorization,
//! uniqueness, and notification-generation rules live in the models and are
//! shared by both paths.

pub mod auth;
pub mod notifications;
pub mod pins;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::probe::{Availability, AvailabilityProbe};
use crate::store::{FileStore, LocalStore};

pub use auth::AuthService;
pub use notifications::NotificationService;
pub use pins::PinService;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Broadcast "data changed" signal for cross-component refresh.
///
/// Lossy by contract: a missed signal only means staleness until the next
/// refresh, never corrupted state.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    sender: broadcast::Sender<()>,
}

impl ChangeSignal {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to change events. Subscriptions end when the receiver is
    /// dropped.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Notify all current subscribers. Having none is fine.
    pub fn notify(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The three core services wired over one store, gateway, probe, and
/// change signal.
pub struct Services<S: LocalStore> {
    pub auth: AuthService<S>,
    pub pins: PinService<S>,
    pub notifications: NotificationService<S>,
    availability: Availability,
}

impl Services<FileStore> {
    /// Open the services over a filesystem store at the configured data dir.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        Self::with_store(store, config)
    }
}

impl<S: LocalStore> Services<S> {
    /// Wire the services over an explicit store (tests use [`MemoryStore`]).
    ///
    /// [`MemoryStore`]: crate::store::MemoryStore
    pub fn with_store(store: Arc<S>, config: &Config) -> Result<Self> {
        let availability = Availability::new();
        let probe = AvailabilityProbe::new(&config.api_url, config.probe_timeout, availability.clone())?;
        let gateway = RemoteGateway::new(&config.api_url)?;
        let changes = ChangeSignal::new();

        Ok(Self {
            auth: AuthService::new(Arc::clone(&store), gateway.clone(), availability.clone()),
            pins: PinService::new(
                Arc::clone(&store),
                gateway.clone(),
                probe,
                availability.clone(),
                changes.clone(),
            ),
            notifications: NotificationService::new(store, gateway, availability.clone(), changes),
            availability,
        })
    }

    /// The shared last-known availability verdict, for status indicators.
    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability.clone()
    }
}
