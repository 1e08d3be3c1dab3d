//! Pin service: CRUD and like toggling over the dual-mode data layer.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gateway::{RemoteGateway, UploadImage};
use crate::models::pin::{initial_pins, LikeToggle, Pin};
use crate::models::{AuthContext, Notification};
use crate::probe::{Availability, AvailabilityProbe, Mode};
use crate::services::ChangeSignal;
use crate::store::{LocalStore, StoreExt, NOTIFICATIONS_KEY, PINS_KEY};
use crate::util::data_url;

pub struct PinService<S: LocalStore> {
    store: Arc<S>,
    gateway: RemoteGateway,
    probe: AvailabilityProbe,
    availability: Availability,
    changes: ChangeSignal,
}

impl<S: LocalStore> PinService<S> {
    pub fn new(
        store: Arc<S>,
        gateway: RemoteGateway,
        probe: AvailabilityProbe,
        availability: Availability,
        changes: ChangeSignal,
    ) -> Self {
        Self {
            store,
            gateway,
            probe,
            availability,
            changes,
        }
    }

    /// Full feed refresh, most-recent-first.
    ///
    /// Re-probes availability on every call, so the operating mode can flip
    /// between refreshes. A remote fetch failure after a successful probe
    /// demotes the session to local mode and serves the local copy.
    pub async fn list(&self) -> Result<Vec<Pin>> {
        if self.probe.check().await {
            match self.gateway.list_pins().await {
                Ok(pins) => return Ok(pins),
                Err(error) => {
                    tracing::warn!("remote pin fetch failed, falling back to local store: {error}");
                    self.availability.mark(false);
                }
            }
        }
        self.load_local_pins()
    }

    /// Upload a new pin. Requires a non-empty title and image.
    pub async fn create(&self, title: &str, image: UploadImage, ctx: &AuthContext) -> Result<Pin> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("pin title must not be empty".to_string()));
        }
        if image.is_empty() {
            return Err(Error::InvalidInput("pin image must not be empty".to_string()));
        }

        match self.availability.mode() {
            Mode::Remote => self.gateway.create_pin(title, image, ctx).await,
            Mode::Local => {
                let embedded = data_url(&image.content_type, &image.bytes);
                let pin = Pin::new_local(title, embedded, ctx);
                let mut pins = self.load_local_pins()?;
                pins.insert(0, pin.clone());
                self.store.save_collection(PINS_KEY, &pins)?;
                Ok(pin)
            }
        }
    }

    /// Retitle a pin. Permitted for the owner or an admin only; a missing
    /// pin is an error in both modes.
    pub async fn update(&self, pin_id: &str, title: &str, ctx: &AuthContext) -> Result<Pin> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("pin title must not be empty".to_string()));
        }

        match self.availability.mode() {
            Mode::Remote => self.gateway.update_pin(pin_id, title, ctx).await,
            Mode::Local => {
                let mut pins = self.load_local_pins()?;
                let pin = pins
                    .iter_mut()
                    .find(|pin| pin.id == pin_id)
                    .ok_or_else(|| Error::NotFound(pin_id.to_string()))?;
                if !pin.can_be_modified_by(ctx) {
                    return Err(Error::Unauthorized);
                }
                pin.title = title.to_string();
                let updated = pin.clone();
                self.store.save_collection(PINS_KEY, &pins)?;
                Ok(updated)
            }
        }
    }

    /// Delete a pin under the same ownership rule as [`update`].
    ///
    /// Notifications referencing the pin are cascaded away in both modes
    /// (the server handles it on the remote path).
    ///
    /// [`update`]: Self::update
    pub async fn delete(&self, pin_id: &str, ctx: &AuthContext) -> Result<()> {
        match self.availability.mode() {
            Mode::Remote => self.gateway.delete_pin(pin_id, ctx).await,
            Mode::Local => {
                let mut pins = self.load_local_pins()?;
                let position = pins
                    .iter()
                    .position(|pin| pin.id == pin_id)
                    .ok_or_else(|| Error::NotFound(pin_id.to_string()))?;
                if !pins[position].can_be_modified_by(ctx) {
                    return Err(Error::Unauthorized);
                }
                pins.remove(position);
                self.store.save_collection(PINS_KEY, &pins)?;
                self.cascade_notifications(pin_id)?;
                Ok(())
            }
        }
    }

    /// Toggle the acting user's like on a pin.
    ///
    /// A like on a pin with a known owner distinct from the actor emits
    /// exactly one notification; the unlike half of the toggle never does.
    /// Local ordering: the pin collection is persisted first, then the
    /// notification; a failure between the two surfaces to the caller.
    pub async fn toggle_like(&self, pin_id: &str, ctx: &AuthContext) -> Result<Pin> {
        match self.availability.mode() {
            Mode::Remote => self.gateway.toggle_like(pin_id, ctx).await,
            Mode::Local => {
                let mut pins = self.load_local_pins()?;
                let pin = pins
                    .iter_mut()
                    .find(|pin| pin.id == pin_id)
                    .ok_or_else(|| Error::NotFound(pin_id.to_string()))?;
                let outcome = pin.toggle_like(&ctx.user_id);
                let updated = pin.clone();
                self.store.save_collection(PINS_KEY, &pins)?;

                if outcome == LikeToggle::Liked {
                    if let Some(notification) = Notification::for_like(&updated, ctx) {
                        let mut notifications: Vec<Notification> =
                            self.store.load_collection_or_default(NOTIFICATIONS_KEY)?;
                        notifications.insert(0, notification);
                        self.store
                            .save_collection(NOTIFICATIONS_KEY, &notifications)?;
                    }
                }

                self.changes.notify();
                Ok(updated)
            }
        }
    }

    /// Load the local pin collection, seeding the fixed example set on
    /// first use. Absent and empty are distinct: an emptied board stays
    /// empty.
    fn load_local_pins(&self) -> Result<Vec<Pin>> {
        match self.store.load_collection::<Pin>(PINS_KEY)? {
            Some(pins) => Ok(pins),
            None => {
                let pins = initial_pins();
                self.store.save_collection(PINS_KEY, &pins)?;
                Ok(pins)
            }
        }
    }

    fn cascade_notifications(&self, pin_id: &str) -> Result<()> {
        let mut notifications: Vec<Notification> =
            self.store.load_collection_or_default(NOTIFICATIONS_KEY)?;
        let before = notifications.len();
        notifications.retain(|notification| notification.pin_id != pin_id);
        if notifications.len() != before {
            self.store
                .save_collection(NOTIFICATIONS_KEY, &notifications)?;
            self.changes.notify();
        }
        Ok(())
    }
}
