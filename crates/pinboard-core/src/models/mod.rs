//! Data models shared by both operating modes.

pub mod notification;
pub mod pin;
pub mod user;

pub use notification::{Notification, NotificationKind};
pub use pin::{initial_pins, LikeToggle, Pin};
pub use user::{AuthContext, Role, User, UserRecord, ADMIN_USERNAME};
