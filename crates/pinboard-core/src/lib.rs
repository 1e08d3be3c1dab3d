//! pinboard-core - Core library for Pinboard
//!
//! This crate contains the shared models, the dual-mode data layer
//! (remote API or local persisted store), and the business rules shared
//! by every Pinboard interface.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod probe;
pub mod services;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use models::{AuthContext, Notification, Pin, Role, User};
pub use probe::Mode;
