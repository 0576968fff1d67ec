//! Provider-facing configuration (data) and identity mapping (behavior).
//!
//! `config` exposes the validated [`ProviderConfig`] covering consumer credentials, the three
//! OAuth 1.0a endpoints, signing preferences, authorize-page display parameters, and the optional
//! identity endpoint. `mapping` turns the identity endpoint's record into an
//! [`Identity`](crate::auth::Identity). `trello` ships the Trello preset.

pub mod config;
pub mod mapping;
pub mod trello;

pub use config::*;
pub use mapping::*;
