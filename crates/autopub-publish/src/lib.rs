//! Publication of finished videos to a user's connected accounts.
//!
//! YouTube is the primary target and decides the outcome; Google Drive
//! is an optional, best-effort secondary copy. Credentials are per-user
//! OAuth tokens refreshed transparently when a refresh token exists.

pub mod credentials;
pub mod drive;
pub mod error;
pub mod publisher;
pub mod youtube;

pub use credentials::{CredentialStore, Provider, StoredCredential};
pub use drive::DriveClient;
pub use error::{PublishError, PublishResult};
pub use publisher::{PublishRequest, Publisher};
pub use youtube::YouTubeClient;
