// remi-api: Async Rust client for the UrbanHello Remi cloud (Parse Server)

pub mod auth;
pub mod client;
pub mod device;
pub mod error;
pub mod events;
pub mod login;
pub mod models;
pub mod transport;

pub use auth::{Credentials, Reauth, Session};
pub use client::RemiClient;
pub use error::Error;
pub use models::{
    CreatedObject, Event, Face, ParseDate, Pointer, Remi, Rgb, ServerConfig, UpdateResponse,
};
pub use transport::{DEFAULT_BASE_URL, TransportConfig};
