//! HTTP client for the VetAnemia prediction backend.
//!
//! [`VetClient`] wraps every endpoint the dashboard talks to and also serves
//! as the [`IdentityProvider`](vetanemia_session::IdentityProvider) behind the
//! session user cache.

pub mod client;
pub mod error;
mod identity;

pub use client::VetClient;
pub use error::{ClientError, Result};
