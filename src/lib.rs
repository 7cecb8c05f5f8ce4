//! sastoken - Shared Access Signature tokens for device provisioning
//!
//! A device enrolling with a provisioning service must prove it holds the
//! enrollment's symmetric key without ever transmitting the key itself.
//! Given a service scope, the client:
//! 1. Builds the canonical resource path `<scope>/registrations/<id>`
//! 2. Signs `resource + "\n" + expiry` with HMAC-SHA256 keyed by the
//!    base64-decoded symmetric key
//! 3. Serializes the result as a one-hour `SharedAccessSignature` token
//!    the transport can present as an authorization header value
//!
//! Signing is stateless and safe to invoke concurrently; the only external
//! dependency is the wall clock. Out of scope here: key storage and
//! rotation, token revocation, and server-side verification.

mod client;
mod error;
mod sas;

pub use client::SymmetricKeyClient;
pub use error::{Error, Result};
pub use sas::{an_hour_from_now, SharedAccessSignature};
