//! Registration client for symmetric-key provisioning
//!
//! Holds the long-lived enrollment identity (registration id + symmetric
//! key) and mints scope-bound authentication tokens on demand. The identity
//! is bound once at construction and never mutated; the key lives in a
//! zeroize-on-drop wrapper so it is wiped when the client goes away.
//!
//! The client keeps the most recently issued token purely as a convenience.
//! Each call returns its own freshly signed token, and that return value is
//! the authoritative one; concurrent callers race only on which token is
//! visible as last-issued.

use std::sync::Mutex;

use log::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::sas::{an_hour_from_now, SharedAccessSignature};

/// Key name stamped into every provisioning token, tying it to the
/// registration flow specifically.
const REGISTRATION_KEY_NAME: &str = "registration";

/// Wrapper for the base64 symmetric key that guarantees zeroization
#[derive(Zeroize, ZeroizeOnDrop)]
struct SymmetricKey(String);

/// A device's enrollment identity plus token-minting operations.
pub struct SymmetricKeyClient {
    registration_id: String,
    key: SymmetricKey,
    current: Mutex<Option<SharedAccessSignature>>,
}

impl SymmetricKeyClient {
    /// Bind a registration id and its base64-encoded symmetric key.
    ///
    /// The key is not validated here; a malformed key surfaces as an
    /// invalid-argument error on the first token-minting call.
    pub fn new(registration_id: impl Into<String>, symmetric_key: impl Into<String>) -> Self {
        Self {
            registration_id: registration_id.into(),
            key: SymmetricKey(symmetric_key.into()),
            current: Mutex::new(None),
        }
    }

    /// The registration id originally provided to the client.
    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    /// Mint an authentication token scoped to `id_scope`, valid for one
    /// hour from now.
    ///
    /// The token authorizes the canonical resource
    /// `<id_scope>/registrations/<registration_id>`. Repeated calls with
    /// the same scope at different times yield different expiries and
    /// signatures over the identical resource.
    ///
    /// Fails with [`Error::MissingArgument`] if `id_scope` is empty and
    /// [`Error::InvalidArgument`] if the stored key is not valid base64.
    pub fn create_authentication_token(&self, id_scope: &str) -> Result<SharedAccessSignature> {
        self.token_for_scope(id_scope, an_hour_from_now())
    }

    /// The most recently issued token, if any. A convenience cache only;
    /// callers must treat each minting call's return value as the
    /// authoritative token.
    pub fn last_token(&self) -> Option<SharedAccessSignature> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    fn token_for_scope(&self, id_scope: &str, expiry: u64) -> Result<SharedAccessSignature> {
        if id_scope.is_empty() {
            return Err(Error::MissingArgument("id_scope"));
        }

        let resource = format!("{id_scope}/registrations/{}", self.registration_id);
        let token =
            SharedAccessSignature::create(&resource, REGISTRATION_KEY_NAME, &self.key.0, expiry)?;
        debug!("issued token for {resource}, expires at {expiry}");

        // A poisoned cache lock only costs us the convenience copy; the
        // freshly minted token still goes back to the caller.
        if let Ok(mut current) = self.current.lock() {
            *current = Some(token.clone());
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    fn client() -> SymmetricKeyClient {
        SymmetricKeyClient::new("dev1", KEY)
    }

    #[test]
    fn test_registration_id_returned_unmodified() {
        assert_eq!(client().registration_id(), "dev1");
    }

    #[test]
    fn test_token_resource_is_canonical() {
        let token = client()
            .create_authentication_token("0ne00000000")
            .expect("token");
        assert_eq!(token.resource(), "0ne00000000/registrations/dev1");
        assert_eq!(token.key_name(), "registration");
    }

    #[test]
    fn test_token_wire_form_matches_expected_prefix() {
        let token = client()
            .create_authentication_token("0ne00000000")
            .expect("token");
        assert!(token
            .to_string()
            .starts_with("SharedAccessSignature sr=0ne00000000%2Fregistrations%2Fdev1&sig="));
    }

    #[test]
    fn test_empty_scope_rejected() {
        let result = client().create_authentication_token("");
        assert!(matches!(result, Err(Error::MissingArgument("id_scope"))));
    }

    #[test]
    fn test_malformed_key_surfaces_on_minting() {
        let client = SymmetricKeyClient::new("dev1", "not base64!!");
        let result = client.create_authentication_token("0ne00000000");
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_later_clock_changes_signature_not_resource() {
        let client = client();
        let earlier = client.token_for_scope("0ne00000000", 1_700_000_000).expect("token");
        let later = client.token_for_scope("0ne00000000", 1_700_000_060).expect("token");
        assert_eq!(earlier.resource(), later.resource());
        assert_ne!(earlier.expiry(), later.expiry());
        assert_ne!(earlier.signature(), later.signature());
    }

    #[test]
    fn test_last_token_tracks_most_recent_issue() {
        let client = client();
        assert!(client.last_token().is_none());

        let first = client.token_for_scope("0ne00000000", 1_700_000_000).expect("token");
        assert_eq!(client.last_token(), Some(first.clone()));

        let second = client.token_for_scope("0ne00000000", 1_700_000_060).expect("token");
        assert_eq!(client.last_token(), Some(second.clone()));

        // The earlier copy is a value object; overwriting the cache does
        // not touch it.
        assert_ne!(first, second);
    }

    #[test]
    fn test_expiry_is_about_an_hour_out() {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_secs();
        let token = client()
            .create_authentication_token("0ne00000000")
            .expect("token");
        assert!(token.expiry() >= now + 3599 && token.expiry() <= now + 3601);
    }
}
