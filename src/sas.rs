//! Shared Access Signature construction
//!
//! This module implements the token-signing primitive:
//! - URL-encode the resource path being authorized
//! - Sign `encodedResource + "\n" + expiry` with HMAC-SHA256, keyed by the
//!   base64-decoded symmetric key
//! - Serialize as `SharedAccessSignature sr=...&sig=...&se=...[&skn=...]`
//!
//! The raw key never appears in the token; a verifier holding the same key
//! recomputes the HMAC over the `(resource, expiry)` pair and compares.
//! Tampering with either field invalidates the signature.
//!
//! Construction is pure. The only impure input on the normal call path is
//! [`an_hour_from_now`], which reads the wall clock once per token.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Validity window applied by [`an_hour_from_now`], in seconds.
const DEFAULT_VALIDITY_SECS: u64 = 3600;

/// Leading scheme marker of the serialized wire form, trailing space included.
const TOKEN_PREFIX: &str = "SharedAccessSignature ";

/// A signed, time-bounded credential authorizing access to one resource.
///
/// Immutable once constructed; every [`create`](Self::create) call produces
/// a fresh value and never mutates a prior one. The signature binds the
/// exact `(resource, expiry)` pair baked in at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedAccessSignature {
    #[serde(rename = "sr")]
    resource: String,
    #[serde(rename = "sig")]
    signature: String,
    #[serde(rename = "se")]
    expiry: u64,
    #[serde(rename = "skn", skip_serializing_if = "String::is_empty")]
    key_name: String,
}

impl SharedAccessSignature {
    /// Sign `resource_uri` until `expiry` with the base64-encoded symmetric
    /// `key`. `key_name` may be empty, in which case the `skn` field is
    /// omitted from the serialized form.
    ///
    /// Fails with [`Error::MissingArgument`] if `resource_uri` or `key` is
    /// empty and [`Error::InvalidArgument`] if `key` is not valid base64.
    pub fn create(resource_uri: &str, key_name: &str, key: &str, expiry: u64) -> Result<Self> {
        if resource_uri.is_empty() {
            return Err(Error::MissingArgument("resource_uri"));
        }
        if key.is_empty() {
            return Err(Error::MissingArgument("key"));
        }

        let raw_key = BASE64.decode(key).map_err(|e| Error::InvalidArgument {
            name: "key",
            reason: format!("not valid base64: {e}"),
        })?;

        // The signature covers the URL-encoded resource, not the raw one,
        // so verifiers never have to guess at the encoding.
        let string_to_sign = format!("{}\n{expiry}", urlencoding::encode(resource_uri));

        // HMAC-SHA256 accepts keys of any length; a key that decoded
        // successfully cannot fail here.
        let mut mac =
            HmacSha256::new_from_slice(&raw_key).map_err(|e| Error::InvalidArgument {
                name: "key",
                reason: e.to_string(),
            })?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(Self {
            resource: resource_uri.to_owned(),
            signature,
            expiry,
            key_name: key_name.to_owned(),
        })
    }

    /// The canonical resource string this token authorizes, unencoded.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Base64 HMAC-SHA256 over the encoded resource and expiry.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Absolute expiry, seconds since the Unix epoch.
    pub fn expiry(&self) -> u64 {
        self.expiry
    }

    /// Key name stamped into the token; empty when the scheme uses none.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

impl fmt::Display for SharedAccessSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TOKEN_PREFIX}sr={}&sig={}&se={}",
            urlencoding::encode(&self.resource),
            urlencoding::encode(&self.signature),
            self.expiry
        )?;
        if !self.key_name.is_empty() {
            write!(f, "&skn={}", self.key_name)?;
        }
        Ok(())
    }
}

impl FromStr for SharedAccessSignature {
    type Err = Error;

    /// Parse the wire form back into a structured token. Does NOT verify
    /// the signature; that is the receiving side's job.
    fn from_str(s: &str) -> Result<Self> {
        let fields = s
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| invalid_token("missing `SharedAccessSignature ` prefix"))?;

        let mut resource = None;
        let mut signature = None;
        let mut expiry = None;
        let mut key_name = String::new();

        for pair in fields.split('&') {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid_token(format!("field `{pair}` has no value")))?;
            match name {
                "sr" => resource = Some(url_decode("sr", value)?),
                "sig" => signature = Some(url_decode("sig", value)?),
                "se" => {
                    expiry = Some(value.parse::<u64>().map_err(|_| {
                        invalid_token(format!("expiry `{value}` is not an integer"))
                    })?);
                }
                "skn" => key_name = value.to_owned(),
                _ => return Err(invalid_token(format!("unknown field `{name}`"))),
            }
        }

        Ok(Self {
            resource: resource.ok_or_else(|| invalid_token("missing `sr` field"))?,
            signature: signature.ok_or_else(|| invalid_token("missing `sig` field"))?,
            expiry: expiry.ok_or_else(|| invalid_token("missing `se` field"))?,
            key_name,
        })
    }
}

fn url_decode(field: &str, value: &str) -> Result<String> {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .map_err(|e| invalid_token(format!("field `{field}` is not valid UTF-8: {e}")))
}

fn invalid_token(reason: impl Into<String>) -> Error {
    Error::InvalidArgument {
        name: "token",
        reason: reason.into(),
    }
}

/// Current Unix time plus one hour, the default token validity window.
pub fn an_hour_from_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        + DEFAULT_VALIDITY_SECS
}
