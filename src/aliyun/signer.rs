//! RPC request signing (signature version 1.0, HMAC-SHA1)

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const SIGNATURE_VERSION: &str = "1.0";

/// RFC 3986 encoding: everything but `A-Z a-z 0-9 - _ . ~` is escaped
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sorted, encoded `key=value` pairs joined with `&`
pub fn canonicalize(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(method: &str, canonical_query: &str) -> String {
    format!(
        "{}&{}&{}",
        method,
        percent_encode("/"),
        percent_encode(canonical_query)
    )
}

/// Base64 HMAC-SHA1 of `string_to_sign` keyed with `<secret>&`
pub fn sign(secret: &str, string_to_sign: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(format!("{}&", secret).as_bytes())
        .map_err(|e| Error::Config(format!("invalid signing key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Canonical query with the `Signature` parameter appended
pub fn signed_query(params: &BTreeMap<String, String>, secret: &str) -> Result<String> {
    let canonical = canonicalize(params);
    let signature = sign(secret, &string_to_sign("GET", &canonical))?;
    Ok(format!(
        "{}&Signature={}",
        canonical,
        percent_encode(&signature)
    ))
}
