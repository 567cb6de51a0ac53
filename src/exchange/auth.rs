//! Request signing for the exchange REST API

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{BotError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Join parameters as `k=v&k=v` in ascending key order
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Generate HMAC-SHA256 signature over the sorted parameters
///
/// # Arguments
/// * `secret` - API secret key (raw string)
/// * `params` - Query parameters, including `api_key` and `timestamp`
///
/// Returns the lowercase hex digest.
pub fn sign_params(secret: &str, params: &BTreeMap<String, String>) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(canonical_query(params).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Add `api_key`, `timestamp` and `sign` to a parameter set
///
/// # Arguments
/// * `api_key` - Public API key
/// * `secret` - API secret used for the signature
/// * `params` - Request parameters
/// * `timestamp_ms` - Unix timestamp in milliseconds
pub fn signed_params(
    api_key: &str,
    secret: &str,
    mut params: BTreeMap<String, String>,
    timestamp_ms: i64,
) -> Result<BTreeMap<String, String>> {
    params.insert("api_key".to_string(), api_key.to_string());
    params.insert("timestamp".to_string(), timestamp_ms.to_string());
    let sign = sign_params(secret, &params)?;
    params.insert("sign".to_string(), sign);
    Ok(params)
}
