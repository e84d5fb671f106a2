//! # Request Signing
//!
//! Canonical signature scheme shared by outbound requests and inbound
//! callbacks.
//!
//! ```text
//! fields (minus "signature", minus nulls)
//!   -> sorted by key
//!   -> "k1=v1;k2=v2;" + secret
//!   -> sha256 -> lowercase hex
//! ```

use crate::error::{PaymentError, PaymentResult};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Field name the signature is stored under
pub const SIGNATURE_FIELD: &str = "signature";

/// Build the string that gets hashed, without the secret suffix.
pub fn canonical_string(fields: &Map<String, Value>) -> String {
    let mut entries: Vec<(&String, &Value)> = fields
        .iter()
        .filter(|(key, value)| key.as_str() != SIGNATURE_FIELD && !value.is_null())
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        push_value(&mut out, value);
        out.push(';');
    }
    out
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        // Numbers, booleans and nested values use their compact JSON text
        other => out.push_str(&other.to_string()),
    }
}

/// Compute the lowercase hex SHA-256 signature of `fields` with `secret` appended.
pub fn sign(fields: &Map<String, Value>, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_string(fields).as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialize `request` into a JSON object and attach its signature.
pub fn signed_fields<T: Serialize>(request: &T, secret: &str) -> PaymentResult<Map<String, Value>> {
    let value = serde_json::to_value(request)
        .map_err(|e| PaymentError::Serialization(e.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(PaymentError::Serialization(
            "Signed request must serialize to a JSON object".to_string(),
        ));
    };

    let signature = sign(&fields, secret);
    fields.insert(SIGNATURE_FIELD.to_string(), Value::String(signature));
    Ok(fields)
}

/// Check the `signature` field of `fields` against a freshly computed one.
pub fn verify(fields: &Map<String, Value>, secret: &str) -> PaymentResult<()> {
    let provided = fields
        .get(SIGNATURE_FIELD)
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            PaymentError::WebhookVerificationFailed("Missing signature field".to_string())
        })?;

    let expected = sign(fields, secret);
    if !constant_time_compare(&provided.to_ascii_lowercase(), &expected) {
        return Err(PaymentError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }
    Ok(())
}

/// Length-checked comparison that does not short-circuit on the first differing byte
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
