//! The JWT model: header and payload with their canonical serialized forms,
//! plus the parse/verify and sign/serialize pipelines over key sets.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Number, Value};

use crate::alg::key_type_for_alg;
use crate::error::JoseError;
use crate::jwe;
use crate::jwk::{Jwk, JwkSet};
use crate::jws::{header_str, JwsCompact};

/// {"alg":"none"}
const HDR_ALG_NONE: &str = "eyJhbGciOiJub25lIn0";

/// The protected header of a token.
///
/// The ordered JSON mapping is the single source of truth; `alg`, `enc` and
/// `kid` are read and written straight through it, so they can never drift
/// apart from the serialized form.
#[derive(Debug, Clone, Default)]
pub struct JwtHeader {
    entries: Map<String, Value>,
    raw: Option<String>,
}

impl JwtHeader {
    pub fn new() -> Self {
        JwtHeader::default()
    }

    /// The signing or key management algorithm
    pub fn alg(&self) -> Option<&str> {
        header_str(&self.entries, "alg")
    }

    pub fn set_alg(&mut self, alg: &str) {
        self.set("alg", Value::String(alg.to_string()));
    }

    /// The content encryption algorithm, present on encrypted tokens
    pub fn enc(&self) -> Option<&str> {
        header_str(&self.entries, "enc")
    }

    pub fn set_enc(&mut self, enc: &str) {
        self.set("enc", Value::String(enc.to_string()));
    }

    /// The key identifier hinting which key to use
    pub fn kid(&self) -> Option<&str> {
        header_str(&self.entries, "kid")
    }

    pub fn set_kid(&mut self, kid: &str) {
        self.set("kid", Value::String(kid.to_string()));
    }

    /// Read an arbitrary header member
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Set an arbitrary header member, keeping insertion order
    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.raw = None;
    }

    /// The full ordered mapping
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// The canonical serialized header, as captured at parse or sign time.
    /// Cleared by any mutation.
    pub fn raw_json(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// The payload of a token: an arbitrary JSON object with the standard claims
/// exposed as computed accessors. An absent claim is `None`, never zero.
#[derive(Debug, Clone, Default)]
pub struct JwtPayload {
    entries: Map<String, Value>,
    raw: Option<String>,
}

impl JwtPayload {
    pub fn new() -> Self {
        JwtPayload::default()
    }

    /// The issuer claim
    pub fn iss(&self) -> Option<&str> {
        self.entries.get("iss").and_then(Value::as_str)
    }

    pub fn set_iss(&mut self, iss: &str) {
        self.set_claim("iss", Value::String(iss.to_string()));
    }

    /// The subject claim
    pub fn sub(&self) -> Option<&str> {
        self.entries.get("sub").and_then(Value::as_str)
    }

    pub fn set_sub(&mut self, sub: &str) {
        self.set_claim("sub", Value::String(sub.to_string()));
    }

    /// The issued-at timestamp
    pub fn iat(&self) -> Option<f64> {
        self.entries.get("iat").and_then(Value::as_f64)
    }

    pub fn set_iat(&mut self, iat: i64) {
        self.set_claim("iat", Value::Number(Number::from(iat)));
    }

    /// The expiry timestamp
    pub fn exp(&self) -> Option<f64> {
        self.entries.get("exp").and_then(Value::as_f64)
    }

    pub fn set_exp(&mut self, exp: i64) {
        self.set_claim("exp", Value::Number(Number::from(exp)));
    }

    /// Read a string claim. Whether the claim must be present and correctly
    /// typed is decided per call, not by a schema.
    pub fn string_claim(&self, name: &str, mandatory: bool) -> Result<Option<&str>, JoseError> {
        match self.entries.get(name) {
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) if mandatory => Err(JoseError::parse(
                "jwt::string_claim",
                format!(
                    "mandatory JSON key \"{}\" was found but the type is not a string",
                    name
                ),
            )),
            Some(_) => Ok(None),
            None if mandatory => Err(JoseError::parse(
                "jwt::string_claim",
                format!("mandatory JSON key \"{}\" could not be found", name),
            )),
            None => Ok(None),
        }
    }

    /// Read a numeric timestamp claim, with the same per-call mandatory rule.
    pub fn timestamp_claim(&self, name: &str, mandatory: bool) -> Result<Option<f64>, JoseError> {
        match self.entries.get(name) {
            Some(Value::Number(value)) => Ok(value.as_f64()),
            Some(_) if mandatory => Err(JoseError::parse(
                "jwt::timestamp_claim",
                format!(
                    "mandatory JSON key \"{}\" was found but the type is not a number",
                    name
                ),
            )),
            Some(_) => Ok(None),
            None if mandatory => Err(JoseError::parse(
                "jwt::timestamp_claim",
                format!("mandatory JSON key \"{}\" could not be found", name),
            )),
            None => Ok(None),
        }
    }

    /// Read an arbitrary claim
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Set an arbitrary claim, keeping insertion order
    pub fn set_claim(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
        self.raw = None;
    }

    /// The full ordered mapping
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// The canonical serialized payload, as captured at parse or sign time.
    /// Cleared by any mutation.
    pub fn raw_json(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// A token: header, payload and, once parsed or signed, the underlying
/// signature object.
#[derive(Debug, Clone, Default)]
pub struct Jwt {
    /// The protected header
    pub header: JwtHeader,
    /// The claims
    pub payload: JwtPayload,
    signed: Option<JwsCompact>,
}

impl fmt::Display for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serialize() {
            Ok(serialized) => f.write_str(&serialized),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Jwt {
    /// A new empty token with empty header and payload objects.
    pub fn new() -> Self {
        Jwt::default()
    }

    /// Parse and, when the input is an encrypted token, first decrypt a
    /// compact serialized token.
    ///
    /// Input that parses as a JWE is decrypted with the key set (selection
    /// by kid, else by key type) and the plaintext is then required to be a
    /// signed token. Input that is not a JWE at all is parsed as a JWS
    /// directly - nested encryption is optional.
    pub fn parse(input: &str, keys: &JwkSet) -> Result<Jwt, JoseError> {
        let text = jwe::decrypt(input, keys, false)?;

        let jwsc = JwsCompact::from_str(&text)?;

        let header_entries = jwsc.header().clone();
        let header_raw = serde_json::to_string(&header_entries).map_err(|e| {
            debug!(?e, "header serialization");
            JoseError::parse("jwt::parse", format!("could not serialize header: {}", e))
        })?;

        let payload_str = std::str::from_utf8(jwsc.payload()).map_err(|e| {
            debug!(?e, "payload");
            JoseError::parse("jwt::parse", "payload is not valid UTF-8".to_string())
        })?;
        let payload_json: Value = serde_json::from_str(payload_str).map_err(|e| {
            debug!(?e, "payload parsing");
            JoseError::parse(
                "jwt::parse",
                format!("JSON parsing failed: {} ({})", e, payload_str),
            )
        })?;
        let payload_entries = match payload_json {
            Value::Object(entries) => entries,
            _ => {
                return Err(JoseError::parse(
                    "jwt::parse",
                    "JSON value is not an object".to_string(),
                ));
            }
        };

        Ok(Jwt {
            header: JwtHeader {
                entries: header_entries,
                raw: Some(header_raw),
            },
            payload: JwtPayload {
                entries: payload_entries,
                raw: Some(payload_str.to_string()),
            },
            signed: Some(jwsc),
        })
    }

    /// Verify the signature against a key set.
    ///
    /// A header kid pins the one key tried; without a kid every key whose
    /// type matches the algorithm is tried in set order until one verifies.
    /// Failed verification never invalidates the token.
    pub fn verify(&self, keys: &JwkSet) -> Result<(), JoseError> {
        let jwsc = self.signed.as_ref().ok_or_else(|| {
            JoseError::invalid_state(
                "jwt::verify",
                "token carries no signature to verify".to_string(),
            )
        })?;

        let alg = jwsc.alg().ok_or_else(|| {
            JoseError::verification(
                "jwt::verify",
                "no \"alg\" member in protected header".to_string(),
            )
        })?;
        if alg == "none" {
            return Err(JoseError::verification(
                "jwt::verify",
                "tokens with \"alg\":\"none\" carry no verifiable signature".to_string(),
            ));
        }

        if let Some(kid) = jwsc.kid() {
            return match keys.get(kid) {
                Some(jwk) => jwsc.verify(jwk).map_err(|e| {
                    JoseError::verification(
                        "jwt::verify",
                        format!("verification with kid {} failed: {}", kid, e.message()),
                    )
                }),
                None => Err(JoseError::key_not_found(
                    "jwt::verify",
                    format!("could not find key with kid: {}", kid),
                )),
            };
        }

        let mut last_error = None;
        for jwk in keys.values() {
            if key_type_for_alg(alg) == Some(jwk.kty()) {
                match jwsc.verify(jwk) {
                    Ok(()) => return Ok(()),
                    Err(e) => last_error = Some(e),
                }
            }
        }

        let detail = match last_error {
            Some(e) => format!(": error for last tried key is: {}", e.message()),
            None => format!(
                "; you have probably provided no or incorrect keys/key-types for algorithm: {}",
                alg
            ),
        };
        Err(JoseError::verification(
            "jwt::verify",
            format!(
                "could not verify signature against any of the ({}) provided keys{}",
                keys.len(),
                detail
            ),
        ))
    }

    /// Sign this token with a key, replacing any previous signature.
    ///
    /// The payload is serialized compact in insertion order and becomes the
    /// canonical payload string of the token.
    pub fn sign(&mut self, jwk: &Jwk) -> Result<(), JoseError> {
        let payload_json = serde_json::to_string(&self.payload.entries).map_err(|e| {
            debug!(?e, "payload serialization");
            JoseError::signing("jwt::sign", format!("could not serialize payload: {}", e))
        })?;
        let header_json = serde_json::to_string(&self.header.entries).map_err(|e| {
            debug!(?e, "header serialization");
            JoseError::signing("jwt::sign", format!("could not serialize header: {}", e))
        })?;

        let jwsc = JwsCompact::sign(&self.header.entries, payload_json.as_bytes(), jwk)?;

        self.payload.raw = Some(payload_json);
        self.header.raw = Some(header_json);
        // any previous signature object is dropped here
        self.signed = Some(jwsc);
        Ok(())
    }

    /// Compact serialization.
    ///
    /// Unsecured tokens use the fixed `{"alg":"none"}` header and carry no
    /// signature segment; anything else must have been signed first.
    pub fn serialize(&self) -> Result<String, JoseError> {
        if self.header.alg() == Some("none") {
            let payload_json = serde_json::to_string(&self.payload.entries).map_err(|e| {
                debug!(?e, "payload serialization");
                JoseError::parse("jwt::serialize", format!("could not serialize payload: {}", e))
            })?;
            let payload_b64 = base64::encode_config(payload_json, base64::URL_SAFE_NO_PAD);
            return Ok(format!("{}.{}.", HDR_ALG_NONE, payload_b64));
        }

        match &self.signed {
            Some(jwsc) => Ok(jwsc.to_string()),
            None => Err(JoseError::invalid_state(
                "jwt::serialize",
                "token must be signed before serialization".to_string(),
            )),
        }
    }

    /// Encrypt a plaintext under this token's header, which must carry
    /// supported `alg` and `enc` members. The payload is passed explicitly;
    /// it is usually the compact serialization of an already signed token.
    pub fn encrypt(&self, jwk: &Jwk, payload: &str) -> Result<String, JoseError> {
        let jwec = jwe::JweCompact::encrypt(&self.header.entries, jwk, payload.as_bytes())?;
        Ok(jwec.to_string())
    }
}
