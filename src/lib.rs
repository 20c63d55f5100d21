//! Compact-serialization JOSE token handling for OIDC without OpenSSL.
//!
//! This library parses, verifies, decrypts, signs and encrypts compact
//! serialized tokens (JWS and JWE), and manages the key material (JWK) those
//! operations need - including deriving keys from PEM encoded RSA keys and
//! X.509 certificates, with certificate chain and thumbprint population.
//!
//! Verification and decryption select keys from a caller supplied key set:
//! an exact match when the token header carries a `kid`, otherwise a scan
//! over the keys whose type matches the token's algorithm.
//!
//! ```
//! use compact_jose::{Jwk, JwkSet, Jwt};
//!
//! # fn main() -> Result<(), compact_jose::JoseError> {
//! let key = Jwk::from_oct(&[0u8; 32], Some("demo"))?;
//!
//! let mut jwt = Jwt::new();
//! jwt.header.set_alg("HS256");
//! jwt.header.set_kid("demo");
//! jwt.payload.set_iss("https://idp.example.com");
//! jwt.sign(&key)?;
//! let token = jwt.serialize()?;
//!
//! let mut keys = JwkSet::new();
//! keys.insert("demo".to_string(), key);
//! let parsed = Jwt::parse(&token, &keys)?;
//! parsed.verify(&keys)?;
//! assert_eq!(parsed.payload.iss(), Some("https://idp.example.com"));
//! # Ok(()) }
//! ```

#![warn(unused_extern_crates)]

#[macro_use]
extern crate tracing;

pub mod alg;
pub mod digest;
pub mod error;
pub mod jwe;
pub mod jwk;
pub mod jws;
pub mod jwt;

pub use crate::error::{JoseError, JoseErrorKind};
pub use crate::jwe::JweCompact;
pub use crate::jwk::{Jwk, JwkKeyType, JwkSet};
pub use crate::jws::JwsCompact;
pub use crate::jwt::{Jwt, JwtHeader, JwtPayload};
