//! Message digest utility used for key fingerprints and certificate
//! thumbprints.

use sha1::Sha1;
use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::error::JoseError;

/// SHA-1 digest name
pub const DIGEST_SHA1: &str = "sha1";
/// SHA-256 digest name
pub const DIGEST_SHA256: &str = "sha256";
/// SHA-384 digest name
pub const DIGEST_SHA384: &str = "sha384";
/// SHA-512 digest name
pub const DIGEST_SHA512: &str = "sha512";

/// Hash a byte sequence with the named digest algorithm.
pub fn hash_bytes(digest: &str, input: &[u8]) -> Result<Vec<u8>, JoseError> {
    match digest {
        DIGEST_SHA1 => Ok(Sha1::digest(input).to_vec()),
        DIGEST_SHA256 => Ok(Sha256::digest(input).to_vec()),
        DIGEST_SHA384 => Ok(Sha384::digest(input).to_vec()),
        DIGEST_SHA512 => Ok(Sha512::digest(input).to_vec()),
        _ => {
            debug!(digest, "no digest algorithm found for name");
            Err(JoseError::digest(
                "digest::hash_bytes",
                format!("no digest algorithm found for name \"{}\"", digest),
            ))
        }
    }
}

/// Hash a string value with the named digest algorithm.
pub fn hash_string(digest: &str, input: &str) -> Result<Vec<u8>, JoseError> {
    hash_bytes(digest, input.as_bytes())
}

/// Hash a byte sequence and return the result as a base64url-encoded string,
/// usable as a key identifier.
pub fn hash_and_base64url_encode(digest: &str, input: &[u8]) -> Result<String, JoseError> {
    hash_bytes(digest, input).map(|hashed| base64::encode_config(hashed, base64::URL_SAFE_NO_PAD))
}

/// The digest name associated with a signing algorithm name.
pub fn digest_for_alg(alg: &str) -> Option<&'static str> {
    match alg {
        "RS256" | "PS256" | "HS256" | "ES256" => Some(DIGEST_SHA256),
        "RS384" | "PS384" | "HS384" | "ES384" => Some(DIGEST_SHA384),
        "RS512" | "PS512" | "HS512" | "ES512" => Some(DIGEST_SHA512),
        _ => None,
    }
}

/// Hash a string with the digest associated with a signing algorithm name.
pub fn hash_string_for_alg(alg: &str, input: &str) -> Result<Vec<u8>, JoseError> {
    let digest = digest_for_alg(alg).ok_or_else(|| {
        debug!(alg, "no digest algorithm name found for algorithm");
        JoseError::unsupported_algorithm("digest::hash_string_for_alg", alg)
    })?;
    hash_string(digest, input)
}
