//! Algorithm registry: identifiers for signing, key management and content
//! encryption, plus the key-type and key-size mappings derived from them.

use crate::jwk::JwkKeyType;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
/// Signing algorithm
pub enum JwsAlg {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,
    /// RSASSA-PSS with SHA-256
    PS256,
    /// RSASSA-PSS with SHA-384
    PS384,
    /// RSASSA-PSS with SHA-512
    PS512,
    /// HMAC SHA-256
    HS256,
    /// HMAC SHA-384
    HS384,
    /// HMAC SHA-512
    HS512,
    #[cfg(feature = "ec")]
    /// ECDSA with P-256 and SHA-256
    ES256,
    #[cfg(feature = "ec")]
    /// ECDSA with P-384 and SHA-384
    ES384,
    #[cfg(feature = "ec")]
    /// ECDSA with P-521 and SHA-512
    ES512,
    /// Unsecured - no signature
    None,
}

impl JwsAlg {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RS256" => Some(JwsAlg::RS256),
            "RS384" => Some(JwsAlg::RS384),
            "RS512" => Some(JwsAlg::RS512),
            "PS256" => Some(JwsAlg::PS256),
            "PS384" => Some(JwsAlg::PS384),
            "PS512" => Some(JwsAlg::PS512),
            "HS256" => Some(JwsAlg::HS256),
            "HS384" => Some(JwsAlg::HS384),
            "HS512" => Some(JwsAlg::HS512),
            #[cfg(feature = "ec")]
            "ES256" => Some(JwsAlg::ES256),
            #[cfg(feature = "ec")]
            "ES384" => Some(JwsAlg::ES384),
            #[cfg(feature = "ec")]
            "ES512" => Some(JwsAlg::ES512),
            "none" => Some(JwsAlg::None),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JwsAlg::RS256 => "RS256",
            JwsAlg::RS384 => "RS384",
            JwsAlg::RS512 => "RS512",
            JwsAlg::PS256 => "PS256",
            JwsAlg::PS384 => "PS384",
            JwsAlg::PS512 => "PS512",
            JwsAlg::HS256 => "HS256",
            JwsAlg::HS384 => "HS384",
            JwsAlg::HS512 => "HS512",
            #[cfg(feature = "ec")]
            JwsAlg::ES256 => "ES256",
            #[cfg(feature = "ec")]
            JwsAlg::ES384 => "ES384",
            #[cfg(feature = "ec")]
            JwsAlg::ES512 => "ES512",
            JwsAlg::None => "none",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
/// Key management algorithm for encrypted tokens
pub enum JweAlg {
    /// RSAES-PKCS1-v1_5 key transport
    RSA1_5,
    /// RSAES-OAEP key transport
    RSA_OAEP,
    /// AES-128 key wrap
    A128KW,
    /// AES-192 key wrap
    A192KW,
    /// AES-256 key wrap
    A256KW,
    /// Direct use of a shared symmetric key
    Dir,
}

impl JweAlg {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RSA1_5" => Some(JweAlg::RSA1_5),
            "RSA-OAEP" => Some(JweAlg::RSA_OAEP),
            "A128KW" => Some(JweAlg::A128KW),
            "A192KW" => Some(JweAlg::A192KW),
            "A256KW" => Some(JweAlg::A256KW),
            "dir" => Some(JweAlg::Dir),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JweAlg::RSA1_5 => "RSA1_5",
            JweAlg::RSA_OAEP => "RSA-OAEP",
            JweAlg::A128KW => "A128KW",
            JweAlg::A192KW => "A192KW",
            JweAlg::A256KW => "A256KW",
            JweAlg::Dir => "dir",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
/// Content encryption algorithm for encrypted tokens
pub enum JweEnc {
    /// AES-128-CBC with HMAC SHA-256
    A128CBC_HS256,
    /// AES-192-CBC with HMAC SHA-384
    A192CBC_HS384,
    /// AES-256-CBC with HMAC SHA-512
    A256CBC_HS512,
    #[cfg(feature = "gcm")]
    /// AES-256-GCM
    A256GCM,
}

impl JweEnc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "A128CBC-HS256" => Some(JweEnc::A128CBC_HS256),
            "A192CBC-HS384" => Some(JweEnc::A192CBC_HS384),
            "A256CBC-HS512" => Some(JweEnc::A256CBC_HS512),
            #[cfg(feature = "gcm")]
            "A256GCM" => Some(JweEnc::A256GCM),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JweEnc::A128CBC_HS256 => "A128CBC-HS256",
            JweEnc::A192CBC_HS384 => "A192CBC-HS384",
            JweEnc::A256CBC_HS512 => "A256CBC-HS512",
            #[cfg(feature = "gcm")]
            JweEnc::A256GCM => "A256GCM",
        }
    }

    /// The content encryption key length in bytes
    pub fn key_len(&self) -> usize {
        match self {
            JweEnc::A128CBC_HS256 => 32,
            JweEnc::A192CBC_HS384 => 48,
            JweEnc::A256CBC_HS512 => 64,
            #[cfg(feature = "gcm")]
            JweEnc::A256GCM => 32,
        }
    }

    /// The initialization vector length in bytes
    pub fn iv_len(&self) -> usize {
        match self {
            JweEnc::A128CBC_HS256 | JweEnc::A192CBC_HS384 | JweEnc::A256CBC_HS512 => 16,
            #[cfg(feature = "gcm")]
            JweEnc::A256GCM => 12,
        }
    }

    /// The authentication tag length in bytes
    pub fn tag_len(&self) -> usize {
        match self {
            JweEnc::A128CBC_HS256 => 16,
            JweEnc::A192CBC_HS384 => 24,
            JweEnc::A256CBC_HS512 => 32,
            #[cfg(feature = "gcm")]
            JweEnc::A256GCM => 16,
        }
    }
}

/// All supported signing algorithm names
pub fn jws_supported_algorithms() -> Vec<&'static str> {
    let mut result = vec![
        "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "HS256", "HS384", "HS512",
    ];
    #[cfg(feature = "ec")]
    result.extend_from_slice(&["ES256", "ES384", "ES512"]);
    result.push("none");
    result
}

/// Check if the provided signing algorithm is supported
pub fn jws_algorithm_is_supported(alg: &str) -> bool {
    jws_supported_algorithms().contains(&alg)
}

/// All supported content encryption key algorithm names
pub fn jwe_supported_algorithms() -> Vec<&'static str> {
    vec!["RSA1_5", "A128KW", "A192KW", "A256KW", "RSA-OAEP"]
}

/// Check if the provided content encryption key algorithm is supported
pub fn jwe_algorithm_is_supported(alg: &str) -> bool {
    jwe_supported_algorithms().contains(&alg)
}

/// All supported content encryption algorithm names
pub fn jwe_supported_encryptions() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut result = vec!["A128CBC-HS256", "A192CBC-HS384", "A256CBC-HS512"];
    #[cfg(feature = "gcm")]
    result.push("A256GCM");
    result
}

/// Check if the provided content encryption algorithm is supported
pub fn jwe_encryption_is_supported(enc: &str) -> bool {
    jwe_supported_encryptions().contains(&enc)
}

/// The key type an algorithm operates with, for both signing and key
/// management algorithm names.
pub fn key_type_for_alg(alg: &str) -> Option<JwkKeyType> {
    if alg == "dir" {
        return Some(JwkKeyType::Octet);
    }
    if alg.starts_with("RS") || alg.starts_with("PS") {
        return Some(JwkKeyType::Rsa);
    }
    if alg.starts_with("HS") {
        return Some(JwkKeyType::Octet);
    }
    #[cfg(feature = "ec")]
    if alg.starts_with("ES") {
        return Some(JwkKeyType::Ec);
    }
    if alg == "A128KW" || alg == "A192KW" || alg == "A256KW" {
        return Some(JwkKeyType::Octet);
    }
    if alg == "RSA1_5" || alg == "RSA-OAEP" {
        return Some(JwkKeyType::Rsa);
    }
    None
}

/// The key size in bytes for an algorithm
pub fn key_size_for_alg(alg: &str) -> Option<usize> {
    match alg {
        "A128KW" => Some(16),
        "A192KW" => Some(24),
        "A256KW" => Some(32),
        "RS256" | "PS256" | "HS256" => Some(32),
        "RS384" | "PS384" | "HS384" => Some(48),
        "RS512" | "PS512" | "HS512" => Some(64),
        _ => None,
    }
}

/// The digest output length in bytes for a signing algorithm
pub fn hash_len_for_alg(alg: &str) -> Option<usize> {
    match alg {
        "RS256" | "PS256" | "HS256" | "ES256" => Some(32),
        "RS384" | "PS384" | "HS384" | "ES384" => Some(48),
        "RS512" | "PS512" | "HS512" | "ES512" => Some(64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::JwkKeyType;

    #[test]
    fn registry_membership() {
        assert!(jws_algorithm_is_supported("RS256"));
        assert!(jws_algorithm_is_supported("PS384"));
        assert!(jws_algorithm_is_supported("none"));
        assert!(!jws_algorithm_is_supported("RS128"));
        assert!(jwe_algorithm_is_supported("RSA-OAEP"));
        assert!(!jwe_algorithm_is_supported("ECDH-ES"));
        assert!(jwe_encryption_is_supported("A256CBC-HS512"));
        assert!(!jwe_encryption_is_supported("A128GCM"));
    }

    #[test]
    #[cfg(feature = "ec")]
    fn registry_membership_ec() {
        assert!(jws_algorithm_is_supported("ES256"));
        assert!(jws_algorithm_is_supported("ES512"));
    }

    #[test]
    #[cfg(feature = "gcm")]
    fn registry_membership_gcm() {
        assert!(jwe_encryption_is_supported("A256GCM"));
    }

    #[test]
    fn alg_to_key_type() {
        assert_eq!(key_type_for_alg("dir"), Some(JwkKeyType::Octet));
        assert_eq!(key_type_for_alg("RS256"), Some(JwkKeyType::Rsa));
        assert_eq!(key_type_for_alg("PS512"), Some(JwkKeyType::Rsa));
        assert_eq!(key_type_for_alg("HS384"), Some(JwkKeyType::Octet));
        assert_eq!(key_type_for_alg("A256KW"), Some(JwkKeyType::Octet));
        assert_eq!(key_type_for_alg("RSA1_5"), Some(JwkKeyType::Rsa));
        assert_eq!(key_type_for_alg("RSA-OAEP"), Some(JwkKeyType::Rsa));
        assert_eq!(key_type_for_alg("unknown"), None);
    }

    #[test]
    fn alg_to_key_size() {
        assert_eq!(key_size_for_alg("A128KW"), Some(16));
        assert_eq!(key_size_for_alg("A192KW"), Some(24));
        assert_eq!(key_size_for_alg("A256KW"), Some(32));
        assert_eq!(key_size_for_alg("HS256"), Some(32));
        assert_eq!(key_size_for_alg("RS384"), Some(48));
        assert_eq!(key_size_for_alg("PS512"), Some(64));
        assert_eq!(key_size_for_alg("dir"), None);
    }

    #[test]
    fn enc_parameters() {
        let enc = JweEnc::from_name("A128CBC-HS256").unwrap();
        assert_eq!(enc.key_len(), 32);
        assert_eq!(enc.iv_len(), 16);
        assert_eq!(enc.tag_len(), 16);
        let enc = JweEnc::from_name("A256CBC-HS512").unwrap();
        assert_eq!(enc.key_len(), 64);
        assert_eq!(enc.tag_len(), 32);
    }
}
