//! JWE Cryptographic Operations

use std::fmt;
use std::str::FromStr;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _};
use aes_kw::{KekAes128, KekAes192, KekAes256};
use hmac::{Hmac, Mac as _};
use rand_core::{OsRng, RngCore as _};
use rsa::{Oaep, Pkcs1v15Encrypt};
use serde_json::{Map, Value};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

#[cfg(feature = "gcm")]
use aes_gcm::{
    aead::{Aead as _, Payload},
    Aes256Gcm, KeyInit as _, Nonce,
};

use crate::alg::{key_type_for_alg, JweAlg, JweEnc};
use crate::error::JoseError;
use crate::jwk::{Jwk, JwkKey, JwkSet};
use crate::jws::header_str;

// https://datatracker.ietf.org/doc/html/rfc7516

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// A compact serialized JWE: the protected header as parsed, the original
/// protected segment, and the decoded key/iv/ciphertext/tag segments.
#[derive(Clone)]
pub struct JweCompact {
    header: Map<String, Value>,
    protected_b64: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

impl fmt::Debug for JweCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JweCompact")
            .field("alg", &self.alg())
            .field("enc", &self.enc())
            .field("kid", &self.kid())
            .field("ciphertext", &self.ciphertext.len())
            .finish()
    }
}

impl JweCompact {
    /// The key management algorithm from the protected header
    pub fn alg(&self) -> Option<&str> {
        header_str(&self.header, "alg")
    }

    /// The content encryption algorithm from the protected header
    pub fn enc(&self) -> Option<&str> {
        header_str(&self.header, "enc")
    }

    /// The key identifier from the protected header
    pub fn kid(&self) -> Option<&str> {
        header_str(&self.header, "kid")
    }

    /// The full protected header
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// Encrypt a plaintext under the given protected header, which must
    /// carry supported `alg` and `enc` members matching the key type.
    pub fn encrypt(
        header: &Map<String, Value>,
        jwk: &Jwk,
        plaintext: &[u8],
    ) -> Result<Self, JoseError> {
        let alg_name = header_str(header, "alg").ok_or_else(|| {
            JoseError::encryption(
                "jwe::encrypt",
                "no \"alg\" member in protected header".to_string(),
            )
        })?;
        let alg = JweAlg::from_name(alg_name)
            .ok_or_else(|| JoseError::unsupported_algorithm("jwe::encrypt", alg_name))?;
        let enc_name = header_str(header, "enc").ok_or_else(|| {
            JoseError::encryption(
                "jwe::encrypt",
                "no \"enc\" member in protected header".to_string(),
            )
        })?;
        let enc = JweEnc::from_name(enc_name)
            .ok_or_else(|| JoseError::unsupported_algorithm("jwe::encrypt", enc_name))?;

        let protected_b64 = serde_json::to_vec(header)
            .map_err(|e| {
                debug!(?e, "header serialization");
                JoseError::encryption("jwe::encrypt", format!("could not serialize header: {}", e))
            })
            .map(|bytes| base64::encode_config(bytes, base64::URL_SAFE_NO_PAD))?;

        // the content encryption key: the shared key itself for direct
        // encryption, a fresh random key otherwise
        let cek = match (alg, jwk.key()) {
            (JweAlg::Dir, JwkKey::Oct { key }) => {
                if key.len() != enc.key_len() {
                    return Err(JoseError::encryption(
                        "jwe::encrypt",
                        format!(
                            "direct encryption with {} requires a {} byte key",
                            enc.name(),
                            enc.key_len()
                        ),
                    ));
                }
                key.clone()
            }
            _ => {
                let mut cek = vec![0u8; enc.key_len()];
                OsRng.fill_bytes(&mut cek);
                cek
            }
        };

        let encrypted_key = match (alg, jwk.key()) {
            (JweAlg::Dir, JwkKey::Oct { .. }) => Vec::new(),
            (JweAlg::A128KW, JwkKey::Oct { key }) => {
                let kek = KekAes128::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A128KW key");
                    JoseError::encryption("jwe::encrypt", "invalid key wrapping key".to_string())
                })?;
                kek.wrap_vec(&cek).map_err(|e| {
                    debug!(?e, "AES key wrap");
                    JoseError::encryption("jwe::encrypt", format!("key wrap failed: {}", e))
                })?
            }
            (JweAlg::A192KW, JwkKey::Oct { key }) => {
                let kek = KekAes192::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A192KW key");
                    JoseError::encryption("jwe::encrypt", "invalid key wrapping key".to_string())
                })?;
                kek.wrap_vec(&cek).map_err(|e| {
                    debug!(?e, "AES key wrap");
                    JoseError::encryption("jwe::encrypt", format!("key wrap failed: {}", e))
                })?
            }
            (JweAlg::A256KW, JwkKey::Oct { key }) => {
                let kek = KekAes256::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A256KW key");
                    JoseError::encryption("jwe::encrypt", "invalid key wrapping key".to_string())
                })?;
                kek.wrap_vec(&cek).map_err(|e| {
                    debug!(?e, "AES key wrap");
                    JoseError::encryption("jwe::encrypt", format!("key wrap failed: {}", e))
                })?
            }
            (JweAlg::RSA1_5, JwkKey::Rsa { public, .. }) => public
                .encrypt(&mut OsRng, Pkcs1v15Encrypt, &cek)
                .map_err(|e| {
                    debug!(?e, "RSA1_5 key encryption");
                    JoseError::encryption("jwe::encrypt", format!("RSA encryption failed: {}", e))
                })?,
            (JweAlg::RSA_OAEP, JwkKey::Rsa { public, .. }) => public
                .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &cek)
                .map_err(|e| {
                    debug!(?e, "RSA-OAEP key encryption");
                    JoseError::encryption("jwe::encrypt", format!("RSA encryption failed: {}", e))
                })?,
            (alg, _) => {
                debug!(alg = alg.name(), kty = %jwk.kty(), "encryption key type mismatch");
                return Err(JoseError::encryption(
                    "jwe::encrypt",
                    format!(
                        "algorithm {} cannot be used with a {} key",
                        alg.name(),
                        jwk.kty()
                    ),
                ));
            }
        };

        let mut iv = vec![0u8; enc.iv_len()];
        OsRng.fill_bytes(&mut iv);

        let (ciphertext, tag) =
            content_encrypt(enc, &cek, &iv, protected_b64.as_bytes(), plaintext)?;

        Ok(JweCompact {
            header: header.clone(),
            protected_b64,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }

    /// Decrypt this token with a single key, returning the plaintext.
    pub fn decrypt(&self, jwk: &Jwk) -> Result<Vec<u8>, JoseError> {
        let alg_name = self.alg().ok_or_else(|| {
            JoseError::decryption(
                "jwe::decrypt",
                "no \"alg\" member in protected header".to_string(),
            )
        })?;
        let alg = JweAlg::from_name(alg_name)
            .ok_or_else(|| JoseError::unsupported_algorithm("jwe::decrypt", alg_name))?;
        let enc_name = self.enc().ok_or_else(|| {
            JoseError::decryption(
                "jwe::decrypt",
                "no \"enc\" member in protected header".to_string(),
            )
        })?;
        let enc = JweEnc::from_name(enc_name)
            .ok_or_else(|| JoseError::unsupported_algorithm("jwe::decrypt", enc_name))?;

        let cek = match (alg, jwk.key()) {
            (JweAlg::Dir, JwkKey::Oct { key }) => {
                if !self.encrypted_key.is_empty() {
                    return Err(JoseError::decryption(
                        "jwe::decrypt",
                        "direct encryption must not carry an encrypted key".to_string(),
                    ));
                }
                key.clone()
            }
            (JweAlg::A128KW, JwkKey::Oct { key }) => {
                let kek = KekAes128::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A128KW key");
                    JoseError::decryption("jwe::decrypt", "invalid key wrapping key".to_string())
                })?;
                kek.unwrap_vec(&self.encrypted_key).map_err(|e| {
                    debug!(?e, "AES key unwrap");
                    JoseError::decryption("jwe::decrypt", format!("key unwrap failed: {}", e))
                })?
            }
            (JweAlg::A192KW, JwkKey::Oct { key }) => {
                let kek = KekAes192::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A192KW key");
                    JoseError::decryption("jwe::decrypt", "invalid key wrapping key".to_string())
                })?;
                kek.unwrap_vec(&self.encrypted_key).map_err(|e| {
                    debug!(?e, "AES key unwrap");
                    JoseError::decryption("jwe::decrypt", format!("key unwrap failed: {}", e))
                })?
            }
            (JweAlg::A256KW, JwkKey::Oct { key }) => {
                let kek = KekAes256::try_from(key.as_slice()).map_err(|e| {
                    debug!(?e, "A256KW key");
                    JoseError::decryption("jwe::decrypt", "invalid key wrapping key".to_string())
                })?;
                kek.unwrap_vec(&self.encrypted_key).map_err(|e| {
                    debug!(?e, "AES key unwrap");
                    JoseError::decryption("jwe::decrypt", format!("key unwrap failed: {}", e))
                })?
            }
            (
                JweAlg::RSA1_5 | JweAlg::RSA_OAEP,
                JwkKey::Rsa { private: None, .. },
            ) => {
                return Err(JoseError::decryption(
                    "jwe::decrypt",
                    "RSA public key cannot decrypt".to_string(),
                ));
            }
            (JweAlg::RSA1_5, JwkKey::Rsa { private: Some(private), .. }) => private
                .decrypt(Pkcs1v15Encrypt, &self.encrypted_key)
                .map_err(|e| {
                    debug!(?e, "RSA1_5 key decryption");
                    JoseError::decryption("jwe::decrypt", format!("RSA decryption failed: {}", e))
                })?,
            (JweAlg::RSA_OAEP, JwkKey::Rsa { private: Some(private), .. }) => private
                .decrypt(Oaep::new::<Sha1>(), &self.encrypted_key)
                .map_err(|e| {
                    debug!(?e, "RSA-OAEP key decryption");
                    JoseError::decryption("jwe::decrypt", format!("RSA decryption failed: {}", e))
                })?,
            (alg, _) => {
                debug!(alg = alg.name(), kty = %jwk.kty(), "decryption key type mismatch");
                return Err(JoseError::decryption(
                    "jwe::decrypt",
                    format!(
                        "algorithm {} cannot be used with a {} key",
                        alg.name(),
                        jwk.kty()
                    ),
                ));
            }
        };

        if cek.len() != enc.key_len() {
            debug!(
                cek = cek.len(),
                expected = enc.key_len(),
                "content encryption key length mismatch"
            );
            return Err(JoseError::decryption(
                "jwe::decrypt",
                format!(
                    "content encryption key has {} bytes, {} requires {}",
                    cek.len(),
                    enc.name(),
                    enc.key_len()
                ),
            ));
        }

        content_decrypt(
            enc,
            &cek,
            &self.iv,
            self.protected_b64.as_bytes(),
            &self.ciphertext,
            &self.tag,
        )
    }
}

/// the 64 bit big endian bit count of the additional authenticated data, as
/// fed in to the CBC-HMAC composite
fn aad_bit_len(aad: &[u8]) -> [u8; 8] {
    ((aad.len() as u64) * 8).to_be_bytes()
}

fn content_encrypt(
    enc: JweEnc,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), JoseError> {
    match enc {
        JweEnc::A128CBC_HS256 | JweEnc::A192CBC_HS384 | JweEnc::A256CBC_HS512 => {
            let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
            let ciphertext = match enc {
                JweEnc::A128CBC_HS256 => Aes128CbcEnc::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC encryption");
                        JoseError::encryption("jwe::encrypt", "invalid key or iv".to_string())
                    })?
                    .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
                JweEnc::A192CBC_HS384 => Aes192CbcEnc::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC encryption");
                        JoseError::encryption("jwe::encrypt", "invalid key or iv".to_string())
                    })?
                    .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
                _ => Aes256CbcEnc::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC encryption");
                        JoseError::encryption("jwe::encrypt", "invalid key or iv".to_string())
                    })?
                    .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            };
            let tag = cbc_hmac_tag(enc, mac_key, aad, iv, &ciphertext).map_err(|e| {
                JoseError::encryption("jwe::encrypt", e.message().to_string())
            })?;
            Ok((ciphertext, tag))
        }
        #[cfg(feature = "gcm")]
        JweEnc::A256GCM => {
            let cipher = Aes256Gcm::new_from_slice(cek).map_err(|e| {
                debug!(?e, "AES-GCM encryption");
                JoseError::encryption("jwe::encrypt", "invalid key length".to_string())
            })?;
            let mut sealed = cipher
                .encrypt(
                    Nonce::from_slice(iv),
                    Payload {
                        msg: plaintext,
                        aad,
                    },
                )
                .map_err(|e| {
                    debug!(?e, "AES-GCM encryption");
                    JoseError::encryption("jwe::encrypt", "AES-GCM encryption failed".to_string())
                })?;
            let tag = sealed.split_off(sealed.len() - enc.tag_len());
            Ok((sealed, tag))
        }
    }
}

fn content_decrypt(
    enc: JweEnc,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JoseError> {
    if iv.len() != enc.iv_len() || tag.len() != enc.tag_len() {
        debug!(iv = iv.len(), tag = tag.len(), "iv or tag length mismatch");
        return Err(JoseError::decryption(
            "jwe::decrypt",
            "invalid iv or authentication tag length".to_string(),
        ));
    }
    match enc {
        JweEnc::A128CBC_HS256 | JweEnc::A192CBC_HS384 | JweEnc::A256CBC_HS512 => {
            let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
            // authenticate before any decryption happens
            let expected = cbc_hmac_tag(enc, mac_key, aad, iv, ciphertext)?;
            if !constant_time_eq(&expected, tag) {
                debug!("authentication tag mismatch");
                return Err(JoseError::decryption(
                    "jwe::decrypt",
                    "authentication tag verification failed".to_string(),
                ));
            }
            let plaintext = match enc {
                JweEnc::A128CBC_HS256 => Aes128CbcDec::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC decryption");
                        JoseError::decryption("jwe::decrypt", "invalid key or iv".to_string())
                    })?
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
                JweEnc::A192CBC_HS384 => Aes192CbcDec::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC decryption");
                        JoseError::decryption("jwe::decrypt", "invalid key or iv".to_string())
                    })?
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
                _ => Aes256CbcDec::new_from_slices(enc_key, iv)
                    .map_err(|e| {
                        debug!(?e, "AES-CBC decryption");
                        JoseError::decryption("jwe::decrypt", "invalid key or iv".to_string())
                    })?
                    .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            };
            plaintext.map_err(|e| {
                debug!(?e, "AES-CBC unpadding");
                JoseError::decryption("jwe::decrypt", "invalid padding".to_string())
            })
        }
        #[cfg(feature = "gcm")]
        JweEnc::A256GCM => {
            let cipher = Aes256Gcm::new_from_slice(cek).map_err(|e| {
                debug!(?e, "AES-GCM decryption");
                JoseError::decryption("jwe::decrypt", "invalid key length".to_string())
            })?;
            let mut sealed = ciphertext.to_vec();
            sealed.extend_from_slice(tag);
            cipher
                .decrypt(Nonce::from_slice(iv), Payload { msg: &sealed, aad })
                .map_err(|e| {
                    debug!(?e, "AES-GCM decryption");
                    JoseError::decryption("jwe::decrypt", "AES-GCM decryption failed".to_string())
                })
        }
    }
}

/// the truncated HMAC over aad || iv || ciphertext || aad bit length
fn cbc_hmac_tag(
    enc: JweEnc,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, JoseError> {
    let al = aad_bit_len(aad);
    let full = match enc {
        JweEnc::A128CBC_HS256 => {
            let mut hmac = <Hmac<Sha256> as hmac::Mac>::new_from_slice(mac_key).map_err(|e| {
                debug!(?e, "CBC-HMAC");
                JoseError::decryption("jwe::decrypt", "invalid mac key".to_string())
            })?;
            hmac.update(aad);
            hmac.update(iv);
            hmac.update(ciphertext);
            hmac.update(&al);
            hmac.finalize().into_bytes().to_vec()
        }
        JweEnc::A192CBC_HS384 => {
            let mut hmac = <Hmac<Sha384> as hmac::Mac>::new_from_slice(mac_key).map_err(|e| {
                debug!(?e, "CBC-HMAC");
                JoseError::decryption("jwe::decrypt", "invalid mac key".to_string())
            })?;
            hmac.update(aad);
            hmac.update(iv);
            hmac.update(ciphertext);
            hmac.update(&al);
            hmac.finalize().into_bytes().to_vec()
        }
        JweEnc::A256CBC_HS512 => {
            let mut hmac = <Hmac<Sha512> as hmac::Mac>::new_from_slice(mac_key).map_err(|e| {
                debug!(?e, "CBC-HMAC");
                JoseError::decryption("jwe::decrypt", "invalid mac key".to_string())
            })?;
            hmac.update(aad);
            hmac.update(iv);
            hmac.update(ciphertext);
            hmac.update(&al);
            hmac.finalize().into_bytes().to_vec()
        }
        #[cfg(feature = "gcm")]
        JweEnc::A256GCM => {
            return Err(JoseError::decryption(
                "jwe::decrypt",
                "not a CBC-HMAC encryption".to_string(),
            ));
        }
    };
    Ok(full[..enc.tag_len()].to_vec())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// select a key from the set and decrypt: an exact kid match when the header
/// names one, otherwise every key whose type matches the algorithm, in set
/// order, until one succeeds
fn decrypt_with_keys(jwe: &JweCompact, keys: &JwkSet) -> Result<Vec<u8>, JoseError> {
    if keys.is_empty() {
        return Err(JoseError::key_not_found(
            "jwe::decrypt",
            "no decryption keys configured".to_string(),
        ));
    }

    if let Some(kid) = jwe.kid() {
        return match keys.get(kid) {
            Some(jwk) => jwe.decrypt(jwk).map_err(|e| {
                JoseError::decryption(
                    "jwe::decrypt",
                    format!(
                        "encrypted JWT could not be decrypted with kid {}: {}",
                        kid,
                        e.message()
                    ),
                )
            }),
            None => Err(JoseError::key_not_found(
                "jwe::decrypt",
                format!("could not find key with kid: {}", kid),
            )),
        };
    }

    let alg = jwe.alg().unwrap_or_default();
    let mut last_error = None;
    for jwk in keys.values() {
        if key_type_for_alg(alg) == Some(jwk.kty()) {
            match jwe.decrypt(jwk) {
                Ok(plaintext) => return Ok(plaintext),
                Err(e) => last_error = Some(e),
            }
        }
    }

    Err(JoseError::decryption(
        "jwe::decrypt",
        format!(
            "encrypted JWT could not be decrypted with any of the {} keys: error for last tried key is: {}",
            keys.len(),
            last_error
                .map(|e| e.message().to_string())
                .unwrap_or_else(|| "no key of a matching type in the set".to_string())
        ),
    ))
}

/// Decrypt a compact serialized JWE with a key set, returning the plaintext
/// as text.
///
/// Input that does not parse as a JWE at all is passed through verbatim when
/// `import_must_succeed` is false - nested encryption is optional, and plain
/// JWS input takes this path. Input that does parse as a JWE must decrypt.
pub fn decrypt(
    input: &str,
    keys: &JwkSet,
    import_must_succeed: bool,
) -> Result<String, JoseError> {
    match JweCompact::from_str(input) {
        Ok(jwe) => {
            let plaintext = decrypt_with_keys(&jwe, keys)?;
            String::from_utf8(plaintext).map_err(|e| {
                debug!(?e, "decrypted payload");
                JoseError::decryption(
                    "jwe::decrypt",
                    "decrypted payload is not valid UTF-8".to_string(),
                )
            })
        }
        Err(_) if !import_must_succeed => Ok(input.to_string()),
        Err(e) => Err(e),
    }
}

impl FromStr for JweCompact {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('.').collect();
        let (hdr_str, key_str, iv_str, ct_str, tag_str) = match segments.as_slice() {
            [hdr, key, iv, ct, tag] => (*hdr, *key, *iv, *ct, *tag),
            _ => {
                debug!(
                    segments = segments.len(),
                    "invalid compact format - expected five dot separated segments"
                );
                return Err(JoseError::parse(
                    "jwe::from_str",
                    format!(
                        "invalid compact serialization: expected 5 segments, found {}",
                        segments.len()
                    ),
                ));
            }
        };

        let header: Map<String, Value> = base64::decode_config(hdr_str, base64::URL_SAFE_NO_PAD)
            .map_err(|_| {
                JoseError::parse("jwe::from_str", "invalid base64 in header".to_string())
            })
            .and_then(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    debug!(?e, "invalid header format - invalid json");
                    JoseError::parse(
                        "jwe::from_str",
                        format!("protected header is not a JSON object: {}", e),
                    )
                })
            })?;

        if header_str(&header, "alg").is_none() || header_str(&header, "enc").is_none() {
            debug!("invalid header format - no alg or enc member");
            return Err(JoseError::parse(
                "jwe::from_str",
                "no \"alg\" and \"enc\" members in protected header".to_string(),
            ));
        }

        let decode = |segment: &str, what: &'static str| {
            base64::decode_config(segment, base64::URL_SAFE_NO_PAD).map_err(|_| {
                debug!(what, "invalid base64");
                JoseError::parse("jwe::from_str", format!("invalid base64 in {}", what))
            })
        };

        Ok(JweCompact {
            header,
            protected_b64: hdr_str.to_string(),
            encrypted_key: decode(key_str, "encrypted key")?,
            iv: decode(iv_str, "initialization vector")?,
            ciphertext: decode(ct_str, "ciphertext")?,
            tag: decode(tag_str, "authentication tag")?,
        })
    }
}

impl fmt::Display for JweCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}",
            self.protected_b64,
            base64::encode_config(&self.encrypted_key, base64::URL_SAFE_NO_PAD),
            base64::encode_config(&self.iv, base64::URL_SAFE_NO_PAD),
            base64::encode_config(&self.ciphertext, base64::URL_SAFE_NO_PAD),
            base64::encode_config(&self.tag, base64::URL_SAFE_NO_PAD),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoseErrorKind;
    use crate::jwk::tests::{RSA_PKCS8_PEM, RSA_SPKI_PEM};
    use crate::jwk::Jwk;

    fn jwe_header(alg: &str, enc: &str, kid: Option<&str>) -> Map<String, Value> {
        let mut header = Map::new();
        header.insert("alg".to_string(), Value::String(alg.to_string()));
        header.insert("enc".to_string(), Value::String(enc.to_string()));
        if let Some(kid) = kid {
            header.insert("kid".to_string(), Value::String(kid.to_string()));
        }
        header
    }

    fn keyset(keys: Vec<Jwk>) -> JwkSet {
        keys.into_iter()
            .map(|jwk| (jwk.kid().expect("kid").to_string(), jwk))
            .collect()
    }

    // https://datatracker.ietf.org/doc/html/rfc7516#appendix-A.3
    #[test]
    fn rfc7516_a128kw_decryption_example() {
        let _ = tracing_subscriber::fmt::try_init();
        let test_jwe = "eyJhbGciOiJBMTI4S1ciLCJlbmMiOiJBMTI4Q0JDLUhTMjU2In0.6KB707dM9YTIgHtLvtgWQ8mKwboJW3of9locizkDTHzBC2IlrT1oOQ.AxY8DCtDaGlsbGljb3RoZQ.KDlTtXchhZTGufMYmOYGS4HffxPSUrfmqCHXaI9wOGY.U0m_YmjN04DJvceFICbCVQ";

        let jwec = JweCompact::from_str(test_jwe).unwrap();
        assert!(jwec.to_string() == test_jwe);
        assert_eq!(jwec.alg(), Some("A128KW"));
        assert_eq!(jwec.enc(), Some("A128CBC-HS256"));

        let jwk = Jwk::from_json(r#"{"kty":"oct","k":"GawgguFyGrWKav7AX4VKUg"}"#).expect("jwk");
        let plaintext = jwec.decrypt(&jwk).expect("decryption failed");
        assert_eq!(plaintext, b"Live long and prosper.");
    }

    #[test]
    fn rfc7516_tampered_ciphertext_is_rejected() {
        let _ = tracing_subscriber::fmt::try_init();
        let test_jwe = "eyJhbGciOiJBMTI4S1ciLCJlbmMiOiJBMTI4Q0JDLUhTMjU2In0.6KB707dM9YTIgHtLvtgWQ8mKwboJW3of9locizkDTHzBC2IlrT1oOQ.AxY8DCtDaGlsbGljb3RoZQ.KDlTtXchhZTGufMYmOYGS4HffxPSUrfmqCHXaI9wOGZ.U0m_YmjN04DJvceFICbCVQ";

        let jwec = JweCompact::from_str(test_jwe).unwrap();
        let jwk = Jwk::from_json(r#"{"kty":"oct","k":"GawgguFyGrWKav7AX4VKUg"}"#).expect("jwk");
        let err = jwec.decrypt(&jwk).unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::Decryption);
    }

    #[test]
    fn dir_cbc_hmac_encrypt_decrypt_cycle() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[5u8; 32], None).expect("key");

        let jwec = JweCompact::encrypt(
            &jwe_header("dir", "A128CBC-HS256", None),
            &jwk,
            b"it worked!",
        )
        .expect("encryption failed");

        let jwec = JweCompact::from_str(&jwec.to_string()).expect("re-parse");
        assert_eq!(jwec.decrypt(&jwk).expect("decryption failed"), b"it worked!");
    }

    #[test]
    fn a256kw_encrypt_decrypt_cycle() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[6u8; 32], None).expect("key");

        let jwec = JweCompact::encrypt(
            &jwe_header("A256KW", "A256CBC-HS512", None),
            &jwk,
            b"wrapped key content",
        )
        .expect("encryption failed");
        assert_eq!(
            jwec.decrypt(&jwk).expect("decryption failed"),
            b"wrapped key content"
        );
    }

    #[test]
    fn rsa_oaep_encrypt_decrypt_cycle() {
        let _ = tracing_subscriber::fmt::try_init();
        let public = Jwk::from_rsa_pem(RSA_SPKI_PEM.as_bytes(), false, None).expect("import");
        let private = Jwk::from_rsa_pem(RSA_PKCS8_PEM.as_bytes(), true, None).expect("import");

        let jwec = JweCompact::encrypt(
            &jwe_header("RSA-OAEP", "A256CBC-HS512", None),
            &public,
            b"to the private key holder",
        )
        .expect("encryption failed");
        assert_eq!(
            jwec.decrypt(&private).expect("decryption failed"),
            b"to the private key holder"
        );

        // the public key alone cannot decrypt
        let err = jwec.decrypt(&public).unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::Decryption);
    }

    #[test]
    fn rsa1_5_encrypt_decrypt_cycle() {
        let _ = tracing_subscriber::fmt::try_init();
        let private = Jwk::from_rsa_pem(RSA_PKCS8_PEM.as_bytes(), true, None).expect("import");

        let jwec = JweCompact::encrypt(
            &jwe_header("RSA1_5", "A128CBC-HS256", None),
            &private,
            b"legacy transport",
        )
        .expect("encryption failed");
        assert_eq!(
            jwec.decrypt(&private).expect("decryption failed"),
            b"legacy transport"
        );
    }

    #[test]
    #[cfg(feature = "gcm")]
    fn dir_gcm_encrypt_decrypt_cycle() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[9u8; 32], None).expect("key");

        let jwec = JweCompact::encrypt(&jwe_header("dir", "A256GCM", None), &jwk, b"gcm content")
            .expect("encryption failed");
        let jwec = JweCompact::from_str(&jwec.to_string()).expect("re-parse");
        assert_eq!(jwec.decrypt(&jwk).expect("decryption failed"), b"gcm content");
    }

    #[test]
    fn dir_key_length_must_match_the_encryption() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[5u8; 16], None).expect("key");
        let err = JweCompact::encrypt(&jwe_header("dir", "A256CBC-HS512", None), &jwk, b"x")
            .unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::Encryption);
    }

    #[test]
    fn keyset_decrypt_selects_by_kid() {
        let _ = tracing_subscriber::fmt::try_init();
        let right = Jwk::from_oct(&[1u8; 32], Some("right")).expect("key");
        let wrong = Jwk::from_oct(&[2u8; 32], Some("wrong")).expect("key");

        let jwec = JweCompact::encrypt(
            &jwe_header("A256KW", "A128CBC-HS256", Some("right")),
            &right,
            b"pinned",
        )
        .expect("encrypt");
        let keys = keyset(vec![wrong, right]);

        let plaintext = decrypt(&jwec.to_string(), &keys, true).expect("decrypt");
        assert_eq!(plaintext, "pinned");
    }

    #[test]
    fn keyset_decrypt_missing_kid_fails_without_scanning() {
        let _ = tracing_subscriber::fmt::try_init();
        let right = Jwk::from_oct(&[1u8; 32], Some("right")).expect("key");

        let jwec = JweCompact::encrypt(
            &jwe_header("A256KW", "A128CBC-HS256", Some("right")),
            &right,
            b"pinned",
        )
        .expect("encrypt");

        // the matching key is in the set under a different kid; selection is
        // by kid only, so this must fail with key-not-found
        let keys = keyset(vec![Jwk::from_oct(&[1u8; 32], Some("other-name")).expect("key")]);
        let err = decrypt(&jwec.to_string(), &keys, true).unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::KeyNotFound);
    }

    #[test]
    fn keyset_decrypt_scans_matching_key_types() {
        let _ = tracing_subscriber::fmt::try_init();
        let rsa = Jwk::from_rsa_pem(RSA_PKCS8_PEM.as_bytes(), true, None).expect("import");
        let oct = Jwk::from_oct(&[4u8; 32], Some("sym")).expect("key");

        let jwec = JweCompact::encrypt(&jwe_header("A256KW", "A128CBC-HS256", None), &oct, b"scan")
            .expect("encrypt");

        let keys = keyset(vec![rsa, oct]);
        let plaintext = decrypt(&jwec.to_string(), &keys, true).expect("decrypt");
        assert_eq!(plaintext, "scan");
    }

    #[test]
    fn keyset_decrypt_empty_set_fails() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[5u8; 32], None).expect("key");
        let jwec = JweCompact::encrypt(&jwe_header("dir", "A128CBC-HS256", None), &jwk, b"x")
            .expect("encrypt");

        let err = decrypt(&jwec.to_string(), &JwkSet::new(), true).unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::KeyNotFound);
    }

    #[test]
    fn non_jwe_input_passes_through_unless_required() {
        let _ = tracing_subscriber::fmt::try_init();
        let keys = JwkSet::new();

        // a three segment JWS is not a JWE; it is handed back verbatim
        let out = decrypt("aaa.bbb.ccc", &keys, false).expect("passthrough");
        assert_eq!(out, "aaa.bbb.ccc");

        let err = decrypt("aaa.bbb.ccc", &keys, true).unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::Parse);
    }

    #[test]
    fn unsupported_enc_is_reported() {
        let _ = tracing_subscriber::fmt::try_init();
        let jwk = Jwk::from_oct(&[5u8; 32], None).expect("key");
        let err = JweCompact::encrypt(&jwe_header("dir", "A128GCM", None), &jwk, b"x").unwrap_err();
        assert_eq!(err.kind(), JoseErrorKind::UnsupportedAlgorithm);
    }
}
