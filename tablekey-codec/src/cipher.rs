//! Byte-level transforms behind each [`CipherScheme`](crate::CipherScheme).
//!
//! Both are deterministic: the same secret and plaintext always produce the
//! same output.

use crate::error::{CodecError, CodecResult};
use crate::secret::Secret;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rc4::cipher::{consts::U256, KeyInit as _, StreamCipher};
use rc4::Rc4;
use sha2::{Digest, Sha256};

/// Largest RC4 key, in bytes.
pub const RC4_MAX_KEY_SIZE: usize = 256;

/// Size of the synthetic nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const SEALED_KEY_DOMAIN: &[u8] = b"tablekey.sealed.key";
const SEALED_NONCE_DOMAIN: &[u8] = b"tablekey.sealed.nonce";

/// Applies the RC4 keystream for `secret` to `data` in place. Encryption and
/// decryption are the same operation.
///
/// RC4 key scheduling reads `key[i % len]` for `i` in `0..256`, so cycling a
/// shorter key out to 256 bytes yields the identical keystream. That lets a
/// single fixed-size cipher type serve every key length.
pub fn rc4_apply(secret: &Secret, data: &mut [u8]) -> CodecResult<()> {
    check_rc4_secret(secret)?;
    let key: Vec<u8> = secret
        .as_bytes()
        .iter()
        .copied()
        .cycle()
        .take(RC4_MAX_KEY_SIZE)
        .collect();
    let mut cipher = Rc4::<U256>::new_from_slice(&key)
        .map_err(|e| CodecError::InvalidSecret(e.to_string()))?;
    cipher.apply_keystream(data);
    Ok(())
}

pub(crate) fn check_rc4_secret(secret: &Secret) -> CodecResult<()> {
    match secret.len() {
        0 => Err(CodecError::InvalidSecret("secret is empty".into())),
        n if n > RC4_MAX_KEY_SIZE => Err(CodecError::InvalidSecret(format!(
            "RC4 keys are at most {RC4_MAX_KEY_SIZE} bytes, got {n}"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_sealed_secret(secret: &Secret) -> CodecResult<()> {
    if secret.is_empty() {
        return Err(CodecError::InvalidSecret("secret is empty".into()));
    }
    Ok(())
}

fn sealed_cipher(secret: &Secret) -> ChaCha20Poly1305 {
    let key = Sha256::new()
        .chain_update(SEALED_KEY_DOMAIN)
        .chain_update(secret.as_bytes())
        .finalize();
    ChaCha20Poly1305::new(&key)
}

fn synthetic_nonce(secret: &Secret, plaintext: &[u8]) -> [u8; NONCE_SIZE] {
    let digest = Sha256::new()
        .chain_update(SEALED_NONCE_DOMAIN)
        .chain_update(secret.as_bytes())
        .chain_update(plaintext)
        .finalize();
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&digest[..NONCE_SIZE]);
    nonce
}

/// Encrypts with ChaCha20-Poly1305 under a nonce derived from the secret and
/// plaintext. Returns `nonce || ciphertext || tag`.
pub fn seal(secret: &Secret, plaintext: &[u8]) -> CodecResult<Vec<u8>> {
    check_sealed_secret(secret)?;
    let nonce_bytes = synthetic_nonce(secret, plaintext);
    let ciphertext = sealed_cipher(secret)
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CodecError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`seal`]. Fails on truncated, tampered or foreign input.
pub fn open(secret: &Secret, sealed: &[u8]) -> CodecResult<Vec<u8>> {
    check_sealed_secret(secret)?;
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CodecError::Decode("data too short".into()));
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    sealed_cipher(secret)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CodecError::Decode("authentication failed (wrong secret or tampered id)".into()))
}
