//! The opaque id codec.
//!
//! ```text
//! id = base64url_nopad( cipher(secret, json([partition, sort?])) )
//! ```
//!
//! An id is a reversible handle, not a hash. Under [`CipherScheme::Rc4`] it
//! is unauthenticated: anyone holding the secret can mint ids, and a flipped
//! bit decodes to a different (possibly malformed) tuple.

use crate::cipher;
use crate::config::{CipherScheme, CodecConfig};
use crate::error::{CodecError, CodecResult};
use crate::secret::Secret;
use crate::tuple::KeyTuple;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::{debug, info};

/// Encodes key tuples into URL-safe opaque ids and back.
///
/// Starts unconfigured; every encode or decode fails with
/// [`CodecError::NotConfigured`] until a secret is set. Configuration takes
/// `&mut self`, so a codec shared behind `Arc` is read-only: configure it
/// before handing it out.
#[derive(Debug, Clone, Default)]
pub struct OpaqueIdCodec {
    config: Option<CodecConfig>,
}

impl OpaqueIdCodec {
    /// A configured codec.
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        let mut codec = Self::default();
        codec.configure_with(config)?;
        Ok(codec)
    }

    /// A configured codec using the default scheme.
    pub fn with_secret(secret: impl Into<Secret>) -> CodecResult<Self> {
        Self::new(CodecConfig::new(secret))
    }

    /// Sets the secret, keeping the current scheme. Overwrites any previous
    /// secret.
    pub fn configure(&mut self, secret: impl Into<Secret>) -> CodecResult<()> {
        let scheme = self.scheme().unwrap_or_default();
        self.configure_with(CodecConfig::new(secret).with_scheme(scheme))
    }

    /// Replaces the whole configuration. Overwrites any previous one.
    pub fn configure_with(&mut self, config: CodecConfig) -> CodecResult<()> {
        match config.scheme {
            CipherScheme::Rc4 => cipher::check_rc4_secret(&config.secret)?,
            CipherScheme::Sealed => cipher::check_sealed_secret(&config.secret)?,
        }
        if self.config.is_some() {
            debug!(scheme = ?config.scheme, "Replacing opaque id codec secret");
        } else {
            info!(scheme = ?config.scheme, "Opaque id codec configured");
        }
        self.config = Some(config);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn scheme(&self) -> Option<CipherScheme> {
        self.config.as_ref().map(|c| c.scheme)
    }

    fn config(&self) -> CodecResult<&CodecConfig> {
        self.config.as_ref().ok_or(CodecError::NotConfigured)
    }

    /// Encodes `tuple` into an opaque id.
    pub fn encode(&self, tuple: &KeyTuple) -> CodecResult<String> {
        let config = self.config()?;
        let plaintext = tuple.to_json();
        let bytes = match config.scheme {
            CipherScheme::Rc4 => {
                let mut buf = plaintext;
                cipher::rc4_apply(&config.secret, &mut buf)?;
                buf
            }
            CipherScheme::Sealed => cipher::seal(&config.secret, &plaintext)?,
        };
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decodes an opaque id back into the tuple that produced it.
    pub fn decode(&self, id: &str) -> CodecResult<KeyTuple> {
        let config = self.config()?;
        let result = URL_SAFE_NO_PAD
            .decode(id)
            .map_err(|e| CodecError::Decode(format!("invalid base64url: {e}")))
            .and_then(|bytes| match config.scheme {
                CipherScheme::Rc4 => {
                    let mut buf = bytes;
                    cipher::rc4_apply(&config.secret, &mut buf)?;
                    Ok(buf)
                }
                CipherScheme::Sealed => cipher::open(&config.secret, &bytes),
            })
            .and_then(|plaintext| KeyTuple::from_json(&plaintext));

        if let Err(e) = &result {
            debug!(id_len = id.len(), error = %e, "Rejected opaque id");
        }
        result
    }
}
