//! Codec configuration: which secret and which cipher scheme.
//!
//! Loaded from a TOML file with a `[codec]` table:
//!
//! ```toml
//! [codec]
//! secret = "change-me"
//! scheme = "rc4"      # or "sealed"
//! ```
//!
//! or from the `TABLEKEY_SECRET` / `TABLEKEY_SCHEME` environment variables.

use crate::error::{CodecError, CodecResult};
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Environment variable holding the codec secret.
pub const SECRET_ENV: &str = "TABLEKEY_SECRET";

/// Environment variable selecting the cipher scheme.
pub const SCHEME_ENV: &str = "TABLEKEY_SCHEME";

/// How tuples are turned into opaque bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherScheme {
    /// RC4 with an empty IV. Byte-compatible with previously issued ids,
    /// unauthenticated: any well-formed ciphertext decodes.
    #[default]
    Rc4,
    /// ChaCha20-Poly1305 with a synthetic nonce. Deterministic and
    /// tamper-evident.
    Sealed,
}

impl FromStr for CipherScheme {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rc4" => Ok(Self::Rc4),
            "sealed" => Ok(Self::Sealed),
            other => Err(CodecError::Config(format!("unknown cipher scheme `{other}`"))),
        }
    }
}

/// Secret plus cipher scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct CodecConfig {
    pub secret: Secret,
    #[serde(default)]
    pub scheme: CipherScheme,
}

#[derive(Deserialize)]
struct ConfigFile {
    codec: CodecConfig,
}

impl CodecConfig {
    /// Config with the default (legacy-compatible) scheme.
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self {
            secret: secret.into(),
            scheme: CipherScheme::default(),
        }
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: CipherScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Parses the `[codec]` table of a TOML document.
    pub fn from_toml(text: &str) -> CodecResult<Self> {
        toml::from_str::<ConfigFile>(text)
            .map(|file| file.codec)
            .map_err(|e| CodecError::Config(e.to_string()))
    }

    /// Loads the `[codec]` table from a TOML file.
    pub fn load_from(path: &Path) -> CodecResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!(path = %path.display(), scheme = ?config.scheme, "Loaded codec config");
        Ok(config)
    }

    /// Reads `TABLEKEY_SECRET` and `TABLEKEY_SCHEME` from the process
    /// environment.
    pub fn from_env() -> CodecResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CodecResult<Self> {
        let secret = lookup(SECRET_ENV).ok_or(CodecError::NotConfigured)?;
        let scheme = match lookup(SCHEME_ENV) {
            Some(value) => value.parse()?,
            None => CipherScheme::default(),
        };
        Ok(Self::new(secret).with_scheme(scheme))
    }
}
