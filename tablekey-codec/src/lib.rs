//! Opaque ids for composite table keys.
//!
//! Turns a primary key tuple into a URL-safe token that hides the storage
//! key's structure from external callers, and turns the token back into the
//! tuple. Holders of the shared secret can reverse it; nobody else can read
//! it without the secret.
//!
//! - [`KeyTuple`]: partition value plus optional sort value
//! - [`OpaqueIdCodec`]: encode/decode under a configured [`Secret`]
//! - [`CodecConfig`] / [`CipherScheme`]: secret and scheme, from code,
//!   TOML, or environment
//!
//! The default scheme reproduces existing RC4-based ids byte for byte. See
//! [`CipherScheme::Sealed`] for an authenticated alternative.

mod cipher;
mod codec;
mod config;
mod error;
mod secret;
mod tuple;

pub use cipher::{open, rc4_apply, seal, NONCE_SIZE, RC4_MAX_KEY_SIZE, TAG_SIZE};
pub use codec::OpaqueIdCodec;
pub use config::{CipherScheme, CodecConfig, SCHEME_ENV, SECRET_ENV};
pub use error::{CodecError, CodecResult};
pub use secret::Secret;
pub use tuple::KeyTuple;
