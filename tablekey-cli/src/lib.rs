//! Command implementations behind the `tablekey` binary.
//!
//! Each command returns the text it would print so it can be exercised
//! without spawning the binary.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tablekey_codec::{CodecConfig, KeyTuple, OpaqueIdCodec};
use tablekey_entity::Entity;
use tablekey_schema::{Item, SchemaDefinition};
use tracing::{debug, info};

/// Log filter directives: `--verbose` forces `debug`, otherwise `RUST_LOG`
/// applies, falling back to `warn`.
pub fn log_directives(verbose: bool, rust_log: Option<String>) -> String {
    if verbose {
        return "debug".into();
    }
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "warn".into())
}

/// Builds the codec from a config file, or from the environment when no
/// file is given.
pub fn load_codec(config: Option<&Path>) -> Result<OpaqueIdCodec> {
    let config = match config {
        Some(path) => CodecConfig::load_from(path)
            .with_context(|| format!("failed to load codec config from {}", path.display()))?,
        None => CodecConfig::from_env().context("codec is not configured")?,
    };
    let codec = OpaqueIdCodec::new(config)?;
    Ok(codec)
}

/// Encodes a partition value and optional sort value.
pub fn encode(codec: &OpaqueIdCodec, partition: &str, sort: Option<&str>) -> Result<String> {
    let tuple = KeyTuple::new(partition, sort.map(String::from));
    Ok(codec.encode(&tuple)?)
}

/// Decodes an opaque id and renders the tuple as a JSON array.
pub fn decode(codec: &OpaqueIdCodec, id: &str) -> Result<String> {
    let tuple = codec.decode(id).context("invalid opaque id")?;
    Ok(String::from_utf8(tuple.to_json())?)
}

/// Reads a schema definition and builds an entity named after the file,
/// with the definition's indexes registered. `.json` files are parsed as
/// JSON, anything else as TOML.
pub fn load_entity(path: &Path) -> Result<Entity> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let definition = if is_json {
        SchemaDefinition::from_json(&text)?
    } else {
        toml::from_str::<SchemaDefinition>(&text)?
    };
    debug!(path = %path.display(), keys = definition.keys.len(), "Parsed schema definition");
    let name = path
        .file_stem()
        .map_or_else(|| "entity".into(), |stem| stem.to_string_lossy().into_owned());
    Ok(Entity::from_definition(&name, &definition)?)
}

/// Validates a schema definition and summarizes its derived keys.
pub fn check_schema(path: &Path) -> Result<String> {
    let entity = load_entity(path)?;
    let mut lines = Vec::new();
    for key in entity.schema().derived_attributes() {
        lines.push(format!(
            "{} ({}): {}",
            key.name(),
            key.role(),
            key.dependencies().join(", ")
        ));
    }
    for index in entity.indexes() {
        lines.push(format!(
            "index {}: {} / {}",
            index.name(),
            index.partition_key().unwrap_or("-"),
            index.sort_key().unwrap_or("-")
        ));
    }
    info!(path = %path.display(), "Schema definition is valid");
    Ok(lines.join("\n"))
}

/// Derives every key attribute of `item` (a JSON object) under the schema at
/// `schema_path`. Adds `hashId` when a codec is supplied.
pub fn derive_keys(
    schema_path: &Path,
    item: &str,
    codec: Option<OpaqueIdCodec>,
) -> Result<String> {
    let item: Item = match serde_json::from_str(item)? {
        Value::Object(map) => Item::from(map),
        other => bail!("item must be a JSON object, got {other}"),
    };

    let with_hash_id = codec.is_some();
    let mut entity = load_entity(schema_path)?;
    if let Some(codec) = codec {
        entity = entity.with_codec(Arc::new(codec));
    }

    let mut keys = Map::new();
    for key in entity.schema().derived_attributes() {
        let value = entity.key(key.role(), &item)?;
        keys.insert(key.name().to_string(), Value::String(value));
    }
    if with_hash_id {
        keys.insert("hashId".into(), Value::String(entity.get_hash_id(&item)?));
    }
    Ok(serde_json::to_string_pretty(&keys)?)
}
