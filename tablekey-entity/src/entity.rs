use crate::error::{Error, Result};
use crate::key::PrimaryKey;
use crate::storage::StorageEngine;
use std::sync::Arc;
use tablekey_codec::{CodecError, OpaqueIdCodec};
use tablekey_schema::{
    CompositeKeySchema, DerivedKeyAttribute, Gsi, Item, KeyError, KeyRole, SchemaDefinition,
};
use tracing::debug;

/// One entity type stored in a single-table design.
///
/// Wraps a [`CompositeKeySchema`] and exposes key derivation, opaque ids and
/// storage delegation. Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct Entity {
    name: String,
    table: String,
    schema: Arc<CompositeKeySchema>,
    indexes: Vec<Gsi>,
    codec: Option<Arc<OpaqueIdCodec>>,
    engine: Option<Arc<dyn StorageEngine>>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("schema", &self.schema)
            .field("indexes", &self.indexes)
            .field("codec", &self.codec)
            .field("engine", &self.engine.as_ref().map(|_| "StorageEngine"))
            .finish()
    }
}

impl Entity {
    /// An entity stored in a table of the same name.
    pub fn new(name: &str, schema: CompositeKeySchema) -> Self {
        Self {
            name: name.to_string(),
            table: name.to_string(),
            schema: Arc::new(schema),
            indexes: Vec::new(),
            codec: None,
            engine: None,
        }
    }

    /// Compiles `definition` and registers every index it declares.
    pub fn from_definition(name: &str, definition: &SchemaDefinition) -> Result<Self> {
        let mut entity = Self::new(name, definition.compile()?);
        for index in &definition.indexes {
            entity = entity.with_index(index.clone())?;
        }
        Ok(entity)
    }

    #[must_use]
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Arc<OpaqueIdCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn StorageEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Registers a secondary index after checking its key references.
    pub fn with_index(mut self, index: Gsi) -> Result<Self> {
        index.validate_against(&self.schema)?;
        self.indexes.push(index);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &CompositeKeySchema {
        &self.schema
    }

    pub fn indexes(&self) -> &[Gsi] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&Gsi> {
        self.indexes.iter().find(|i| i.name == name)
    }

    // ── Key derivation ───────────────────────────────────────────

    fn compose(&self, key: &DerivedKeyAttribute, item: &Item) -> Result<String> {
        self.schema.compose(key, item).map_err(|e| {
            debug!(entity = %self.name, key = key.name(), error = %e, "Key derivation failed");
            e.into()
        })
    }

    /// Derives the value of the key playing `role`.
    pub fn key(&self, role: &KeyRole, item: &Item) -> Result<String> {
        let key = self
            .schema
            .key(role)
            .ok_or_else(|| KeyError::NoSuchKey(role.to_string()))?;
        self.compose(key, item)
    }

    /// Derives the value of the named secondary-index key.
    pub fn index_key(&self, name: &str, item: &Item) -> Result<String> {
        self.key(&KeyRole::index(name), item)
    }

    /// Derives partition and (if defined) sort key from one record.
    pub fn primary_key(&self, item: &Item) -> Result<PrimaryKey> {
        let partition = self.schema.partition_key();
        let mut key = PrimaryKey::new(partition.name(), self.compose(partition, item)?);
        if let Some(sort) = self.schema.sort_key() {
            key = key.with_sort(sort.name(), self.compose(sort, item)?);
        }
        Ok(key)
    }

    // ── Opaque ids ───────────────────────────────────────────────

    fn codec(&self) -> Result<&OpaqueIdCodec> {
        self.codec
            .as_deref()
            .ok_or(Error::Codec(CodecError::NotConfigured))
    }

    /// Derives the primary key and encodes it as an opaque id.
    pub fn get_hash_id(&self, item: &Item) -> Result<String> {
        let codec = self.codec()?;
        let key = self.primary_key(item)?;
        Ok(codec.encode(&key.to_tuple())?)
    }

    /// Decodes an opaque id into this entity's primary key. Position 0 is the
    /// partition value and position 1 the sort value.
    pub fn parse_hash_id(&self, id: &str) -> Result<PrimaryKey> {
        let (partition, sort) = self.codec()?.decode(id)?.into_parts();
        let key = PrimaryKey::new(self.schema.partition_key().name(), partition);
        match (self.schema.sort_key(), sort) {
            (Some(attr), Some(value)) => Ok(key.with_sort(attr.name(), value)),
            (None, None) => Ok(key),
            (Some(attr), None) => Err(self.shape_error(format!(
                "missing value for sort key `{}`",
                attr.name()
            ))),
            (None, Some(_)) => {
                Err(self.shape_error("carries a sort value but the entity has no sort key".into()))
            }
        }
    }

    fn shape_error(&self, reason: String) -> Error {
        debug!(entity = %self.name, %reason, "Opaque id does not fit entity");
        Error::KeyShape {
            entity: self.name.clone(),
            reason,
        }
    }

    // ── Stored form ──────────────────────────────────────────────

    /// Validates required attributes, fills defaults and adds every derived
    /// key attribute: the item as the storage engine should hold it.
    pub fn materialize(&self, mut item: Item) -> Result<Item> {
        let attributes = self.schema.attributes();
        attributes.validate(&item)?;
        attributes.apply_defaults(&mut item);
        for key in self.schema.derived_attributes() {
            let value = self.compose(key, &item)?;
            item.set(key.name(), value);
        }
        Ok(item)
    }

    /// Strips derived key attributes from a stored item.
    pub fn parse(&self, mut stored: Item) -> Item {
        for key in self.schema.derived_attributes() {
            stored.remove(key.name());
        }
        stored
    }

    // ── Storage delegation ───────────────────────────────────────

    fn engine(&self) -> Result<&dyn StorageEngine> {
        self.engine
            .as_deref()
            .ok_or_else(|| Error::NoEngine(self.name.clone()))
    }

    /// Fetches the item whose key `item` derives to.
    pub fn get(&self, item: &Item) -> Result<Option<Item>> {
        let engine = self.engine()?;
        let key = self.primary_key(item)?;
        Ok(engine.get(&self.table, &key)?.map(|stored| self.parse(stored)))
    }

    /// Fetches the item an opaque id refers to.
    pub fn get_by_hash_id(&self, id: &str) -> Result<Option<Item>> {
        let engine = self.engine()?;
        let key = self.parse_hash_id(id)?;
        Ok(engine.get(&self.table, &key)?.map(|stored| self.parse(stored)))
    }

    /// Materializes and writes `item`. Returns its primary key.
    pub fn put(&self, item: Item) -> Result<PrimaryKey> {
        let engine = self.engine()?;
        let (key, stored) = self.prepare_put(item)?;
        engine.put(&self.table, &key, stored)?;
        Ok(key)
    }

    /// Applies `changes` to the item `item` keys to.
    ///
    /// Derived key attributes may not be set directly, nor may the attributes
    /// the partition and sort keys are derived from. Index keys whose
    /// dependencies are touched by `changes` are re-derived from `item`
    /// overlaid with `changes`.
    pub fn update(&self, item: &Item, mut changes: Item) -> Result<Item> {
        let engine = self.engine()?;
        if let Some(key) = self.schema.derived_attributes().find(|k| changes.contains(k.name())) {
            return Err(Error::KeyAttributeUpdate(key.name().to_string()));
        }
        let primary = std::iter::once(self.schema.partition_key()).chain(self.schema.sort_key());
        for key in primary {
            if let Some(attribute) = key.dependencies().iter().find(|d| changes.contains(d)) {
                return Err(Error::KeyDependencyUpdate {
                    key: key.name().to_string(),
                    attribute: attribute.clone(),
                });
            }
        }
        let key = self.primary_key(item)?;

        let mut merged = item.clone();
        for (name, value) in changes.iter() {
            merged.set(name, value.clone());
        }
        for index in self.schema.index_keys() {
            if index.dependencies().iter().any(|d| changes.contains(d)) {
                let value = self.compose(index, &merged)?;
                changes.set(index.name(), value);
            }
        }

        let stored = engine.update(&self.table, &key, changes)?;
        Ok(self.parse(stored))
    }

    /// Removes the item `item` keys to.
    pub fn delete(&self, item: &Item) -> Result<()> {
        let engine = self.engine()?;
        let key = self.primary_key(item)?;
        Ok(engine.delete(&self.table, &key)?)
    }

    /// Fetches the items several records key to; absent items are skipped.
    pub fn batch_get(&self, items: &[Item]) -> Result<Vec<Item>> {
        let engine = self.engine()?;
        let keys = items
            .iter()
            .map(|item| self.primary_key(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(engine
            .batch_get(&self.table, &keys)?
            .into_iter()
            .map(|stored| self.parse(stored))
            .collect())
    }

    /// Materializes and writes all `items` atomically.
    pub fn transact_put(&self, items: Vec<Item>) -> Result<Vec<PrimaryKey>> {
        let engine = self.engine()?;
        let prepared = items
            .into_iter()
            .map(|item| self.prepare_put(item))
            .collect::<Result<Vec<_>>>()?;
        let keys = prepared.iter().map(|(k, _)| k.clone()).collect();
        engine.transact_put(&self.table, prepared)?;
        Ok(keys)
    }

    fn prepare_put(&self, item: Item) -> Result<(PrimaryKey, Item)> {
        let stored = self.materialize(item)?;
        let key = self.primary_key(&stored)?;
        Ok((key, stored))
    }
}
