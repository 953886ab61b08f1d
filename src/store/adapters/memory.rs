//! In-memory store for migration tests and embedded use.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{
    domain::{Alteration, FieldKind, FieldSpec, IndexSpec, Predicate, Record},
    ports::{DataStore, StoreError, StoreResult},
};

/// Thread-safe in-memory store.
///
/// Every written record, including each row touched by an update or delete,
/// increments a write counter so tests can assert that a step avoided no-op
/// writes. Raw statements are recorded verbatim and are not interpreted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    collections: HashMap<String, Collection>,
    writes: u64,
    statements: Vec<String>,
}

#[derive(Debug, Default)]
struct Collection {
    fields: BTreeMap<String, FieldSpec>,
    indexes: BTreeMap<String, IndexSpec>,
    records: Vec<Record>,
}

impl Collection {
    fn require_field(&self, collection: &str, field: &str) -> StoreResult<()> {
        if self.fields.contains_key(field) {
            Ok(())
        } else {
            Err(StoreError::MissingField {
                collection: collection.to_owned(),
                field: field.to_owned(),
            })
        }
    }
}

impl InMemoryDataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection with the given fields, replacing any existing
    /// collection of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the state lock is poisoned.
    pub fn create_collection(
        &self,
        name: &str,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let collection = Collection {
            fields: fields
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
            ..Collection::default()
        };
        state.collections.insert(name.to_owned(), collection);
        Ok(())
    }

    /// Inserts records without counting them as writes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCollection`] or
    /// [`StoreError::MissingField`] when a record does not fit the
    /// collection.
    pub fn seed(&self, name: &str, records: impl IntoIterator<Item = Record>) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let collection = collection_mut(&mut state, name)?;
        for record in records {
            let complete = complete_record(name, collection, record)?;
            collection.records.push(complete);
        }
        Ok(())
    }

    /// Returns a snapshot of every record in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCollection`] when the collection does
    /// not exist.
    pub fn records(&self, name: &str) -> StoreResult<Vec<Record>> {
        let state = self.read_state()?;
        let collection = collection_ref(&state, name)?;
        Ok(collection.records.clone())
    }

    /// Returns the field definitions of a collection, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCollection`] when the collection does
    /// not exist.
    pub fn fields(&self, name: &str) -> StoreResult<Vec<FieldSpec>> {
        let state = self.read_state()?;
        let collection = collection_ref(&state, name)?;
        Ok(collection.fields.values().cloned().collect())
    }

    /// Returns the index definitions of a collection, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingCollection`] when the collection does
    /// not exist.
    pub fn indexes(&self, name: &str) -> StoreResult<Vec<IndexSpec>> {
        let state = self.read_state()?;
        let collection = collection_ref(&state, name)?;
        Ok(collection.indexes.values().cloned().collect())
    }

    /// Returns the number of writes performed through the port.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the state lock is poisoned.
    pub fn write_count(&self) -> StoreResult<u64> {
        Ok(self.read_state()?.writes)
    }

    /// Returns raw statements executed through the port, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the state lock is poisoned.
    pub fn statements(&self) -> StoreResult<Vec<String>> {
        Ok(self.read_state()?.statements.clone())
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn collection_ref<'a>(state: &'a InMemoryStoreState, name: &str) -> StoreResult<&'a Collection> {
    state
        .collections
        .get(name)
        .ok_or_else(|| StoreError::MissingCollection(name.to_owned()))
}

fn collection_mut<'a>(
    state: &'a mut InMemoryStoreState,
    name: &str,
) -> StoreResult<&'a mut Collection> {
    state
        .collections
        .get_mut(name)
        .ok_or_else(|| StoreError::MissingCollection(name.to_owned()))
}

/// Checks record fields against the collection and fills in defaults.
fn complete_record(name: &str, collection: &Collection, record: Record) -> StoreResult<Record> {
    for field in record.keys() {
        collection.require_field(name, field)?;
    }
    let mut complete = record;
    for (field, spec) in &collection.fields {
        if !complete.contains_key(field) {
            complete.insert(field.clone(), spec.default.clone().unwrap_or(Value::Null));
        }
    }
    Ok(complete)
}

fn apply_alteration(state: &mut InMemoryStoreState, alteration: &Alteration) -> StoreResult<()> {
    let name = alteration.collection();
    let collection = collection_mut(state, name)?;
    match alteration {
        Alteration::AddField { field, .. } => {
            if collection.fields.contains_key(&field.name) {
                return Err(StoreError::FieldExists {
                    collection: name.to_owned(),
                    field: field.name.clone(),
                });
            }
            let initial = field.default.clone().unwrap_or(Value::Null);
            for record in &mut collection.records {
                record.insert(field.name.clone(), initial.clone());
            }
            collection.fields.insert(field.name.clone(), field.clone());
        }
        Alteration::DropField { field, .. } => {
            collection.require_field(name, field)?;
            collection.fields.remove(field);
            for record in &mut collection.records {
                record.remove(field);
            }
        }
        Alteration::ResizeField { field, to, .. } => {
            let spec = collection
                .fields
                .get_mut(field)
                .ok_or_else(|| StoreError::MissingField {
                    collection: name.to_owned(),
                    field: field.clone(),
                })?;
            spec.kind = FieldKind::Text { max_len: Some(*to) };
        }
        Alteration::AddIndex { index, .. } => {
            if collection.indexes.contains_key(&index.name) {
                return Err(StoreError::IndexExists {
                    collection: name.to_owned(),
                    index: index.name.clone(),
                });
            }
            for field in &index.fields {
                collection.require_field(name, field)?;
            }
            collection.indexes.insert(index.name.clone(), index.clone());
        }
        Alteration::DropIndex { index, .. } => {
            if collection.indexes.remove(index).is_none() {
                return Err(StoreError::MissingIndex {
                    collection: name.to_owned(),
                    index: index.clone(),
                });
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn alter(&self, alteration: &Alteration) -> StoreResult<()> {
        let mut state = self.write_state()?;
        apply_alteration(&mut state, alteration)
    }

    async fn select(&self, collection: &str, filter: &Predicate) -> StoreResult<Vec<Record>> {
        let state = self.read_state()?;
        let found = collection_ref(&state, collection)?;
        Ok(found
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Predicate,
        changes: &Record,
    ) -> StoreResult<u64> {
        let mut state = self.write_state()?;
        let target = collection_mut(&mut state, collection)?;
        for field in changes.keys() {
            target.require_field(collection, field)?;
        }

        let mut written = 0_u64;
        for record in target
            .records
            .iter_mut()
            .filter(|record| filter.matches(record))
        {
            for (field, value) in changes {
                record.insert(field.clone(), value.clone());
            }
            written += 1;
        }
        state.writes += written;
        Ok(written)
    }

    async fn insert(&self, collection: &str, record: &Record) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let target = collection_mut(&mut state, collection)?;
        let complete = complete_record(collection, target, record.clone())?;
        target.records.push(complete);
        state.writes += 1;
        Ok(())
    }

    async fn delete(&self, collection: &str, filter: &Predicate) -> StoreResult<u64> {
        let mut state = self.write_state()?;
        let target = collection_mut(&mut state, collection)?;
        let before = target.records.len();
        target.records.retain(|record| !filter.matches(record));
        let removed =
            u64::try_from(before - target.records.len()).map_err(StoreError::persistence)?;
        state.writes += removed;
        Ok(removed)
    }

    async fn execute_raw(&self, statement: &str) -> StoreResult<u64> {
        let mut state = self.write_state()?;
        state.statements.push(statement.to_owned());
        state.writes += 1;
        Ok(0)
    }
}
