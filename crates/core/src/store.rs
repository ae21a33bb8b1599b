//! In-memory Collection Store.
//!
//! Owns every collection (in insertion order) plus the pointer to the
//! collection that [`CollectionStore::update_current`] writes to.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::collection::{default_attributes, Collection, CollectionStats};
use crate::error::{CoreError, CoreResult};
use crate::semver::SemVer;
use crate::status::{Status, StatusSet};
use crate::types::new_id;
use crate::value::deep_merge;

/// Format tag stamped on single-collection exports.
pub const COLLECTION_EXPORT_FORMAT: &str = "design-system-v1.0";

#[derive(Debug, Default)]
pub struct CollectionStore {
    collections: IndexMap<String, Collection>,
    current: Option<String>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Create a collection with an empty attribute tree and make it current.
    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        version: &str,
        status: StatusSet,
    ) -> CoreResult<Collection> {
        if name.trim().is_empty() {
            return Err(CoreError::validation(
                "collection-name",
                "Collection name must not be empty",
            ));
        }
        let version: SemVer = version.parse()?;
        let now = Utc::now();
        let collection = Collection {
            id: new_id("ds"),
            name: name.to_string(),
            description: description.to_string(),
            version,
            status,
            created_at: now,
            updated_at: now,
            attributes: default_attributes(),
        };

        if collection.status.contains(Status::Default) {
            self.demote_defaults_except(&collection.id);
        }
        self.collections
            .insert(collection.id.clone(), collection.clone());
        self.current = Some(collection.id.clone());

        tracing::info!(collection_id = %collection.id, name, %version, "Collection created");
        Ok(collection)
    }

    /// Recursively merge a partial tree into the collection under the
    /// current pointer.
    pub fn update_current(&mut self, updates: &Value) -> CoreResult<Collection> {
        let id = self
            .current
            .clone()
            .ok_or_else(|| CoreError::not_found("active collection", "current"))?;
        self.update(&id, updates)
    }

    /// Recursively merge a partial tree into a specific collection.
    ///
    /// Keyed maps merge key by key; scalars and sequences are replaced. The
    /// id and creation time can not be changed through a merge.
    pub fn update(&mut self, id: &str, updates: &Value) -> CoreResult<Collection> {
        if !updates.is_object() {
            return Err(CoreError::validation(
                "input",
                "Updates must be a JSON object",
            ));
        }
        let existing = self.get_required(id)?;
        let created_at = existing.created_at;
        let mut document = existing.to_document()?;
        deep_merge(&mut document, updates);

        let mut merged = Collection::from_document(document)?;
        merged.id = id.to_string();
        merged.created_at = created_at;
        merged.updated_at = Utc::now();
        self.write(merged)
    }

    /// Replace a collection outright from a full document (no merge).
    pub fn replace(&mut self, id: &str, document: Value) -> CoreResult<Collection> {
        self.get_required(id)?;
        let mut replacement = Collection::from_document(document)?;
        replacement.id = id.to_string();
        tracing::info!(collection_id = id, version = %replacement.version, "Collection replaced");
        self.write(replacement)
    }

    /// Set the version and refresh `updated_at`.
    pub fn set_version(&mut self, id: &str, version: SemVer) -> CoreResult<Collection> {
        let collection = self.get_mut_required(id)?;
        collection.version = version;
        collection.updated_at = Utc::now();
        Ok(collection.clone())
    }

    /// Rewrite a collection's tags.
    ///
    /// If the new tags include `default`, every other collection loses its
    /// `default` tag; one left with no tags at all becomes `active`.
    pub fn set_status(&mut self, id: &str, status: StatusSet) -> CoreResult<Collection> {
        let collection = self.get_mut_required(id)?;
        collection.status = status;
        collection.updated_at = Utc::now();
        let updated = collection.clone();

        if updated.status.contains(Status::Default) {
            self.demote_defaults_except(id);
        }
        tracing::info!(collection_id = id, status = %updated.status, "Collection status set");
        Ok(updated)
    }

    /// Move the current pointer to an existing collection.
    pub fn select(&mut self, id: &str) -> CoreResult<()> {
        self.get_required(id)?;
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Merge a complete reference attribute tree into the current collection.
    pub fn populate_current(&mut self, attributes: &Value) -> CoreResult<Collection> {
        self.update_current(attributes)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    pub fn get_all(&self) -> Vec<&Collection> {
        self.collections.values().collect()
    }

    /// First collection, in insertion order, tagged `active` or `default`.
    pub fn get_active(&self) -> Option<&Collection> {
        self.collections.values().find(|c| c.status.is_live())
    }

    /// The collection under the current pointer.
    pub fn current(&self) -> Option<&Collection> {
        self.current.as_deref().and_then(|id| self.collections.get(id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn stats(&self, id: &str) -> CoreResult<CollectionStats> {
        Ok(self.get_required(id)?.stats())
    }

    /// The collection document stamped with export time and format tag.
    pub fn export_collection(&self, id: &str) -> CoreResult<Value> {
        let mut document = self.get_required(id)?.to_document()?;
        if let Value::Object(map) = &mut document {
            map.insert("exportedAt".to_string(), json!(Utc::now()));
            map.insert("format".to_string(), json!(COLLECTION_EXPORT_FORMAT));
        }
        Ok(document)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn get_required(&self, id: &str) -> CoreResult<&Collection> {
        self.collections
            .get(id)
            .ok_or_else(|| CoreError::not_found("collection", id))
    }

    fn get_mut_required(&mut self, id: &str) -> CoreResult<&mut Collection> {
        self.collections
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("collection", id))
    }

    fn write(&mut self, collection: Collection) -> CoreResult<Collection> {
        if collection.status.contains(Status::Default) {
            self.demote_defaults_except(&collection.id);
        }
        self.collections
            .insert(collection.id.clone(), collection.clone());
        Ok(collection)
    }

    fn demote_defaults_except(&mut self, keep: &str) {
        for (id, other) in self.collections.iter_mut() {
            if id != keep && other.status.remove(Status::Default) {
                if other.status.is_empty() {
                    other.status.insert(Status::Active);
                }
                other.updated_at = Utc::now();
                tracing::debug!(collection_id = %id, "Default tag removed");
            }
        }
    }
}
