//! Shared test utilities for the mongo-indexer workspace.
//!
//! Provides [`MemoryCatalog`], an in-memory [`IndexCatalog`] that mimics the
//! server behavior the engine depends on: every collection carries an `_id_`
//! index, creating an index implicitly creates its collection, duplicate
//! names and unknown drops are rejected, views are not listed as collections
//! and refuse `listIndexes`. It is a dev-dependency only, never
//! published.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use bson::{Document, doc};
use indexer_core::{
    Error, IDENTITY_INDEX, IndexCatalog, IndexDescriptor, OperationKind, Result,
};

/// In-memory database used as the live side in tests
pub struct MemoryCatalog {
    name: String,
    collections: RefCell<Vec<(String, Vec<Document>)>>,
    views: RefCell<HashSet<String>>,
    failing: RefCell<HashSet<(OperationKind, String, String)>>,
    unreachable: Cell<bool>,
    operations: RefCell<Vec<String>>,
}

impl MemoryCatalog {
    /// Create an empty database.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RefCell::new(Vec::new()),
            views: RefCell::new(HashSet::new()),
            failing: RefCell::new(HashSet::new()),
            unreachable: Cell::new(false),
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Add a collection holding the identity index plus `indexes`.
    pub fn with_collection(self, collection: &str, indexes: Vec<IndexDescriptor>) -> Self {
        self.ensure_collection(collection);
        for index in &indexes {
            let spec = native(index);
            self.push_document(collection, spec);
        }
        self
    }

    /// Add a raw native document, e.g. one the model cannot decode.
    pub fn with_native_index(self, collection: &str, document: Document) -> Self {
        self.ensure_collection(collection);
        self.push_document(collection, document);
        self
    }

    /// Add a read-only view. It is not a collection and has no indexes.
    pub fn with_view(self, view: &str) -> Self {
        self.views.borrow_mut().insert(view.to_string());
        self
    }

    /// Make the next create or drop of `index` on `collection` fail.
    pub fn fail_on(&self, kind: OperationKind, collection: &str, index: &str) {
        self.failing
            .borrow_mut()
            .insert((kind, collection.to_string(), index.to_string()));
    }

    /// Make every call fail as if the server were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.set(unreachable);
    }

    /// Mutations performed so far, as `"drop users.idx_email"` strings.
    pub fn operations(&self) -> Vec<String> {
        self.operations.borrow().clone()
    }

    /// Decoded non-identity indexes of one collection.
    pub fn indexes(&self, collection: &str) -> Vec<IndexDescriptor> {
        self.documents(collection)
            .unwrap_or_default()
            .iter()
            .filter(|doc| doc.get_str("name").ok() != Some(IDENTITY_INDEX))
            .map(|doc| IndexDescriptor::from_document(doc).expect("stored index decodes"))
            .collect()
    }

    /// Names of all indexes of one collection, identity index included.
    pub fn index_names(&self, collection: &str) -> Vec<String> {
        self.documents(collection)
            .unwrap_or_default()
            .iter()
            .filter_map(|doc| doc.get_str("name").ok().map(str::to_string))
            .collect()
    }

    fn documents(&self, collection: &str) -> Option<Vec<Document>> {
        self.collections
            .borrow()
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs.clone())
    }

    fn ensure_collection(&self, collection: &str) {
        let mut collections = self.collections.borrow_mut();
        if !collections.iter().any(|(name, _)| name == collection) {
            let identity = doc! { "v": 2, "key": { "_id": 1 }, "name": IDENTITY_INDEX };
            collections.push((collection.to_string(), vec![identity]));
        }
    }

    fn push_document(&self, collection: &str, document: Document) {
        let mut collections = self.collections.borrow_mut();
        if let Some((_, docs)) = collections.iter_mut().find(|(name, _)| name == collection) {
            docs.push(document);
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.get() {
            Err(Error::connection("server selection timeout: no servers available"))
        } else {
            Ok(())
        }
    }

    fn check_injected(&self, kind: OperationKind, collection: &str, index: &str) -> Result<()> {
        let key = (kind, collection.to_string(), index.to_string());
        if self.failing.borrow_mut().remove(&key) {
            Err(Error::operation(kind, collection, index, "injected failure"))
        } else {
            Ok(())
        }
    }
}

fn native(index: &IndexDescriptor) -> Document {
    let mut document = doc! { "v": 2 };
    let spec = index
        .to_create_document()
        .expect("test index has a valid partial filter");
    for (key, value) in spec {
        document.insert(key, value);
    }
    document
}

impl IndexCatalog for MemoryCatalog {
    fn database_name(&self) -> &str {
        &self.name
    }

    fn list_collection_names(&self) -> Result<Vec<String>> {
        self.check_reachable()?;
        Ok(self
            .collections
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>> {
        self.check_reachable()?;
        let namespace = format!("{}.{}", self.name, collection);
        if self.views.borrow().contains(collection) {
            return Err(Error::listing(
                &namespace,
                format!("Namespace {namespace} is a view, not a collection"),
            ));
        }
        self.documents(collection)
            .ok_or_else(|| Error::listing(&namespace, format!("ns does not exist: {namespace}")))
    }

    fn create_index(&self, collection: &str, index: &IndexDescriptor) -> Result<()> {
        self.check_reachable()?;
        self.check_injected(OperationKind::Create, collection, &index.name)?;
        if self.views.borrow().contains(collection) {
            return Err(Error::operation(
                OperationKind::Create,
                collection,
                &index.name,
                "cannot create indexes on a view",
            ));
        }

        let spec = index
            .to_create_document()
            .map_err(|e| Error::operation(OperationKind::Create, collection, &index.name, e))?;

        self.ensure_collection(collection);
        if self.index_names(collection).contains(&index.name) {
            return Err(Error::operation(
                OperationKind::Create,
                collection,
                &index.name,
                "index already exists with a different definition",
            ));
        }

        let mut document = doc! { "v": 2 };
        for (key, value) in spec {
            document.insert(key, value);
        }
        self.push_document(collection, document);
        self.operations
            .borrow_mut()
            .push(format!("create {}.{}", collection, index.name));
        Ok(())
    }

    fn drop_index(&self, collection: &str, name: &str) -> Result<()> {
        self.check_reachable()?;
        self.check_injected(OperationKind::Drop, collection, name)?;

        if name == IDENTITY_INDEX {
            return Err(Error::operation(
                OperationKind::Drop,
                collection,
                name,
                "cannot drop _id index",
            ));
        }

        let mut collections = self.collections.borrow_mut();
        let Some((_, docs)) = collections.iter_mut().find(|(c, _)| c == collection) else {
            return Err(Error::operation(
                OperationKind::Drop,
                collection,
                name,
                "ns not found",
            ));
        };

        let before = docs.len();
        docs.retain(|doc| doc.get_str("name").ok() != Some(name));
        if docs.len() == before {
            return Err(Error::operation(
                OperationKind::Drop,
                collection,
                name,
                format!("index not found with name [{name}]"),
            ));
        }

        self.operations
            .borrow_mut()
            .push(format!("drop {collection}.{name}"));
        Ok(())
    }
}
