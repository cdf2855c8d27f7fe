//! Application data attached to schema nodes.
//!
//! Embedders register `(namespace, name)` slots. A schema node carries data
//! for a slot when it has an extension of that namespace and name. While a
//! line is parsed, every result node caches, per slot, the nearest schema
//! node (itself or an ancestor) carrying that slot's data; the parse result
//! keeps the first and last carriers seen.

use std::fmt;
use std::rc::Rc;

use schemash_schema::{Schema, SchemaNodeId};
use serde_json::Value;
use tracing::debug;

use crate::error::EngineError;

/// Index of a registered slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppDataSlot(pub(crate) usize);

impl AppDataSlot {
    /// Position in per-node caches.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Decision of an app-data callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep parsing.
    Continue,
    /// Fail the parse with this message.
    Stop(String),
}

/// What a callback sees when a matched node carries data.
#[derive(Debug)]
pub struct AppDataHit<'a> {
    /// Slot.
    pub slot: AppDataSlot,
    /// Extension namespace.
    pub namespace: &'a str,
    /// Extension name.
    pub name: &'a str,
    /// The extension value.
    pub value: &'a Value,
    /// Schema node carrying the value.
    pub node: SchemaNodeId,
    /// Word that matched the node.
    pub word: &'a str,
}

/// Callback invoked when a matched node carries data for a slot.
pub type AppDataCallback = Rc<dyn Fn(&AppDataHit<'_>) -> Verdict>;

#[derive(Clone)]
struct Entry {
    namespace: String,
    name: String,
    callback: Option<AppDataCallback>,
}

/// Registered slots of one engine.
#[derive(Clone, Default)]
pub struct AppDataRegistry {
    entries: Vec<Entry>,
}

impl fmt::Debug for AppDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| format!("{}:{}", e.namespace, e.name)))
            .finish()
    }
}

impl AppDataRegistry {
    /// Register a slot, or return the existing slot for the same key.
    ///
    /// A repeated registration must pass the same callback (by identity) or
    /// none. A slot first registered without a callback adopts the first
    /// callback supplied later.
    pub fn register(
        &mut self,
        namespace: &str,
        name: &str,
        callback: Option<AppDataCallback>,
    ) -> Result<AppDataSlot, EngineError> {
        if let Some(i) = self
            .entries
            .iter()
            .position(|e| e.namespace == namespace && e.name == name)
        {
            let entry = &mut self.entries[i];
            match (&entry.callback, callback) {
                (_, None) => {}
                (None, Some(cb)) => entry.callback = Some(cb),
                (Some(existing), Some(cb)) if Rc::ptr_eq(existing, &cb) => {}
                (Some(_), Some(_)) => {
                    return Err(EngineError::AppDataCallbackMismatch {
                        namespace: namespace.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            return Ok(AppDataSlot(i));
        }
        self.entries.push(Entry {
            namespace: namespace.to_string(),
            name: name.to_string(),
            callback,
        });
        debug!(namespace, name, slot = self.entries.len() - 1, "registered app data");
        Ok(AppDataSlot(self.entries.len() - 1))
    }

    /// Slot registered for a key.
    pub fn find(&self, namespace: &str, name: &str) -> Option<AppDataSlot> {
        self.entries
            .iter()
            .position(|e| e.namespace == namespace && e.name == name)
            .map(AppDataSlot)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(namespace, name)` of a slot.
    pub fn key(&self, slot: AppDataSlot) -> (&str, &str) {
        let e = &self.entries[slot.0];
        (&e.namespace, &e.name)
    }

    /// Data of `slot` on a schema node.
    pub fn value<'s>(&self, schema: &'s Schema, slot: AppDataSlot, node: SchemaNodeId) -> Option<&'s Value> {
        let e = &self.entries[slot.0];
        schema.extension(node, &e.namespace, &e.name)
    }

    /// Cache for a result node: the parent's cache overlaid with the
    /// slots `node` itself carries. Also reports which slots `node` carries.
    pub(crate) fn propagate(
        &self,
        schema: &Schema,
        parent: &[Option<SchemaNodeId>],
        node: Option<SchemaNodeId>,
    ) -> (Vec<Option<SchemaNodeId>>, Vec<AppDataSlot>) {
        let mut cache = vec![None; self.entries.len()];
        cache[..parent.len().min(self.entries.len())]
            .copy_from_slice(&parent[..parent.len().min(self.entries.len())]);
        let mut own = Vec::new();
        if let Some(node) = node {
            for i in 0..self.entries.len() {
                if self.value(schema, AppDataSlot(i), node).is_some() {
                    cache[i] = Some(node);
                    own.push(AppDataSlot(i));
                }
            }
        }
        (cache, own)
    }

    /// Run the slot's callback, if any.
    pub(crate) fn invoke(&self, hit: &AppDataHit<'_>) -> Verdict {
        match &self.entries[hit.slot.0].callback {
            Some(cb) => cb(hit),
            None => Verdict::Continue,
        }
    }
}
