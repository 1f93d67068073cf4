//! In-memory entity store

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{EntityKind, EntitySchema, EntityStore, Item};

/// Entity store backed by a map, for tests and fixtures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<(EntityKind, i64), Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: Item) {
        if let Ok(mut items) = self.items.write() {
            items.insert((item.kind, item.id), item);
        }
    }

    pub fn get(&self, kind: EntityKind, id: i64) -> Option<Item> {
        self.items.read().ok()?.get(&(kind, id)).cloned()
    }
}

impl FromIterator<Item> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        let store = MemoryStore::new();
        for item in iter {
            store.insert(item);
        }
        store
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    type Error = Infallible;

    async fn resolve_item(
        &self,
        schema: &EntitySchema,
        id: i64,
    ) -> Result<Option<Item>, Self::Error> {
        Ok(self.get(schema.kind(), id))
    }
}
