use std::collections::BTreeMap;

use utoipa::openapi::{schema::Schema, RefOr};

/// Component schemas collected from `OperationBuilder` registrations.
#[derive(Debug, Default, Clone)]
pub struct ComponentsRegistry {
    pub schemas: BTreeMap<String, RefOr<Schema>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaInsert {
    Inserted,
    Identical,
    /// Same name, different content; the first registration is kept.
    Conflict,
}

impl ComponentsRegistry {
    pub fn register_schema(&mut self, name: impl Into<String>, schema: RefOr<Schema>) -> SchemaInsert {
        let name = name.into();
        let Some(existing) = self.schemas.get(&name) else {
            self.schemas.insert(name, schema);
            return SchemaInsert::Inserted;
        };

        let same = match (serde_json::to_value(existing), serde_json::to_value(&schema)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same {
            SchemaInsert::Identical
        } else {
            tracing::warn!(schema_name = %name, "conflicting schema content; keeping the first");
            SchemaInsert::Conflict
        }
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}
