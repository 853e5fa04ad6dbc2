//! Collection schema & in-memory model.
//!
//! The read-only description of the host's data collections that the
//! parser and validators resolve field paths against. The host (datasource
//! layer) builds it once; this crate only reads it.

use crate::error::Error;
use crate::operators::Operator;
use crate::types::ColumnType;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A filterable column on a collection.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    pub column_type: ColumnType,
    pub is_primary_key: bool,
    /// Per-field operator whitelist; may be a subset of the type's full
    /// allowed set (e.g. `Match` disabled to avoid ReDoS).
    pub filter_operators: BTreeSet<Operator>,
    /// Legal values when `column_type` is Enum; empty otherwise.
    pub enum_values: Vec<String>,
}

impl ColumnSchema {
    pub fn new(column_type: impl Into<ColumnType>) -> Self {
        ColumnSchema {
            column_type: column_type.into(),
            is_primary_key: false,
            filter_operators: BTreeSet::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.filter_operators = operators.into_iter().collect();
        self
    }

    pub fn with_enum_values(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// How a relation joins to its foreign collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::ManyToOne => "ManyToOne",
            RelationKind::OneToOne => "OneToOne",
            RelationKind::OneToMany => "OneToMany",
            RelationKind::ManyToMany => "ManyToMany",
        }
    }
}

/// A relation to another collection.
#[derive(Debug, Clone, Serialize)]
pub struct RelationSchema {
    pub kind: RelationKind,
    pub foreign_collection: String,
}

/// A named field on a collection: either a column or a relation.
#[derive(Debug, Clone, Serialize)]
pub enum FieldSchema {
    Column(ColumnSchema),
    Relation(RelationSchema),
}

/// A data collection exposed by the host.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    fields: HashMap<String, FieldSchema>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, column: ColumnSchema) -> Self {
        self.fields.insert(name.into(), FieldSchema::Column(column));
        self
    }

    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        kind: RelationKind,
        foreign_collection: impl Into<String>,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldSchema::Relation(RelationSchema {
                kind,
                foreign_collection: foreign_collection.into(),
            }),
        );
        self
    }

    /// Get a field's schema by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Operator whitelist for a column, empty for unknown/relation fields.
    pub fn filter_operators(&self, name: &str) -> BTreeSet<Operator> {
        match self.fields.get(name) {
            Some(FieldSchema::Column(c)) => c.filter_operators.clone(),
            _ => BTreeSet::new(),
        }
    }
}

/// The complete schema model, keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    collections: HashMap<String, Collection>,
}

impl SchemaCache {
    pub fn new() -> Self {
        SchemaCache::default()
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.insert(collection.name.clone(), collection);
        self
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Resolve a (possibly dotted) field path to its terminal column.
    ///
    /// Every segment except the last must be a relation; the last must be a
    /// column. Returns the column together with the collection that owns it.
    pub fn resolve<'a>(
        &'a self,
        collection: &'a Collection,
        field_path: &str,
    ) -> Result<(&'a Collection, &'a ColumnSchema), Error> {
        let mut current = collection;
        let mut path = field_path;

        while let Some((head, rest)) = path.split_once('.') {
            match current.field(head) {
                Some(FieldSchema::Relation(relation)) => {
                    current = self.collection(&relation.foreign_collection).ok_or_else(|| {
                        Error::SchemaMismatch(format!(
                            "Collection not found: '{}'",
                            relation.foreign_collection
                        ))
                    })?;
                    path = rest;
                }
                Some(FieldSchema::Column(_)) => {
                    return Err(Error::SchemaMismatch(format!(
                        "Unexpected field type: '{}.{}' found 'Column' expected 'Relation'",
                        current.name, head
                    )));
                }
                None => {
                    return Err(Error::SchemaMismatch(format!(
                        "Relation not found: '{}.{}'",
                        current.name, head
                    )));
                }
            }
        }

        match current.field(path) {
            Some(FieldSchema::Column(column)) => Ok((current, column)),
            Some(FieldSchema::Relation(relation)) => Err(Error::SchemaMismatch(format!(
                "Unexpected field type: '{}.{}' found '{}' expected 'Column'",
                current.name,
                path,
                relation.kind.as_str()
            ))),
            None => Err(Error::SchemaMismatch(format!(
                "Column not found: '{}.{}'",
                current.name, path
            ))),
        }
    }
}
