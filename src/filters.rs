//! Filter composition.
//!
//! A [`Filter`] bundles a condition tree with pagination, sort, search, and
//! segment parameters: the object a request handler passes to the
//! datasource's list/aggregate/update/delete operations. Immutable once
//! built; the `with_*` methods return new values.

use crate::condition_tree::ConditionTree;
use crate::error::Error;
use crate::schema::{Collection, SchemaCache};

/// Pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Page { offset, limit }
    }
}

/// A single sort clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub ascending: bool,
}

/// An ordered list of sort clauses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort(pub Vec<SortClause>);

impl Sort {
    /// Parse a sort string: `"name,-created_at"` (leading `-` = descending).
    pub fn parse(sort_str: &str) -> Result<Sort, Error> {
        let mut clauses = Vec::new();
        for part in sort_str.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (field, ascending) = match part.strip_prefix('-') {
                Some(rest) => (rest, false),
                None => (part, true),
            };
            if field.is_empty() {
                return Err(Error::MalformedInput(format!(
                    "Invalid sort clause: '{}'",
                    part
                )));
            }
            clauses.push(SortClause {
                field: field.to_string(),
                ascending,
            });
        }
        Ok(Sort(clauses))
    }

    /// Check every sort field resolves to a column on the collection.
    pub fn validate(&self, cache: &SchemaCache, collection: &Collection) -> Result<(), Error> {
        for clause in &self.0 {
            cache.resolve(collection, &clause.field)?;
        }
        Ok(())
    }
}

/// The parameters of one collection operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub condition_tree: Option<ConditionTree>,
    pub page: Option<Page>,
    pub sort: Option<Sort>,
    pub search: Option<String>,
    pub search_extended: bool,
    pub segment: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn with_condition_tree(mut self, tree: ConditionTree) -> Self {
        self.condition_tree = Some(tree);
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>, extended: bool) -> Self {
        self.search = Some(search.into());
        self.search_extended = extended;
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use crate::schema::ColumnSchema;
    use crate::types::PrimitiveType;
    use serde_json::json;

    #[test]
    fn test_parse_sort() {
        let sort = Sort::parse("name,-created_at").unwrap();
        assert_eq!(
            sort,
            Sort(vec![
                SortClause {
                    field: "name".into(),
                    ascending: true
                },
                SortClause {
                    field: "created_at".into(),
                    ascending: false
                },
            ])
        );
    }

    #[test]
    fn test_parse_sort_rejects_bare_dash() {
        assert!(Sort::parse("name,-").is_err());
    }

    #[test]
    fn test_sort_validation() {
        let cache = SchemaCache::new().with_collection(
            Collection::new("users")
                .with_column("name", ColumnSchema::new(PrimitiveType::String)),
        );
        let users = cache.collection("users").unwrap();
        Sort::parse("name").unwrap().validate(&cache, users).unwrap();
        let err = Sort::parse("-age").unwrap().validate(&cache, users).unwrap_err();
        assert!(err.to_string().contains("Column not found: 'users.age'"));
    }

    #[test]
    fn test_filter_builder() {
        let filter = Filter::new()
            .with_condition_tree(ConditionTree::leaf("id", Operator::Equal, json!(1)))
            .with_page(Page::new(0, 25))
            .with_sort(Sort::parse("-id").unwrap())
            .with_search("dune", false)
            .with_segment("recent");
        assert_eq!(filter.page, Some(Page::new(0, 25)));
        assert_eq!(filter.search.as_deref(), Some("dune"));
        assert!(!filter.search_extended);
        assert_eq!(filter.segment.as_deref(), Some("recent"));
        assert!(filter.condition_tree.is_some());
    }
}
