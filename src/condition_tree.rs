//! Condition tree model.
//!
//! A boolean expression tree of field comparisons (Leaf) combined with
//! And/Or (Branch). Nodes are immutable value objects: transforms produce
//! new trees, structural equality is derived, and the plain-object form is
//! the wire format the parser consumes and `to_plain_object` emits.

use crate::operators::{Aggregator, Operator};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeSet;

/// A single field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Dot-path, possibly traversing relations (`"author.name"`).
    pub field: String,
    pub operator: Operator,
    pub value: JsonValue,
}

/// A node of a condition tree.
///
/// An empty `And` branch reads as "no constraint" (always true); an empty
/// `Or` branch matches nothing. The crate preserves empty branches as
/// written and never rewrites one into the other.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    Leaf(Leaf),
    Branch {
        aggregator: Aggregator,
        conditions: Vec<ConditionTree>,
    },
}

impl ConditionTree {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: JsonValue) -> Self {
        ConditionTree::Leaf(Leaf {
            field: field.into(),
            operator,
            value,
        })
    }

    pub fn and(conditions: Vec<ConditionTree>) -> Self {
        ConditionTree::Branch {
            aggregator: Aggregator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<ConditionTree>) -> Self {
        ConditionTree::Branch {
            aggregator: Aggregator::Or,
            conditions,
        }
    }

    /// Serialize to the plain nested map wire form, with canonical
    /// capitalized operator/aggregator names.
    pub fn to_plain_object(&self) -> JsonValue {
        match self {
            ConditionTree::Leaf(leaf) => json!({
                "field": leaf.field,
                "operator": leaf.operator.as_str(),
                "value": leaf.value,
            }),
            ConditionTree::Branch {
                aggregator,
                conditions,
            } => json!({
                "aggregator": aggregator.as_str(),
                "conditions": conditions
                    .iter()
                    .map(ConditionTree::to_plain_object)
                    .collect::<Vec<_>>(),
            }),
        }
    }

    /// Produce a new tree with every leaf replaced by `replace(leaf)`.
    pub fn replace_leafs(&self, replace: &impl Fn(&Leaf) -> ConditionTree) -> ConditionTree {
        match self {
            ConditionTree::Leaf(leaf) => replace(leaf),
            ConditionTree::Branch {
                aggregator,
                conditions,
            } => ConditionTree::Branch {
                aggregator: *aggregator,
                conditions: conditions
                    .iter()
                    .map(|c| c.replace_leafs(replace))
                    .collect(),
            },
        }
    }

    /// Visit every leaf, depth-first in declaration order.
    pub fn for_each_leaf(&self, visit: &mut impl FnMut(&Leaf)) {
        match self {
            ConditionTree::Leaf(leaf) => visit(leaf),
            ConditionTree::Branch { conditions, .. } => {
                for condition in conditions {
                    condition.for_each_leaf(visit);
                }
            }
        }
    }

    /// Sorted, deduplicated list of fields the tree touches.
    pub fn projection(&self) -> Vec<String> {
        let mut fields = BTreeSet::new();
        self.for_each_leaf(&mut |leaf| {
            fields.insert(leaf.field.clone());
        });
        fields.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ConditionTree {
        ConditionTree::and(vec![
            ConditionTree::leaf("title", Operator::Contains, json!("dune")),
            ConditionTree::or(vec![
                ConditionTree::leaf("id", Operator::GreaterThan, json!(7)),
                ConditionTree::leaf("author.name", Operator::Equal, json!("Herbert")),
            ]),
        ])
    }

    #[test]
    fn test_to_plain_object() {
        let plain = sample_tree().to_plain_object();
        assert_eq!(plain["aggregator"], "And");
        assert_eq!(plain["conditions"][0]["operator"], "Contains");
        assert_eq!(plain["conditions"][1]["aggregator"], "Or");
        assert_eq!(plain["conditions"][1]["conditions"][0]["value"], 7);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(sample_tree(), sample_tree());
        assert_ne!(
            sample_tree(),
            ConditionTree::leaf("title", Operator::Contains, json!("dune"))
        );
    }

    #[test]
    fn test_replace_leafs() {
        let rewritten = sample_tree().replace_leafs(&|leaf| {
            if leaf.field == "id" {
                ConditionTree::leaf("id", Operator::Equal, json!(0))
            } else {
                ConditionTree::Leaf(leaf.clone())
            }
        });
        let plain = rewritten.to_plain_object();
        assert_eq!(plain["conditions"][1]["conditions"][0]["operator"], "Equal");
        assert_eq!(plain["conditions"][1]["conditions"][0]["value"], 0);
        // The input tree is not mutated.
        assert_eq!(
            sample_tree().to_plain_object()["conditions"][1]["conditions"][0]["operator"],
            "GreaterThan"
        );
    }

    #[test]
    fn test_projection_sorted_deduped() {
        let tree = ConditionTree::and(vec![
            ConditionTree::leaf("title", Operator::Present, JsonValue::Null),
            ConditionTree::leaf("author.name", Operator::Present, JsonValue::Null),
            ConditionTree::leaf("title", Operator::Blank, JsonValue::Null),
        ]);
        assert_eq!(tree.projection(), vec!["author.name", "title"]);
    }

    #[test]
    fn test_empty_branch_is_representable() {
        let empty_and = ConditionTree::and(vec![]);
        let empty_or = ConditionTree::or(vec![]);
        assert_ne!(empty_and, empty_or);
        assert_eq!(empty_and.projection(), Vec::<String>::new());
    }
}
