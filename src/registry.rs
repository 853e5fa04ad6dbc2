//! Static operator/type legality tables.
//!
//! Operator legality is type-driven: the tables below say which operators a
//! column type admits and which value types each operator accepts, so the
//! parser can reject nonsensical combinations (`Match` on a Number) before
//! they reach a query engine. `None` in a value-type set means "no value
//! required" (Present, Blank, Today, ...).

use crate::operators::Operator;
use crate::types::{ColumnType, PrimitiveType};

use Operator::*;
use PrimitiveType::*;

/// Operators legal on a column of the given primitive type.
pub fn allowed_operators(primitive: PrimitiveType) -> &'static [Operator] {
    match primitive {
        String => &[
            Present, Blank, Missing, Equal, NotEqual, In, NotIn, StartsWith, EndsWith,
            IStartsWith, IEndsWith, Contains, NotContains, IContains, Like, ILike, Match,
            LongerThan, ShorterThan,
        ],
        Number => &[
            Present, Blank, Missing, Equal, NotEqual, In, NotIn, GreaterThan,
            GreaterThanOrEqual, LessThan, LessThanOrEqual,
        ],
        Boolean => &[Present, Blank, Missing, Equal, NotEqual],
        Date | Dateonly => &[
            Present,
            Blank,
            Missing,
            Equal,
            NotEqual,
            Before,
            After,
            GreaterThan,
            LessThan,
            Today,
            Yesterday,
            Past,
            Future,
            PreviousWeek,
            PreviousWeekToDate,
            PreviousMonth,
            PreviousMonthToDate,
            PreviousQuarter,
            PreviousQuarterToDate,
            PreviousYear,
            PreviousYearToDate,
            PreviousXDays,
            PreviousXDaysToDate,
            BeforeXHoursAgo,
            AfterXHoursAgo,
        ],
        Timeonly => &[
            Present, Blank, Missing, Equal, NotEqual, Before, After, GreaterThan, LessThan,
        ],
        Enum => &[Present, Blank, Missing, Equal, NotEqual, In, NotIn],
        Json => &[Present, Blank, Missing, Equal, NotEqual],
        Uuid => &[Present, Blank, Missing, Equal, NotEqual, In, NotIn],
        Point => &[Present, Blank, Missing, Equal, NotEqual],
    }
}

const ANY_TYPE: &[Option<PrimitiveType>] = &[
    Some(String),
    Some(Number),
    Some(Boolean),
    Some(Date),
    Some(Dateonly),
    Some(Timeonly),
    Some(Enum),
    Some(Json),
    Some(Uuid),
    Some(Point),
    None,
];

/// Value types an operator accepts. `None` means the operator takes no value.
pub fn allowed_types(operator: Operator) -> &'static [Option<PrimitiveType>] {
    match operator {
        Equal | NotEqual | In | NotIn | IncludesAll => ANY_TYPE,
        GreaterThan | GreaterThanOrEqual | LessThan | LessThanOrEqual => &[
            Some(Number),
            Some(Date),
            Some(Dateonly),
            Some(Timeonly),
            Some(String),
            None,
        ],
        Before | After => &[Some(Date), Some(Dateonly), Some(Timeonly), None],
        Contains | NotContains | IContains | StartsWith | EndsWith | IStartsWith | IEndsWith
        | Like | ILike | Match => &[Some(String)],
        LongerThan | ShorterThan | PreviousXDays | PreviousXDaysToDate | BeforeXHoursAgo
        | AfterXHoursAgo => &[Some(Number)],
        Present | Blank | Missing | Today | Yesterday | Past | Future | PreviousWeek
        | PreviousWeekToDate | PreviousMonth | PreviousMonthToDate | PreviousQuarter
        | PreviousQuarterToDate | PreviousYear | PreviousYearToDate => &[None],
    }
}

/// Value types acceptable for a column of the given type.
///
/// Composite shapes (objects, arrays of objects) always map to `[Json, None]`.
pub fn allowed_types_for_column(column_type: &ColumnType) -> &'static [Option<PrimitiveType>] {
    match column_type {
        ColumnType::Object(_) | ColumnType::ArrayOf(_) => &[Some(Json), None],
        ColumnType::Primitive(p) => match p {
            // Number is admitted on String/Date columns because length and
            // relative-date operators (LongerThan, PreviousXDays, ...) carry
            // a numeric parameter.
            String => &[Some(String), Some(Number), None],
            Number => &[Some(Number), None],
            Boolean => &[Some(Boolean), None],
            Date | Dateonly => &[Some(Date), Some(Dateonly), Some(Number), None],
            Timeonly => &[Some(Timeonly), None],
            Enum => &[Some(Enum), Some(String), None],
            Json => &[Some(Json), Some(String), None],
            Uuid => &[Some(Uuid), None],
            Point => &[Some(Point), None],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PRIMITIVES: &[PrimitiveType] = &[
        String, Number, Boolean, Date, Dateonly, Timeonly, Enum, Json, Uuid, Point,
    ];

    #[test]
    fn test_every_allowed_operator_has_a_usable_value_type() {
        // For every column type, each of its operators must accept at least
        // one value type the column itself accepts.
        for &primitive in ALL_PRIMITIVES {
            let column_types = allowed_types_for_column(&ColumnType::Primitive(primitive));
            for &op in allowed_operators(primitive) {
                let overlap = allowed_types(op)
                    .iter()
                    .any(|t| column_types.contains(t));
                assert!(
                    overlap,
                    "{} on {} has no usable value type",
                    op, primitive
                );
            }
        }
    }

    #[test]
    fn test_match_rejected_on_number() {
        assert!(!allowed_operators(Number).contains(&Match));
        assert!(allowed_operators(String).contains(&Match));
    }

    #[test]
    fn test_valueless_operators_accept_only_none() {
        for op in [Present, Blank, Missing, Today, Yesterday, Past, Future] {
            assert_eq!(allowed_types(op), &[None]);
        }
    }

    #[test]
    fn test_composite_column_maps_to_json() {
        let composite = ColumnType::Object(Default::default());
        assert_eq!(
            allowed_types_for_column(&composite),
            &[Some(Json), None]
        );
        let array = ColumnType::ArrayOf(Box::new(ColumnType::Primitive(Number)));
        assert_eq!(allowed_types_for_column(&array), &[Some(Json), None]);
    }
}
