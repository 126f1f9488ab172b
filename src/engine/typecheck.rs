//! Column type-change compatibility
//!
//! Deterministic, no I/O. Flags cross-family downgrades, string length
//! reduction and decimal precision/scale reduction. Unknown lengths and
//! precisions are treated as unknown, never as a violation.

use crate::ddl::TypeDef;
use crate::schema::ColumnDescriptor;
use once_cell::sync::Lazy;
use std::collections::HashSet;

static STRING_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["VARCHAR", "CHAR", "TEXT", "TINYTEXT", "MEDIUMTEXT", "LONGTEXT"]
        .into_iter()
        .collect()
});

static NUMERIC_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "INT", "INTEGER", "BIGINT", "SMALLINT", "TINYINT", "MEDIUMINT", "DECIMAL", "NUMERIC",
        "FLOAT", "DOUBLE", "REAL",
    ]
    .into_iter()
    .collect()
});

static DATETIME_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["DATE", "DATETIME", "TIMESTAMP", "TIME", "YEAR"]
        .into_iter()
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    Text,
    Numeric,
    DateTime,
    Other,
}

fn family_of(base_type: &str) -> TypeFamily {
    let upper = base_type.to_uppercase();
    if STRING_TYPES.contains(upper.as_str()) {
        TypeFamily::Text
    } else if NUMERIC_TYPES.contains(upper.as_str()) {
        TypeFamily::Numeric
    } else if DATETIME_TYPES.contains(upper.as_str()) {
        TypeFamily::DateTime
    } else {
        TypeFamily::Other
    }
}

fn is_decimal_like(base_type: &str) -> bool {
    matches!(base_type.to_uppercase().as_str(), "DECIMAL" | "NUMERIC")
}

fn has_known_length(base_type: &str) -> bool {
    matches!(base_type.to_uppercase().as_str(), "VARCHAR" | "CHAR")
}

/// Check whether changing `existing` to `new_def` risks data loss. Each
/// flagged condition yields one message citing the before/after values.
pub fn check_type_change(existing: &ColumnDescriptor, new_def: &TypeDef) -> Vec<String> {
    let mut issues = Vec::new();

    let from_family = family_of(&existing.data_type);
    let to_family = family_of(&new_def.base_type);

    // Cross-family downgrades.
    let incompatible = matches!(
        (from_family, to_family),
        (TypeFamily::Text, TypeFamily::Numeric)
            | (TypeFamily::Numeric, TypeFamily::Text)
            | (TypeFamily::DateTime, TypeFamily::Numeric)
            | (TypeFamily::DateTime, TypeFamily::Text)
    );
    if incompatible {
        issues.push(format!(
            "Changing type from {} to {} may cause data loss.",
            existing.data_type,
            new_def.display_type()
        ));
    }

    // Length reduction, only when both sides are known.
    if has_known_length(&existing.data_type) && has_known_length(&new_def.base_type) {
        if let (Some(old_len), Some(new_len)) = (existing.length, new_def.length) {
            if new_len < old_len {
                issues.push(format!(
                    "Reducing column length from {} to {} may truncate existing data.",
                    old_len, new_len
                ));
            }
        }
    }

    // Precision/scale reduction for decimal-like types, same known-both rule.
    if is_decimal_like(&existing.data_type) && is_decimal_like(&new_def.base_type) {
        let precision_reduced = matches!(
            (existing.precision, new_def.precision),
            (Some(old), Some(new)) if new < old
        );
        let scale_reduced = matches!(
            (existing.scale, new_def.scale),
            (Some(old), Some(new)) if new < old
        );
        if precision_reduced || scale_reduced {
            issues.push(format!(
                "Reducing decimal precision from ({},{}) to ({},{}) may cause data loss.",
                display_opt(existing.precision),
                display_opt(existing.scale),
                display_opt(new_def.precision),
                display_opt(new_def.scale),
            ));
        }
    }

    issues
}

fn display_opt(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(data_type: &str, length: Option<u32>) -> ColumnDescriptor {
        ColumnDescriptor {
            name: "c".to_string(),
            data_type: data_type.to_string(),
            length,
            precision: None,
            scale: None,
            nullable: true,
        }
    }

    fn type_def(base: &str, length: Option<u32>) -> TypeDef {
        TypeDef {
            raw: base.to_string(),
            base_type: base.to_string(),
            length,
            precision: None,
            scale: None,
            nullable: true,
        }
    }

    #[test]
    fn test_string_to_numeric_is_flagged() {
        let issues = check_type_change(&column("VARCHAR", Some(50)), &type_def("INT", None));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("VARCHAR"));
        assert!(issues[0].contains("INT"));
    }

    #[test]
    fn test_datetime_to_string_is_flagged() {
        let issues = check_type_change(&column("DATETIME", None), &type_def("VARCHAR", Some(30)));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_widening_within_family_is_clean() {
        let issues = check_type_change(&column("INT", None), &type_def("BIGINT", None));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_length_reduction_is_flagged() {
        let issues = check_type_change(&column("VARCHAR", Some(100)), &type_def("VARCHAR", Some(10)));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("100"));
        assert!(issues[0].contains("10"));
    }

    #[test]
    fn test_unknown_length_never_flags() {
        // TEXT has no declared length on either side.
        let issues = check_type_change(&column("TEXT", None), &type_def("TEXT", None));
        assert!(issues.is_empty());

        // Known old, unknown new: still unknown, still clean.
        let issues = check_type_change(&column("VARCHAR", Some(50)), &type_def("VARCHAR", None));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_decimal_precision_reduction_is_flagged() {
        let existing = ColumnDescriptor {
            precision: Some(10),
            scale: Some(4),
            ..column("DECIMAL", None)
        };
        let new_def = TypeDef {
            precision: Some(8),
            scale: Some(2),
            ..type_def("DECIMAL", None)
        };
        let issues = check_type_change(&existing, &new_def);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("(10,4)"));
        assert!(issues[0].contains("(8,2)"));
    }

    #[test]
    fn test_decimal_widening_is_clean() {
        let existing = ColumnDescriptor {
            precision: Some(8),
            scale: Some(2),
            ..column("DECIMAL", None)
        };
        let new_def = TypeDef {
            precision: Some(12),
            scale: Some(4),
            ..type_def("DECIMAL", None)
        };
        assert!(check_type_change(&existing, &new_def).is_empty());
    }
}
