//! Live schema snapshot provider
//!
//! Fetches the schema actually present in the target database at the start
//! of a validation run. The snapshot is taken once per script and treated as
//! immutable for that run; the engine layers the script's own effects on top
//! of it.

use crate::error::AppError;
use crate::schema::{ColumnDescriptor, IndexDescriptor, SchemaState, TableDescriptor};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// A captured live schema plus capture metadata for reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub captured_at: DateTime<Utc>,
    pub table_count: usize,
    pub checksum: String,
    pub schema: SchemaState,
}

impl LiveSnapshot {
    /// Content hash over table/column/index shapes, in sorted order so the
    /// same schema always hashes the same.
    pub fn compute_checksum(schema: &SchemaState) -> String {
        let mut hasher = Sha256::new();

        let mut table_names: Vec<&String> = schema.tables.keys().collect();
        table_names.sort();

        for name in table_names {
            let table = &schema.tables[name];
            hasher.update(name.as_bytes());
            for col in &table.columns {
                hasher.update(
                    format!(
                        "{}.{}:{}:{:?}:{:?}:{:?}:{}",
                        name, col.name, col.data_type, col.length, col.precision, col.scale,
                        col.nullable
                    )
                    .as_bytes(),
                );
            }
            for idx in &table.indexes {
                hasher.update(
                    format!("{}.{}:{}:{}", name, idx.name, idx.columns.join(","), idx.is_unique)
                        .as_bytes(),
                );
            }
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Schema introspector for PostgreSQL targets.
pub struct PostgresIntrospector;

impl PostgresIntrospector {
    /// Fetch the complete live schema for the user-visible namespaces.
    pub async fn introspect(pool: &Pool) -> Result<LiveSnapshot, AppError> {
        let client = pool.get().await?;

        let mut schema = SchemaState::new();

        // Tables and columns, with the length/precision/scale slots the
        // type-change check reads.
        let column_query = r#"
            SELECT
                c.table_name,
                c.column_name,
                c.data_type,
                c.character_maximum_length,
                c.numeric_precision,
                c.numeric_scale,
                c.is_nullable
            FROM information_schema.columns c
            JOIN information_schema.tables t
                ON t.table_schema = c.table_schema
                AND t.table_name = c.table_name
            WHERE c.table_schema NOT IN ('pg_catalog', 'information_schema')
              AND t.table_type = 'BASE TABLE'
            ORDER BY c.table_name, c.ordinal_position
        "#;

        let rows = client.query(column_query, &[]).await?;
        for row in rows {
            let table_name: String = row.get("table_name");
            let table_name = table_name.to_lowercase();

            if !schema.has_table(&table_name) {
                schema.insert_table(TableDescriptor::new(table_name.clone()));
            }

            let column_name: String = row.get("column_name");
            let data_type: String = row.get("data_type");
            let length: Option<i32> = row.get("character_maximum_length");
            let precision: Option<i32> = row.get("numeric_precision");
            let scale: Option<i32> = row.get("numeric_scale");
            let is_nullable: String = row.get("is_nullable");

            // Text types carry a length; only decimal-like types keep
            // precision/scale, so plain integers do not trip the decimal
            // reduction check.
            let data_type = normalize_type(&data_type);
            let decimal_like = matches!(data_type.as_str(), "DECIMAL" | "NUMERIC");

            if let Some(table) = schema.table_mut(&table_name) {
                table.add_column(ColumnDescriptor {
                    name: column_name.to_lowercase(),
                    data_type,
                    length: length.and_then(|v| u32::try_from(v).ok()),
                    precision: if decimal_like {
                        precision.and_then(|v| u32::try_from(v).ok())
                    } else {
                        None
                    },
                    scale: if decimal_like {
                        scale.and_then(|v| u32::try_from(v).ok())
                    } else {
                        None
                    },
                    nullable: is_nullable == "YES",
                });
            }
        }

        // Indexes with column order and uniqueness.
        let index_query = r#"
            SELECT
                t.relname as table_name,
                i.relname as index_name,
                COALESCE(array_agg(a.attname::text ORDER BY array_position(ix.indkey, a.attnum)), ARRAY[]::text[]) as columns,
                ix.indisunique as is_unique
            FROM pg_class t
            JOIN pg_index ix ON t.oid = ix.indrelid
            JOIN pg_class i ON i.oid = ix.indexrelid
            JOIN pg_namespace n ON n.oid = t.relnamespace
            JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
            WHERE n.nspname NOT IN ('pg_catalog', 'information_schema')
              AND t.relkind = 'r'
            GROUP BY t.relname, i.relname, ix.indisunique
            ORDER BY t.relname, i.relname
        "#;

        let rows = client.query(index_query, &[]).await?;
        for row in rows {
            let table_name: String = row.get("table_name");
            let index_name: String = row.get("index_name");
            let columns: Vec<String> = row.try_get("columns").unwrap_or_default();
            let is_unique: bool = row.get("is_unique");

            if let Some(table) = schema.table_mut(&table_name) {
                table.add_index(IndexDescriptor {
                    name: index_name.to_lowercase(),
                    columns: columns.into_iter().map(|c| c.to_lowercase()).collect(),
                    is_unique,
                });
            }
        }

        let checksum = LiveSnapshot::compute_checksum(&schema);
        let snapshot = LiveSnapshot {
            captured_at: Utc::now(),
            table_count: schema.table_count(),
            checksum,
            schema,
        };

        debug!(
            tables = snapshot.table_count,
            checksum = %snapshot.checksum,
            "live schema captured"
        );

        Ok(snapshot)
    }
}

/// Map information_schema type names onto the upper-cased base types the
/// engine compares against.
fn normalize_type(data_type: &str) -> String {
    match data_type.to_lowercase().as_str() {
        "character varying" => "VARCHAR".to_string(),
        "character" => "CHAR".to_string(),
        "timestamp without time zone" | "timestamp with time zone" => "TIMESTAMP".to_string(),
        "time without time zone" | "time with time zone" => "TIME".to_string(),
        "double precision" => "DOUBLE".to_string(),
        other => other.to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> SchemaState {
        let mut table = TableDescriptor::new("users");
        table.add_column(ColumnDescriptor {
            name: "id".to_string(),
            data_type: "INT".to_string(),
            length: None,
            precision: None,
            scale: None,
            nullable: false,
        });
        let mut state = SchemaState::new();
        state.insert_table(table);
        state
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let schema = users_schema();
        assert_eq!(
            LiveSnapshot::compute_checksum(&schema),
            LiveSnapshot::compute_checksum(&schema)
        );
    }

    #[test]
    fn test_checksum_changes_with_content() {
        let a = users_schema();
        let mut b = users_schema();
        b.table_mut("users").unwrap().add_column(ColumnDescriptor {
            name: "email".to_string(),
            data_type: "VARCHAR".to_string(),
            length: Some(100),
            precision: None,
            scale: None,
            nullable: true,
        });
        assert_ne!(
            LiveSnapshot::compute_checksum(&a),
            LiveSnapshot::compute_checksum(&b)
        );
    }

    #[test]
    fn test_normalize_type_maps_verbose_names() {
        assert_eq!(normalize_type("character varying"), "VARCHAR");
        assert_eq!(normalize_type("timestamp without time zone"), "TIMESTAMP");
        assert_eq!(normalize_type("numeric"), "NUMERIC");
        assert_eq!(normalize_type("integer"), "INTEGER");
    }
}
