//! Live table introspection from `information_schema`. Nothing is cached: every
//! call re-reads the catalog so a table can change shape under a running server.

use crate::error::AppError;
use serde::Serialize;
use sqlx::PgConnection;

/// One physical column as reported by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Lowercased name used for case-insensitive matching.
    #[serde(skip)]
    pub key: String,
    /// Type name usable in a placeholder cast (e.g. `int4`, `timestamptz`).
    pub sql_type: Option<String>,
    pub nullable: bool,
    pub has_default: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = name.to_lowercase();
        ColumnDescriptor {
            name,
            key,
            sql_type: None,
            nullable: true,
            has_default: false,
        }
    }

    pub fn with_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.key == name.to_lowercase()
    }

    pub fn cast_type(&self) -> Option<&str> {
        self.sql_type.as_deref()
    }

    /// Type name as result rows report it: `int4` is `INT4`, `_int4` is `INT4[]`.
    pub fn row_type_name(&self) -> Option<String> {
        let t = self.sql_type.as_deref()?;
        Some(match t.strip_prefix('_') {
            Some(element) => format!("{}[]", element.to_ascii_uppercase()),
            None => t.to_ascii_uppercase(),
        })
    }
}

/// Columns of one table in catalog order.
#[derive(Clone, Debug)]
pub struct TableSchema {
    table: String,
    /// Schema (namespace) the table was found in, when known.
    namespace: Option<String>,
    columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let table = table.into();
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|prev| prev.name == c.name) {
                tracing::warn!(table = %table, column = %c.name, "duplicate column name in catalog; unsupported, kept as distinct entries");
            }
        }
        TableSchema {
            table,
            namespace: None,
            columns,
        }
    }

    pub fn in_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Convenience for schemas built from bare names.
    pub fn from_names(table: impl Into<String>, names: &[&str]) -> Self {
        Self::new(table, names.iter().map(|n| ColumnDescriptor::new(*n)).collect())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First column matching `name` case-insensitively.
    pub fn find(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.matches(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Empty schema means the table is absent; no operation may proceed.
    pub fn require_columns(self) -> Result<Self, AppError> {
        if self.columns.is_empty() {
            return Err(AppError::SchemaMissing { table: self.table });
        }
        Ok(self)
    }
}

const COLUMNS_SQL: &str = r#"
SELECT
    table_schema::text,
    column_name::text,
    CASE WHEN data_type = 'USER-DEFINED'
         THEN quote_ident(udt_schema::text) || '.' || quote_ident(udt_name::text)
         ELSE udt_name::text
    END,
    is_nullable = 'YES',
    (column_default IS NOT NULL OR is_identity = 'YES')
FROM information_schema.columns
WHERE table_name = $1
ORDER BY array_position(current_schemas(false), table_schema::name) NULLS LAST,
         table_schema,
         ordinal_position
"#;

/// List the live columns of `table`. No schema filter: the first visible schema
/// that has the table wins. A missing table yields an empty schema, not an error.
pub async fn discover_columns(conn: &mut PgConnection, table: &str) -> Result<TableSchema, AppError> {
    tracing::debug!(table = %table, "discover columns");
    let rows = sqlx::query_as::<_, (String, String, String, bool, bool)>(COLUMNS_SQL)
        .bind(table)
        .fetch_all(&mut *conn)
        .await?;

    let first_schema = rows.first().map(|r| r.0.clone());
    let columns = rows
        .into_iter()
        .filter(|r| Some(&r.0) == first_schema.as_ref())
        .map(|(_, name, sql_type, nullable, has_default)| ColumnDescriptor {
            nullable,
            has_default,
            ..ColumnDescriptor::new(name).with_type(sql_type)
        })
        .collect();
    Ok(TableSchema::new(table, columns).in_namespace(first_schema))
}
