//! Typed DDL statements
//!
//! The parser's output: a tagged variant per recognized statement shape.
//! Every variant carries the lower-cased identifiers it touches; identifier
//! comparison throughout the engine is case-insensitive.

use crate::schema::ColumnDescriptor;
use serde::{Deserialize, Serialize};

/// A parsed column type definition, e.g. `VARCHAR(50) NOT NULL`.
///
/// Unparseable parameters (expressions, enum literals) leave the numeric
/// slots as `None`: unknown, never a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    /// The definition text as written, for display.
    pub raw: String,
    /// Upper-cased base type, e.g. "VARCHAR", "DECIMAL".
    pub base_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub nullable: bool,
}

impl TypeDef {
    /// Describe the type the way it was declared, e.g. `VARCHAR(50)` or
    /// `DECIMAL(10,2)`.
    pub fn display_type(&self) -> String {
        match (self.length, self.precision, self.scale) {
            (Some(len), _, _) => format!("{}({})", self.base_type, len),
            (None, Some(p), Some(s)) => format!("{}({},{})", self.base_type, p, s),
            (None, Some(p), None) => format!("{}({})", self.base_type, p),
            _ => self.base_type.clone(),
        }
    }

    pub fn to_column(&self, name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_lowercase(),
            data_type: self.base_type.clone(),
            length: self.length,
            precision: self.precision,
            scale: self.scale,
            nullable: self.nullable,
        }
    }
}

/// The operation carried by an `ALTER TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum AlterOp {
    AddColumn { name: String, type_def: TypeDef },
    DropColumn { name: String },
    ModifyColumn { name: String, type_def: TypeDef },
    ChangeColumn {
        old_name: String,
        new_name: String,
        type_def: TypeDef,
    },
}

/// A single schema-change operation extracted from the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DdlStatement {
    CreateTable {
        table: String,
        columns: Vec<ColumnDescriptor>,
        constraints: Vec<String>,
        if_not_exists: bool,
    },
    AlterTable {
        table: String,
        op: AlterOp,
    },
    CreateIndex {
        table: String,
        name: String,
        columns: Vec<String>,
        unique: bool,
    },
    DropTable {
        table: String,
        if_exists: bool,
    },
    DropIndex {
        table: String,
        name: String,
    },
    /// Anything the extractor does not recognize as DDL (SELECT, USE, SHOW,
    /// DML, ...). Passes through validation with zero issues.
    Unknown {
        keyword: String,
    },
}

impl DdlStatement {
    pub fn kind(&self) -> DdlKind {
        match self {
            DdlStatement::CreateTable { .. } => DdlKind::CreateTable,
            DdlStatement::AlterTable { .. } => DdlKind::AlterTable,
            DdlStatement::CreateIndex { .. } => DdlKind::CreateIndex,
            DdlStatement::DropTable { .. } => DdlKind::DropTable,
            DdlStatement::DropIndex { .. } => DdlKind::DropIndex,
            DdlStatement::Unknown { .. } => DdlKind::Unknown,
        }
    }

    /// Whether the statement takes part in structural validation.
    pub fn is_structural(&self) -> bool {
        !matches!(self, DdlStatement::Unknown { .. })
    }
}

/// Statement classification, used for verdicts and report headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlKind {
    CreateTable,
    AlterTable,
    CreateIndex,
    DropTable,
    DropIndex,
    Unknown,
}

impl DdlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DdlKind::CreateTable => "CREATE_TABLE",
            DdlKind::AlterTable => "ALTER_TABLE",
            DdlKind::CreateIndex => "CREATE_INDEX",
            DdlKind::DropTable => "DROP_TABLE",
            DdlKind::DropIndex => "DROP_INDEX",
            DdlKind::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for DdlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
