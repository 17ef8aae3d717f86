//! Dialect-neutral schema model: tables and their attributes (columns).
//!
//! Tables are built once per migration step, validated on construction and
//! immutable afterwards. Attributes carry a logical [`TableAttributeType`];
//! the concrete backend type token is decided by a dialect.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::identifier::validate_identifier;
use crate::error::{MigrateError, Result};

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAttributeType {
    Char,
    Varchar,
    Boolean,
    Short,
    Int,
    Long,
    Decimal,
    Date,
    Timestamp,
    /// Locale identifier stored as text.
    Locale,
    Binary,
}

impl TableAttributeType {
    /// Integral types are eligible for identity/auto-increment keys.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TableAttributeType::Short | TableAttributeType::Int | TableAttributeType::Long
        )
    }

    /// Whether a length applies to this type.
    pub fn takes_length(&self) -> bool {
        matches!(self, TableAttributeType::Char | TableAttributeType::Varchar)
    }
}

/// Reference from an attribute to a column of another table.
///
/// Resolved lazily: the referenced table only has to exist in the database
/// when the statement runs, not in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Referenced table name.
    pub table: String,

    /// Referenced attribute name.
    #[serde(default = "default_fk_attribute")]
    pub attribute: String,
}

fn default_fk_attribute() -> String {
    "pk".to_string()
}

impl ForeignKeyRef {
    pub fn new(table: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            attribute: attribute.into(),
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAttribute {
    name: String,

    #[serde(rename = "type")]
    attr_type: TableAttributeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<u32>,

    #[serde(default = "default_true")]
    nullable: bool,

    #[serde(default)]
    primary_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    foreign_key: Option<ForeignKeyRef>,
}

fn default_true() -> bool {
    true
}

impl TableAttribute {
    /// Create a nullable attribute of the given type.
    pub fn new(name: impl Into<String>, attr_type: TableAttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Create a VARCHAR/CHAR attribute with an explicit length.
    pub fn with_length(name: impl Into<String>, attr_type: TableAttributeType, length: u32) -> Self {
        Self::new(name, attr_type).length(length)
    }

    /// Create a DECIMAL attribute with explicit precision and scale.
    pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> Self {
        let mut attr = Self::new(name, TableAttributeType::Decimal);
        attr.precision = Some(precision);
        attr.scale = Some(scale);
        attr
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn not_null(self) -> Self {
        self.nullable(false)
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef::new(table, attribute));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr_type(&self) -> TableAttributeType {
        self.attr_type
    }

    pub fn declared_length(&self) -> Option<u32> {
        self.length
    }

    /// Explicit (precision, scale), if both were given.
    pub fn precision_scale(&self) -> Option<(u32, u32)> {
        match (self.precision, self.scale) {
            (Some(p), Some(s)) => Some((p, s)),
            _ => None,
        }
    }

    /// Effective nullability. Primary keys are never nullable.
    pub fn is_nullable(&self) -> bool {
        self.nullable && !self.primary_key
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn foreign_key(&self) -> Option<&ForeignKeyRef> {
        self.foreign_key.as_ref()
    }

    /// Check the attribute's own invariants.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.name)?;

        if let Some(length) = self.length {
            if !self.attr_type.takes_length() {
                return Err(MigrateError::InvalidSchema(format!(
                    "Attribute {}: length only applies to CHAR/VARCHAR",
                    self.name
                )));
            }
            if length == 0 {
                return Err(MigrateError::InvalidSchema(format!(
                    "Attribute {}: length must be at least 1",
                    self.name
                )));
            }
        }

        match (self.precision, self.scale) {
            (None, None) => {}
            (Some(p), Some(s)) => {
                if self.attr_type != TableAttributeType::Decimal {
                    return Err(MigrateError::InvalidSchema(format!(
                        "Attribute {}: precision/scale only apply to DECIMAL",
                        self.name
                    )));
                }
                if p == 0 || s > p {
                    return Err(MigrateError::InvalidSchema(format!(
                        "Attribute {}: invalid DECIMAL({}, {})",
                        self.name, p, s
                    )));
                }
            }
            _ => {
                return Err(MigrateError::InvalidSchema(format!(
                    "Attribute {}: precision and scale must be given together",
                    self.name
                )));
            }
        }

        if let Some(fk) = &self.foreign_key {
            validate_identifier(&fk.table)?;
            validate_identifier(&fk.attribute)?;
        }

        Ok(())
    }
}

/// Table definition.
///
/// Construct through [`Table::builder`]; a built table is validated and
/// cannot be modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDef", into = "TableDef")]
pub struct Table {
    name: String,
    attributes: Vec<TableAttribute>,
    composite_key: bool,
}

/// Serialized form of a table, validated into [`Table`] on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableDef {
    name: String,
    attributes: Vec<TableAttribute>,
    #[serde(default)]
    composite_key: bool,
}

impl TryFrom<TableDef> for Table {
    type Error = MigrateError;

    fn try_from(def: TableDef) -> Result<Self> {
        let mut builder = Table::builder(def.name);
        if def.composite_key {
            builder = builder.composite_key();
        }
        builder.attributes(def.attributes).build()
    }
}

impl From<Table> for TableDef {
    fn from(table: Table) -> Self {
        TableDef {
            name: table.name,
            attributes: table.attributes,
            composite_key: table.composite_key,
        }
    }
}

impl Table {
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            attributes: Vec::new(),
            composite_key: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[TableAttribute] {
        &self.attributes
    }

    pub fn is_composite_key(&self) -> bool {
        self.composite_key
    }

    /// Primary-key attributes in declaration order.
    pub fn primary_key(&self) -> Vec<&TableAttribute> {
        self.attributes.iter().filter(|a| a.is_primary_key()).collect()
    }

    /// Attributes carrying a foreign-key reference, in declaration order.
    pub fn foreign_keys(&self) -> Vec<&TableAttribute> {
        self.attributes
            .iter()
            .filter(|a| a.foreign_key().is_some())
            .collect()
    }
}

/// Builder for [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    attributes: Vec<TableAttribute>,
    composite_key: bool,
}

impl TableBuilder {
    pub fn attribute(mut self, attribute: TableAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = TableAttribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Allow more than one primary-key attribute.
    pub fn composite_key(mut self) -> Self {
        self.composite_key = true;
        self
    }

    /// Validate and freeze the table.
    pub fn build(self) -> Result<Table> {
        validate_identifier(&self.name)?;

        if self.attributes.is_empty() {
            return Err(MigrateError::InvalidSchema(format!(
                "Table {} has no attributes",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for attr in &self.attributes {
            attr.validate()?;
            if !seen.insert(attr.name().to_ascii_lowercase()) {
                return Err(MigrateError::InvalidSchema(format!(
                    "Table {} declares attribute {} more than once",
                    self.name,
                    attr.name()
                )));
            }
        }

        let pk_count = self.attributes.iter().filter(|a| a.is_primary_key()).count();
        if pk_count > 1 && !self.composite_key {
            return Err(MigrateError::InvalidSchema(format!(
                "Table {} marks {} attributes as primary key; request a composite key explicitly",
                self.name, pk_count
            )));
        }

        Ok(Table {
            name: self.name,
            attributes: self.attributes,
            composite_key: self.composite_key,
        })
    }
}
