//! SOQL builder with escaping and identifier validation.
//!
//! ```rust
//! use sobject_browser_tooling::SoqlQuery;
//!
//! let soql = SoqlQuery::new("FieldDefinition")?
//!     .select(&["QualifiedApiName", "DataType"])
//!     .where_eq("EntityDefinition.QualifiedApiName", "Account")?
//!     .limit(10)
//!     .build()?;
//!
//! assert_eq!(
//!     soql,
//!     "SELECT QualifiedApiName, DataType FROM FieldDefinition \
//!      WHERE EntityDefinition.QualifiedApiName = 'Account' LIMIT 10"
//! );
//! # Ok::<(), sobject_browser_tooling::Error>(())
//! ```

use sobject_browser_client::security::soql;

use crate::error::{Error, ErrorKind, Result};
use crate::types::{ENTITY_DEFINITION_FIELDS, FIELD_DEFINITION_FIELDS};

/// Default `LIMIT` for the metadata queries.
pub const DEFAULT_LIMIT: u32 = 500;

/// Safe SOQL query builder.
#[derive(Debug, Clone)]
pub struct SoqlQuery {
    sobject: String,
    fields: Vec<String>,
    conditions: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u32>,
}

impl SoqlQuery {
    /// Start a query against `sobject`. The name is validated.
    pub fn new(sobject: impl AsRef<str>) -> Result<Self> {
        let sobject = sobject.as_ref();
        if !soql::is_safe_sobject_name(sobject) {
            return Err(Error::new(ErrorKind::InvalidName(sobject.to_string())));
        }

        Ok(Self {
            sobject: sobject.to_string(),
            fields: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        })
    }

    /// Select fields. Invalid names are skipped.
    pub fn select(mut self, fields: &[impl AsRef<str>]) -> Self {
        for field in fields {
            let field = field.as_ref();
            if soql::is_safe_field_path(field) {
                self.fields.push(field.to_string());
            }
        }
        self
    }

    /// `field = 'value'`, with the value escaped.
    pub fn where_eq(mut self, field: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let field = checked_field(field.as_ref())?;
        let escaped = soql::escape_string(value.as_ref());
        self.conditions.push(format!("{field} = '{escaped}'"));
        Ok(self)
    }

    /// `field = TRUE` / `field = FALSE`.
    pub fn where_bool(mut self, field: impl AsRef<str>, value: bool) -> Result<Self> {
        let field = checked_field(field.as_ref())?;
        let literal = if value { "TRUE" } else { "FALSE" };
        self.conditions.push(format!("{field} = {literal}"));
        Ok(self)
    }

    /// Append an ascending `ORDER BY` field.
    pub fn order_by(mut self, field: impl AsRef<str>) -> Result<Self> {
        let field = checked_field(field.as_ref())?;
        self.order_by.push(field.to_string());
        Ok(self)
    }

    /// Set the `LIMIT` clause.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the query.
    pub fn build(&self) -> Result<String> {
        if self.fields.is_empty() {
            return Err(Error::new(ErrorKind::NoFields));
        }

        let mut query = format!("SELECT {} FROM {}", self.fields.join(", "), self.sobject);

        if !self.conditions.is_empty() {
            query.push_str(&format!(" WHERE {}", self.conditions.join(" AND ")));
        }

        if !self.order_by.is_empty() {
            query.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        Ok(query)
    }
}

fn checked_field(field: &str) -> Result<&str> {
    if soql::is_safe_field_path(field) {
        Ok(field)
    } else {
        Err(Error::new(ErrorKind::InvalidName(field.to_string())))
    }
}

/// The layoutable-entities query.
pub fn entity_definitions_query(limit: u32) -> Result<String> {
    SoqlQuery::new("EntityDefinition")?
        .select(ENTITY_DEFINITION_FIELDS)
        .where_bool("IsLayoutable", true)?
        .order_by("QualifiedApiName")?
        .order_by("KeyPrefix")?
        .order_by("NamespacePrefix")?
        .limit(limit)
        .build()
}

/// The fields-of-one-entity query.
///
/// `entity` must be a plain API name; anything else is rejected before a
/// query string is produced.
pub fn field_definitions_query(entity: &str, limit: u32) -> Result<String> {
    if !soql::is_safe_sobject_name(entity) {
        return Err(Error::new(ErrorKind::InvalidName(entity.to_string())));
    }

    SoqlQuery::new("FieldDefinition")?
        .select(FIELD_DEFINITION_FIELDS)
        .where_eq("EntityDefinition.QualifiedApiName", entity)?
        .order_by("QualifiedApiName")?
        .limit(limit)
        .build()
}
