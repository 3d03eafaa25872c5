//! Records returned by the Tooling API metadata queries.

use serde::{Deserialize, Serialize};

/// Fields selected from `EntityDefinition`.
pub const ENTITY_DEFINITION_FIELDS: &[&str] = &[
    "Id",
    "KeyPrefix",
    "Description",
    "DeveloperName",
    "QualifiedApiName",
    "IsCustomizable",
    "DurableId",
    "EditDefinitionUrl",
    "EditUrl",
    "NewUrl",
    "DetailUrl",
    "MasterLabel",
    "NamespacePrefix",
    "PluralLabel",
];

/// Fields selected from `FieldDefinition`.
pub const FIELD_DEFINITION_FIELDS: &[&str] = &[
    "Id",
    "DurableId",
    "QualifiedApiName",
    "DeveloperName",
    "Label",
    "DataType",
    "Length",
    "Precision",
    "Scale",
    "Digits",
    "IsNillable",
    "IsIndexed",
    "IsCalculated",
    "NamespacePrefix",
    "Description",
];

// ============================================================================
// EntityDefinition
// ============================================================================

/// One SObject as described by the Tooling `EntityDefinition` object.
///
/// Any attribute may come back null, so everything except the identity is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntityDefinition {
    #[serde(rename = "Id", default)]
    pub id: String,

    #[serde(rename = "QualifiedApiName", default)]
    pub qualified_api_name: String,

    #[serde(rename = "KeyPrefix")]
    pub key_prefix: Option<String>,

    #[serde(rename = "DeveloperName")]
    pub developer_name: Option<String>,

    #[serde(rename = "MasterLabel")]
    pub master_label: Option<String>,

    #[serde(rename = "PluralLabel")]
    pub plural_label: Option<String>,

    #[serde(rename = "NamespacePrefix")]
    pub namespace_prefix: Option<String>,

    #[serde(rename = "DurableId")]
    pub durable_id: Option<String>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "IsCustomizable")]
    pub is_customizable: Option<bool>,

    #[serde(rename = "EditDefinitionUrl")]
    pub edit_definition_url: Option<String>,

    #[serde(rename = "EditUrl")]
    pub edit_url: Option<String>,

    #[serde(rename = "NewUrl")]
    pub new_url: Option<String>,

    #[serde(rename = "DetailUrl")]
    pub detail_url: Option<String>,
}

impl EntityDefinition {
    /// Stable list id: `DurableId`, or the API name when that is null.
    pub fn list_id(&self) -> &str {
        self.durable_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.qualified_api_name)
    }
}

// ============================================================================
// FieldDefinition
// ============================================================================

/// One field of an SObject as described by the Tooling `FieldDefinition` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldDefinition {
    #[serde(rename = "Id", default)]
    pub id: String,

    #[serde(rename = "DurableId")]
    pub durable_id: Option<String>,

    #[serde(rename = "QualifiedApiName", default)]
    pub qualified_api_name: String,

    #[serde(rename = "DeveloperName")]
    pub developer_name: Option<String>,

    #[serde(rename = "Label")]
    pub label: Option<String>,

    #[serde(rename = "DataType")]
    pub data_type: Option<String>,

    #[serde(rename = "Length")]
    pub length: Option<i64>,

    #[serde(rename = "Precision")]
    pub precision: Option<i64>,

    #[serde(rename = "Scale")]
    pub scale: Option<i64>,

    #[serde(rename = "Digits")]
    pub digits: Option<i64>,

    #[serde(rename = "IsNillable")]
    pub is_nillable: Option<bool>,

    #[serde(rename = "IsIndexed")]
    pub is_indexed: Option<bool>,

    #[serde(rename = "IsCalculated")]
    pub is_calculated: Option<bool>,

    #[serde(rename = "NamespacePrefix")]
    pub namespace_prefix: Option<String>,

    #[serde(rename = "Description")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_definition_from_tooling_record() {
        let json = serde_json::json!({
            "attributes": {
                "type": "EntityDefinition",
                "url": "/services/data/v62.0/tooling/sobjects/EntityDefinition/Account"
            },
            "Id": "000000000000000AAA",
            "KeyPrefix": "001",
            "Description": null,
            "DeveloperName": "Account",
            "QualifiedApiName": "Account",
            "IsCustomizable": true,
            "DurableId": "Account",
            "EditDefinitionUrl": null,
            "EditUrl": null,
            "NewUrl": "/001/e",
            "DetailUrl": null,
            "MasterLabel": "Account",
            "NamespacePrefix": null,
            "PluralLabel": "Accounts"
        });

        let entity: EntityDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(entity.qualified_api_name, "Account");
        assert_eq!(entity.key_prefix.as_deref(), Some("001"));
        assert_eq!(entity.new_url.as_deref(), Some("/001/e"));
        assert_eq!(entity.is_customizable, Some(true));
        assert!(entity.description.is_none());
        assert_eq!(entity.list_id(), "Account");
    }

    #[test]
    fn test_list_id_falls_back_to_api_name() {
        let entity = EntityDefinition {
            qualified_api_name: "Widget__c".to_string(),
            durable_id: None,
            ..Default::default()
        };
        assert_eq!(entity.list_id(), "Widget__c");
    }

    #[test]
    fn test_field_definition_from_tooling_record() {
        let json = serde_json::json!({
            "attributes": {"type": "FieldDefinition"},
            "Id": "000000000000000AAA",
            "DurableId": "Account.Name",
            "QualifiedApiName": "Name",
            "DeveloperName": "Name",
            "Label": "Account Name",
            "DataType": "Name",
            "Length": 255,
            "Precision": 0,
            "Scale": 0,
            "Digits": 0,
            "IsNillable": false,
            "IsIndexed": true,
            "IsCalculated": false,
            "NamespacePrefix": null,
            "Description": null
        });

        let field: FieldDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(field.qualified_api_name, "Name");
        assert_eq!(field.label.as_deref(), Some("Account Name"));
        assert_eq!(field.length, Some(255));
        assert_eq!(field.is_indexed, Some(true));
    }

    #[test]
    fn test_serialized_names_match_api_names() {
        let entity = EntityDefinition {
            qualified_api_name: "Contact".to_string(),
            key_prefix: Some("003".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["QualifiedApiName"], "Contact");
        assert_eq!(value["KeyPrefix"], "003");
    }
}
