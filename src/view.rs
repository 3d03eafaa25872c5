//! List rows, detail panes and actions for entities and fields.
//!
//! The view types are plain data; `Display` renders them for a terminal.

use std::fmt;

use serde::Serialize;
use sobject_browser_tooling::{setup_url, EntityDefinition, FieldDefinition, SetupSubpath};

/// Shown for a missing or empty value.
pub const EMPTY_VALUE: &str = "–";

fn or_empty(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(EMPTY_VALUE)
}

// ============================================================================
// List
// ============================================================================

/// One row of the entity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub accessory: Option<String>,
    pub keywords: Vec<String>,
}

impl ListRow {
    /// Case-insensitive substring match against the title and keywords.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        std::iter::once(&self.title)
            .chain(&self.keywords)
            .any(|k| k.to_lowercase().contains(&query))
    }
}

/// Values an entity can be searched by.
pub fn entity_keywords(entity: &EntityDefinition) -> Vec<String> {
    [
        entity.key_prefix.as_deref(),
        Some(entity.qualified_api_name.as_str()),
        entity.durable_id.as_deref(),
        entity.developer_name.as_deref(),
        entity.master_label.as_deref(),
        entity.plural_label.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|k| !k.is_empty())
    .map(str::to_string)
    .collect()
}

pub fn entity_row(entity: &EntityDefinition) -> ListRow {
    ListRow {
        id: entity.list_id().to_string(),
        title: entity.qualified_api_name.clone(),
        subtitle: None,
        accessory: entity.key_prefix.clone(),
        keywords: entity_keywords(entity),
    }
}

/// Entities whose row matches `query`, in input order.
pub fn search_entities<'a>(
    entities: &'a [EntityDefinition],
    query: &str,
) -> Vec<&'a EntityDefinition> {
    entities
        .iter()
        .filter(|e| entity_row(e).matches(query))
        .collect()
}

pub fn field_row(field: &FieldDefinition) -> ListRow {
    let keywords = [
        Some(field.qualified_api_name.as_str()),
        field.label.as_deref(),
        field.developer_name.as_deref(),
        field.data_type.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|k| !k.is_empty())
    .map(str::to_string)
    .collect();

    ListRow {
        id: field
            .durable_id
            .clone()
            .unwrap_or_else(|| field.qualified_api_name.clone()),
        title: field.qualified_api_name.clone(),
        subtitle: field.label.clone(),
        accessory: field.data_type.clone(),
        keywords,
    }
}

/// Rows as aligned columns: title, accessory, subtitle.
pub fn render_rows(rows: &[ListRow]) -> String {
    let title_width = rows.iter().map(|r| r.title.chars().count()).max().unwrap_or(0);
    let accessory_width = rows
        .iter()
        .map(|r| r.accessory.as_deref().unwrap_or("").chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in rows {
        let line = format!(
            "{:<tw$}  {:<aw$}  {}",
            row.title,
            row.accessory.as_deref().unwrap_or(""),
            row.subtitle.as_deref().unwrap_or(""),
            tw = title_width,
            aw = accessory_width,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

// ============================================================================
// Detail
// ============================================================================

/// One entry in a detail pane's metadata list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MetadataItem {
    Link { title: String, text: String, target: String },
    Label { title: String, text: String },
    Separator,
}

impl MetadataItem {
    fn label(title: &str, value: Option<&str>) -> Self {
        MetadataItem::Label {
            title: title.to_string(),
            text: or_empty(value).to_string(),
        }
    }
}

/// Markdown body plus a metadata list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub markdown: String,
    pub metadata: Vec<MetadataItem>,
}

pub fn entity_detail(entity: &EntityDefinition, base_url: &str) -> Detail {
    let name = entity.qualified_api_name.as_str();
    let e = entity;

    Detail {
        markdown: e.description.clone().unwrap_or_default(),
        metadata: vec![
            MetadataItem::Link {
                title: format!("{name} Setup"),
                text: "Go to Setup".to_string(),
                target: setup_url(base_url, name, None),
            },
            MetadataItem::Separator,
            MetadataItem::label("KeyPrefix", e.key_prefix.as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("QualifiedApiName", Some(name)),
            MetadataItem::label("MasterLabel", e.master_label.as_deref()),
            MetadataItem::label("PluralLabel", e.plural_label.as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("Description", e.description.as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("NamespacePrefix", e.namespace_prefix.as_deref()),
            MetadataItem::label("DeveloperName", e.developer_name.as_deref()),
            MetadataItem::label("DurableId", e.durable_id.as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("DetailUrl", e.detail_url.as_deref()),
            MetadataItem::label("EditUrl", e.edit_url.as_deref()),
            MetadataItem::label("NewUrl", e.new_url.as_deref()),
        ],
    }
}

pub fn field_detail(field: &FieldDefinition) -> Detail {
    let number = |n: Option<i64>| n.map(|n| n.to_string());
    let flag = |b: Option<bool>| b.map(|b| if b { "Yes" } else { "No" }.to_string());
    let f = field;

    Detail {
        markdown: f.description.clone().unwrap_or_default(),
        metadata: vec![
            MetadataItem::label("QualifiedApiName", Some(f.qualified_api_name.as_str())),
            MetadataItem::label("Label", f.label.as_deref()),
            MetadataItem::label("DataType", f.data_type.as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("Length", number(f.length).as_deref()),
            MetadataItem::label("Precision", number(f.precision).as_deref()),
            MetadataItem::label("Scale", number(f.scale).as_deref()),
            MetadataItem::label("Digits", number(f.digits).as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("IsNillable", flag(f.is_nillable).as_deref()),
            MetadataItem::label("IsIndexed", flag(f.is_indexed).as_deref()),
            MetadataItem::label("IsCalculated", flag(f.is_calculated).as_deref()),
            MetadataItem::Separator,
            MetadataItem::label("NamespacePrefix", f.namespace_prefix.as_deref()),
            MetadataItem::label("DeveloperName", f.developer_name.as_deref()),
            MetadataItem::label("DurableId", f.durable_id.as_deref()),
        ],
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .metadata
            .iter()
            .filter_map(|item| match item {
                MetadataItem::Link { title, .. } | MetadataItem::Label { title, .. } => {
                    Some(title.chars().count())
                }
                MetadataItem::Separator => None,
            })
            .max()
            .unwrap_or(0);

        if !self.markdown.trim().is_empty() {
            writeln!(f, "{}", self.markdown.trim())?;
            writeln!(f)?;
        }

        for item in &self.metadata {
            match item {
                MetadataItem::Link { title, text, target } => {
                    writeln!(f, "{title:<width$}  {text}: {target}")?
                }
                MetadataItem::Label { title, text } => writeln!(f, "{title:<width$}  {text}")?,
                MetadataItem::Separator => writeln!(f, "{}", "-".repeat(width + 2))?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    OpenInBrowser { title: String, url: String },
    CopyToClipboard { title: String, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSection {
    pub title: String,
    pub actions: Vec<Action>,
}

/// One setup section with a link per setup page, then the copy actions.
pub fn entity_actions(entity: &EntityDefinition, base_url: &str) -> Vec<ActionSection> {
    let name = entity.qualified_api_name.as_str();

    let setup = SetupSubpath::ALL
        .into_iter()
        .map(|sub| Action::OpenInBrowser {
            title: sub.label().to_string(),
            url: setup_url(base_url, name, Some(sub)),
        })
        .collect();

    let copy = [
        ("QualifiedApiName", Some(name)),
        ("MasterLabel", entity.master_label.as_deref()),
        ("KeyPrefix", entity.key_prefix.as_deref()),
    ]
    .into_iter()
    .map(|(title, content)| Action::CopyToClipboard {
        title: format!("Copy {title}"),
        content: content.unwrap_or_default().to_string(),
    })
    .collect();

    vec![
        ActionSection {
            title: format!("{name} Setup"),
            actions: setup,
        },
        ActionSection {
            title: "Copy".to_string(),
            actions: copy,
        },
    ]
}

impl fmt::Display for ActionSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self
            .actions
            .iter()
            .map(|a| match a {
                Action::OpenInBrowser { title, .. } | Action::CopyToClipboard { title, .. } => {
                    title.chars().count()
                }
            })
            .max()
            .unwrap_or(0);

        for action in &self.actions {
            match action {
                Action::OpenInBrowser { title, url } => writeln!(f, "  {title:<width$}  {url}")?,
                Action::CopyToClipboard { title, content } => {
                    writeln!(f, "  {title:<width$}  {}", or_empty(Some(content)))?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://acme.my.salesforce.com";

    fn account() -> EntityDefinition {
        EntityDefinition {
            id: "000000000000000AAA".to_string(),
            qualified_api_name: "Account".to_string(),
            key_prefix: Some("001".to_string()),
            developer_name: Some("Account".to_string()),
            master_label: Some("Account".to_string()),
            plural_label: Some("Accounts".to_string()),
            durable_id: Some("Account".to_string()),
            description: Some("Business accounts".to_string()),
            new_url: Some("/001/e".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_entity_row() {
        let row = entity_row(&account());
        assert_eq!(row.id, "Account");
        assert_eq!(row.title, "Account");
        assert_eq!(row.accessory.as_deref(), Some("001"));
        assert_eq!(
            row.keywords,
            vec!["001", "Account", "Account", "Account", "Account", "Accounts"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_keywords() {
        let mut widget = EntityDefinition {
            qualified_api_name: "Widget__c".to_string(),
            key_prefix: Some("a01".to_string()),
            plural_label: Some("Gadgets".to_string()),
            ..Default::default()
        };
        widget.durable_id = Some("01I5g000000XyZa".to_string());
        let entities = vec![account(), widget];

        let names = |q: &str| -> Vec<String> {
            search_entities(&entities, q)
                .into_iter()
                .map(|e| e.qualified_api_name.clone())
                .collect()
        };

        assert_eq!(names("ACCOUNT"), vec!["Account"]);
        assert_eq!(names("001"), vec!["Account"]);
        assert_eq!(names("gadget"), vec!["Widget__c"]);
        assert_eq!(names("01i5g"), vec!["Widget__c"]);
        assert_eq!(names(""), vec!["Account", "Widget__c"]);
        assert!(names("Opportunity").is_empty());
    }

    #[test]
    fn test_entity_detail_order_and_placeholders() {
        let detail = entity_detail(&account(), BASE);
        assert_eq!(detail.markdown, "Business accounts");

        let titles: Vec<&str> = detail
            .metadata
            .iter()
            .filter_map(|item| match item {
                MetadataItem::Link { title, .. } | MetadataItem::Label { title, .. } => {
                    Some(title.as_str())
                }
                MetadataItem::Separator => None,
            })
            .collect();
        assert_eq!(
            titles,
            vec![
                "Account Setup",
                "KeyPrefix",
                "QualifiedApiName",
                "MasterLabel",
                "PluralLabel",
                "Description",
                "NamespacePrefix",
                "DeveloperName",
                "DurableId",
                "DetailUrl",
                "EditUrl",
                "NewUrl",
            ]
        );

        assert_eq!(
            detail.metadata[0],
            MetadataItem::Link {
                title: "Account Setup".to_string(),
                text: "Go to Setup".to_string(),
                target: format!("{BASE}/lightning/setup/ObjectManager/Account/Details/view"),
            }
        );
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "NamespacePrefix".to_string(),
            text: EMPTY_VALUE.to_string(),
        }));
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "NewUrl".to_string(),
            text: "/001/e".to_string(),
        }));
    }

    #[test]
    fn test_empty_string_renders_placeholder() {
        let entity = EntityDefinition {
            qualified_api_name: "Thing__c".to_string(),
            key_prefix: Some(String::new()),
            ..Default::default()
        };
        let detail = entity_detail(&entity, BASE);
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "KeyPrefix".to_string(),
            text: EMPTY_VALUE.to_string(),
        }));
    }

    #[test]
    fn test_entity_actions() {
        let sections = entity_actions(&account(), BASE);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Account Setup");
        assert_eq!(sections[0].actions.len(), SetupSubpath::ALL.len());
        assert_eq!(
            sections[0].actions[1],
            Action::OpenInBrowser {
                title: "Fields & Relationships".to_string(),
                url: format!("{BASE}/lightning/setup/ObjectManager/Account/FieldsAndRelationships/view"),
            }
        );
        assert_eq!(
            sections[1].actions,
            vec![
                Action::CopyToClipboard {
                    title: "Copy QualifiedApiName".to_string(),
                    content: "Account".to_string()
                },
                Action::CopyToClipboard {
                    title: "Copy MasterLabel".to_string(),
                    content: "Account".to_string()
                },
                Action::CopyToClipboard {
                    title: "Copy KeyPrefix".to_string(),
                    content: "001".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_field_row_and_detail() {
        let field = FieldDefinition {
            qualified_api_name: "AnnualRevenue".to_string(),
            label: Some("Annual Revenue".to_string()),
            data_type: Some("Currency(18, 0)".to_string()),
            precision: Some(18),
            scale: Some(0),
            is_nillable: Some(true),
            ..Default::default()
        };

        let row = field_row(&field);
        assert_eq!(row.title, "AnnualRevenue");
        assert_eq!(row.subtitle.as_deref(), Some("Annual Revenue"));
        assert_eq!(row.accessory.as_deref(), Some("Currency(18, 0)"));
        assert!(row.matches("revenue"));

        let detail = field_detail(&field);
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "Precision".to_string(),
            text: "18".to_string(),
        }));
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "Length".to_string(),
            text: EMPTY_VALUE.to_string(),
        }));
        assert!(detail.metadata.contains(&MetadataItem::Label {
            title: "IsNillable".to_string(),
            text: "Yes".to_string(),
        }));
    }

    #[test]
    fn test_render_rows_aligns_columns() {
        let rows = vec![
            entity_row(&account()),
            entity_row(&EntityDefinition {
                qualified_api_name: "Widget__c".to_string(),
                key_prefix: Some("a01".to_string()),
                ..Default::default()
            }),
        ];
        assert_eq!(render_rows(&rows), "Account    001\nWidget__c  a01\n");
    }

    #[test]
    fn test_detail_display() {
        let text = entity_detail(&account(), BASE).to_string();
        assert!(text.starts_with("Business accounts\n\n"));
        assert!(text.contains("Go to Setup: https://acme.my.salesforce.com/lightning/setup/ObjectManager/Account/Details/view"));
        assert!(text.contains("NamespacePrefix   –"));
    }
}
