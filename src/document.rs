// Document models as returned by the Paperless-ngx API, plus the edit logic
// behind `document edit`. The edit step is pure: it changes a fetched
// `Document` in memory and reports which fields need to be sent back.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The subset of a document the CLI reads or edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub archive_serial_number: Option<u64>,
    #[serde(default)]
    pub correspondent: Option<u64>,
    #[serde(default)]
    pub document_type: Option<u64>,
    #[serde(default)]
    pub storage_path: Option<u64>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldInstance>,
}

impl Document {
    /// Creation date, preferring the plain date form.
    pub fn created_on(&self) -> Option<&str> {
        self.created_date.as_deref().or(self.created.as_deref())
    }
}

/// A custom field assigned to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldInstance {
    pub field: u64,
    #[serde(default)]
    pub value: Value,
}

/// Tags, correspondents, document types and storage paths all share this
/// shape; only storage paths carry `path`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedObject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

/// Paginated list response. Only `results` is read; callers size the page
/// with `page_size` so one page holds everything they asked for.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
}

/// A tag or custom field given on the command line, by id or by exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectRef {
    Id(u64),
    Name(String),
}

impl FromStr for ObjectRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Must not be empty.".to_string());
        }
        Ok(match s.parse::<u64>() {
            Ok(id) => ObjectRef::Id(id),
            Err(_) => ObjectRef::Name(s.to_string()),
        })
    }
}

/// `NAME|ID[=VALUE]` as given to `--custom-fields`.
///
/// `value` is `None` when no `=` was given (keep the current value, or null
/// for a new assignment) and `Some("")` when the field should be cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldArg {
    pub field: ObjectRef,
    pub value: Option<String>,
}

impl FromStr for CustomFieldArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = match s.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (s, None),
        };
        Ok(CustomFieldArg {
            field: key.parse()?,
            value,
        })
    }
}

/// Custom field assignment with the field already resolved to its id.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFieldAssignment {
    pub field: u64,
    /// `None` keeps an existing value; `Some(Value::Null)` clears it.
    pub value: Option<Value>,
}

impl CustomFieldAssignment {
    pub fn new(field: u64, raw: Option<&str>) -> Self {
        let value = raw.map(|v| {
            if v.is_empty() {
                Value::Null
            } else {
                Value::String(v.to_string())
            }
        });
        CustomFieldAssignment { field, value }
    }
}

/// Changes requested by `document edit`, with every reference resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentEdit {
    pub asn: Option<u64>,
    pub correspondent: Option<u64>,
    pub document_type: Option<u64>,
    pub storage_path: Option<u64>,
    pub title: Option<String>,
    pub created_date: Option<String>,
    pub add_tags: Vec<u64>,
    pub remove_tags: Vec<u64>,
    pub add_custom_fields: Vec<CustomFieldAssignment>,
    pub remove_custom_fields: Vec<u64>,
}

/// Body of the `PATCH` request: only fields that were touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_serial_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correspondent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomFieldInstance>>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        *self == DocumentPatch::default()
    }
}

impl DocumentEdit {
    /// Apply the edit to `doc` and return the fields to send.
    ///
    /// Removals run before additions, so naming a tag in both lists leaves it
    /// assigned. New tags are appended without duplicates, keeping order.
    pub fn apply(&self, doc: &mut Document) -> DocumentPatch {
        let mut patch = DocumentPatch::default();

        if let Some(asn) = self.asn {
            doc.archive_serial_number = Some(asn);
            patch.archive_serial_number = Some(asn);
        }
        if let Some(id) = self.correspondent {
            doc.correspondent = Some(id);
            patch.correspondent = Some(id);
        }
        if let Some(id) = self.document_type {
            doc.document_type = Some(id);
            patch.document_type = Some(id);
        }
        if let Some(id) = self.storage_path {
            doc.storage_path = Some(id);
            patch.storage_path = Some(id);
        }
        if let Some(title) = &self.title {
            doc.title = title.clone();
            patch.title = Some(title.clone());
        }
        if let Some(date) = &self.created_date {
            doc.created_date = Some(date.clone());
            patch.created_date = Some(date.clone());
        }

        if !self.remove_tags.is_empty() || !self.add_tags.is_empty() {
            doc.tags.retain(|t| !self.remove_tags.contains(t));
            for tag in &self.add_tags {
                if !doc.tags.contains(tag) {
                    doc.tags.push(*tag);
                }
            }
            patch.tags = Some(doc.tags.clone());
        }

        if !self.remove_custom_fields.is_empty() || !self.add_custom_fields.is_empty() {
            doc.custom_fields
                .retain(|cf| !self.remove_custom_fields.contains(&cf.field));

            for assignment in &self.add_custom_fields {
                match doc.custom_fields.iter_mut().find(|cf| cf.field == assignment.field) {
                    Some(existing) => {
                        if let Some(value) = &assignment.value {
                            existing.value = value.clone();
                        }
                    }
                    None => doc.custom_fields.push(CustomFieldInstance {
                        field: assignment.field,
                        value: assignment.value.clone().unwrap_or(Value::Null),
                    }),
                }
            }
            patch.custom_fields = Some(doc.custom_fields.clone());
        }

        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_reads_results_and_ignores_paging_fields() {
        let page: Page<NamedObject> = serde_json::from_value(json!({
            "count": 2,
            "next": null,
            "results": [{"id": 1, "name": "Inbox"}, {"id": 4, "name": "Paid"}],
        }))
        .unwrap();
        let names: Vec<&str> = page.results.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Inbox", "Paid"]);
    }

    fn sample() -> Document {
        serde_json::from_value(json!({
            "id": 7,
            "title": "Invoice",
            "archive_serial_number": null,
            "correspondent": 3,
            "document_type": null,
            "storage_path": null,
            "created_date": "2024-01-31",
            "tags": [1, 2],
            "custom_fields": [{"field": 10, "value": "old"}],
            "notes": []
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_unknown_fields_and_defaults() {
        let doc: Document = serde_json::from_value(json!({"id": 1, "created": "2024-02-01"})).unwrap();
        assert_eq!(doc.title, "");
        assert!(doc.tags.is_empty());
        assert_eq!(doc.created_on(), Some("2024-02-01"));
        assert_eq!(sample().created_on(), Some("2024-01-31"));
    }

    #[test]
    fn object_ref_parses_ids_and_names() {
        assert_eq!("12".parse::<ObjectRef>().unwrap(), ObjectRef::Id(12));
        assert_eq!(
            "Inbox".parse::<ObjectRef>().unwrap(),
            ObjectRef::Name("Inbox".to_string())
        );
        assert!("".parse::<ObjectRef>().is_err());
    }

    #[test]
    fn custom_field_arg_splits_on_first_equals() {
        let arg: CustomFieldArg = "Amount=1=2".parse().unwrap();
        assert_eq!(arg.field, ObjectRef::Name("Amount".to_string()));
        assert_eq!(arg.value.as_deref(), Some("1=2"));

        let arg: CustomFieldArg = "4".parse().unwrap();
        assert_eq!(arg.field, ObjectRef::Id(4));
        assert_eq!(arg.value, None);

        let arg: CustomFieldArg = "4=".parse().unwrap();
        assert_eq!(arg.value.as_deref(), Some(""));
    }

    #[test]
    fn scalar_fields_only_patch_what_was_given() {
        let mut doc = sample();
        let edit = DocumentEdit {
            title: Some("Receipt".to_string()),
            asn: Some(42),
            ..Default::default()
        };
        let patch = edit.apply(&mut doc);
        assert_eq!(doc.title, "Receipt");
        assert_eq!(doc.archive_serial_number, Some(42));
        assert_eq!(patch.title.as_deref(), Some("Receipt"));
        assert!(patch.tags.is_none());
        assert!(patch.custom_fields.is_none());

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, json!({"archive_serial_number": 42, "title": "Receipt"}));
    }

    #[test]
    fn tags_are_removed_then_unioned() {
        let mut doc = sample();
        let edit = DocumentEdit {
            add_tags: vec![3, 1, 3],
            remove_tags: vec![2],
            ..Default::default()
        };
        let patch = edit.apply(&mut doc);
        assert_eq!(doc.tags, vec![1, 3]);
        assert_eq!(patch.tags, Some(vec![1, 3]));
    }

    #[test]
    fn custom_fields_update_clear_and_append() {
        let mut doc = sample();
        doc.custom_fields.push(CustomFieldInstance {
            field: 11,
            value: json!(5),
        });
        let edit = DocumentEdit {
            add_custom_fields: vec![
                CustomFieldAssignment::new(10, Some("new")),
                CustomFieldAssignment::new(11, None),
                CustomFieldAssignment::new(12, Some("")),
            ],
            ..Default::default()
        };
        edit.apply(&mut doc);
        assert_eq!(doc.custom_fields.len(), 3);
        assert_eq!(doc.custom_fields[0].value, json!("new"));
        assert_eq!(doc.custom_fields[1].value, json!(5));
        assert_eq!(doc.custom_fields[2].field, 12);
        assert_eq!(doc.custom_fields[2].value, Value::Null);
    }

    #[test]
    fn custom_field_removal() {
        let mut doc = sample();
        let edit = DocumentEdit {
            remove_custom_fields: vec![10, 99],
            ..Default::default()
        };
        let patch = edit.apply(&mut doc);
        assert!(doc.custom_fields.is_empty());
        assert_eq!(patch.custom_fields, Some(vec![]));
    }

    #[test]
    fn empty_edit_produces_empty_patch() {
        let mut doc = sample();
        let before = doc.clone();
        let patch = DocumentEdit::default().apply(&mut doc);
        assert!(patch.is_empty());
        assert_eq!(doc, before);
    }
}
