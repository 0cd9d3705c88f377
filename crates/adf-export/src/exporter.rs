//! Sprint export: fetch issues, keep their rich-text fields, write JSON and Markdown.

use std::path::{Path, PathBuf};

use adf_markdown::{AdfConverter, EMPTY_FALLBACK};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::client::IssueSource;
use crate::storage::save;
use crate::{ExportError, Result};

/// Prefix Jira gives to site-specific fields
pub const CUSTOM_FIELD_PREFIX: &str = "customfield_";

/// The parts of an issue that get exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedIssue {
    pub title: String,
    pub description: IssueDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDescription {
    /// The issue's own ADF description, if any
    pub original_description: Option<Value>,
    /// Custom fields holding ADF documents, in field order
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomField {
    pub field_id: String,
    pub field_value: Value,
}

impl ProcessedIssue {
    /// Pick the title, the description and every custom field whose value is an
    /// ADF document out of a raw issue record.
    pub fn from_issue(issue: &Value) -> Self {
        let empty = Map::new();
        let fields = issue
            .get("fields")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let title = fields
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("No Title")
            .to_string();

        let custom_fields = fields
            .iter()
            .filter(|(key, value)| {
                key.starts_with(CUSTOM_FIELD_PREFIX)
                    && value.get("type").and_then(Value::as_str) == Some("doc")
            })
            .map(|(key, value)| CustomField {
                field_id: key.clone(),
                field_value: value.clone(),
            })
            .collect();

        Self {
            title,
            description: IssueDescription {
                original_description: fields
                    .get("description")
                    .filter(|value| !value.is_null())
                    .cloned(),
                custom_fields,
            },
        }
    }
}

/// Build the Markdown page for one issue.
///
/// Conversion failures are written into the page rather than returned, so one bad
/// field never costs the rest of the issue.
pub fn issue_markdown(converter: &AdfConverter, issue: &ProcessedIssue) -> String {
    let mut parts = vec![format!("# {}\n", issue.title)];

    let description = issue
        .description
        .original_description
        .as_ref()
        .filter(|value| has_content(value));

    if let Some(description) = description {
        parts.push("### Original Description\n".to_string());
        match converter.convert_with_report(description) {
            Ok(conversion) => {
                report_issues(&issue.title, "description", conversion.issues.len());
                parts.push(conversion.markdown);
            }
            Err(err) => {
                log::error!("Error converting original description: {err}");
                parts.push("Error converting original description.\n".to_string());
            }
        }
    }

    let custom_fields = &issue.description.custom_fields;
    if !custom_fields.is_empty() {
        parts.push("\n### Custom Fields\n".to_string());
        for field in custom_fields {
            parts.push(format!("#### {}\n", field.field_id));
            if !field.field_value.is_object() {
                parts.push("Unsupported field structure.\n".to_string());
                continue;
            }
            match converter.convert_with_report(&field.field_value) {
                Ok(conversion) => {
                    report_issues(&issue.title, &field.field_id, conversion.issues.len());
                    parts.push(conversion.markdown);
                }
                Err(err) => parts.push(format!("Error processing field: {err}\n")),
            }
        }
    }

    if description.is_none() && custom_fields.is_empty() {
        parts.push(EMPTY_FALLBACK.to_string());
    }

    parts.join("\n")
}

/// `null`, an empty object and an empty string count as no description
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn report_issues(title: &str, field: &str, count: usize) {
    if count > 0 {
        log::warn!("{title}: {count} node(s) in {field} were replaced by placeholders");
    }
}

/// Outcome of one export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: usize,
}

/// Exports every issue of one sprint.
pub struct SprintExporter<S> {
    source: S,
    converter: AdfConverter,
    sprint_id: String,
    output_folder: PathBuf,
}

impl<S: IssueSource> SprintExporter<S> {
    pub fn new(source: S, sprint_id: &str, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            source,
            converter: AdfConverter::new(),
            sprint_id: sprint_id.to_string(),
            output_folder: output_folder.into(),
        }
    }

    /// Use a converter with custom rules or options
    pub fn with_converter(mut self, converter: AdfConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// The issue query for this sprint
    pub fn query(&self) -> String {
        format!("sprint = \"{}\"", self.sprint_id)
    }

    /// `summary`, `description` and every custom field the tracker offers
    pub fn requested_fields(&self) -> Result<String> {
        let mut fields = vec!["summary".to_string(), "description".to_string()];
        fields.extend(
            self.source
                .list_available_fields()?
                .into_iter()
                .filter(|field| field.id.starts_with(CUSTOM_FIELD_PREFIX))
                .map(|field| field.id),
        );
        Ok(fields.join(","))
    }

    /// Fetch and export every issue of the sprint, one at a time.
    ///
    /// Fetch errors abort the run. An issue that fails to export is logged and
    /// counted, and the run moves on to the next one.
    pub fn run(&self) -> Result<ExportSummary> {
        log::info!("Starting sprint export for sprint {}", self.sprint_id);

        let fields = self.requested_fields()?;
        let issues = self.source.fetch_issues(&self.query(), &fields)?;

        let mut summary = ExportSummary::default();
        if issues.is_empty() {
            log::warn!("No issues found for the specified sprint.");
            return Ok(summary);
        }

        for issue in &issues {
            match self.export_issue(issue) {
                Ok(()) => summary.exported += 1,
                Err(err) => {
                    let key = issue.get("key").and_then(Value::as_str).unwrap_or("Unknown");
                    log::error!("Failed to save issue {key}: {err}");
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "Successfully processed {} issues ({} failed).",
            summary.exported,
            summary.failed
        );
        Ok(summary)
    }

    /// Write `json/{key}.json` and `md/{key}.md` for one issue
    pub fn export_issue(&self, issue: &Value) -> Result<()> {
        let key = issue
            .get("key")
            .and_then(Value::as_str)
            .ok_or(ExportError::MissingKey)?;
        let processed = ProcessedIssue::from_issue(issue);

        let json_path = self.output_folder.join("json").join(format!("{key}.json"));
        save(&json_path, &to_pretty_json(&processed)?)?;
        log::info!("Saved issue as JSON: {}", json_path.display());

        let markdown_path = self.output_folder.join("md").join(format!("{key}.md"));
        save(&markdown_path, &issue_markdown(&self.converter, &processed))?;
        log::info!("Saved issue as Markdown: {}", markdown_path.display());

        Ok(())
    }
}

/// Pretty JSON with four-space indentation
fn to_pretty_json(value: &impl Serialize) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FieldInfo;
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct FakeSource {
        fields: Vec<FieldInfo>,
        issues: Vec<Value>,
        queries: RefCell<Vec<(String, String)>>,
    }

    impl IssueSource for FakeSource {
        fn fetch_issues(&self, query: &str, fields: &str) -> Result<Vec<Value>> {
            self.queries
                .borrow_mut()
                .push((query.to_string(), fields.to_string()));
            Ok(self.issues.clone())
        }

        fn list_available_fields(&self) -> Result<Vec<FieldInfo>> {
            Ok(self.fields.clone())
        }
    }

    fn field(id: &str) -> FieldInfo {
        FieldInfo {
            id: id.to_string(),
            name: id.to_string(),
        }
    }

    fn adf(text: &str) -> Value {
        json!({
            "type": "doc",
            "version": 1,
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": text}]}]
        })
    }

    fn issue(key: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "summary": "Fix login",
                "description": adf("Users cannot log in."),
                "customfield_10010": adf("Given a user"),
                "customfield_10020": "plain string",
                "customfield_10030": {"type": "other"},
                "labels": ["auth"]
            }
        })
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let output = to_pretty_json(&json!({"title": "Ünïcode", "tags": ["a"]})).unwrap();
        assert_eq!(
            output,
            "{\n    \"title\": \"Ünïcode\",\n    \"tags\": [\n        \"a\"\n    ]\n}"
        );
    }

    #[test]
    fn test_processes_issue_fields() {
        let processed = ProcessedIssue::from_issue(&issue("ABC-1"));
        assert_eq!(processed.title, "Fix login");
        assert_eq!(
            processed.description.original_description,
            Some(adf("Users cannot log in."))
        );
        assert_eq!(
            processed.description.custom_fields,
            vec![CustomField {
                field_id: "customfield_10010".to_string(),
                field_value: adf("Given a user"),
            }]
        );
    }

    #[test]
    fn test_missing_summary_gets_default_title() {
        let processed = ProcessedIssue::from_issue(&json!({"key": "ABC-2", "fields": {}}));
        assert_eq!(processed.title, "No Title");
        assert_eq!(processed.description.original_description, None);
        assert!(processed.description.custom_fields.is_empty());
    }

    #[test]
    fn test_markdown_layout() {
        let processed = ProcessedIssue::from_issue(&issue("ABC-1"));
        let markdown = issue_markdown(&AdfConverter::new(), &processed);
        assert_eq!(
            markdown,
            "# Fix login\n\n\
             ### Original Description\n\n\
             Users cannot log in.\n\n\
             \n### Custom Fields\n\n\
             #### customfield_10010\n\n\
             Given a user\n"
        );
    }

    #[test]
    fn test_markdown_without_content_falls_back() {
        let processed = ProcessedIssue::from_issue(&json!({
            "fields": {"summary": "Empty", "description": null}
        }));
        let markdown = issue_markdown(&AdfConverter::new(), &processed);
        assert_eq!(markdown, "# Empty\n\nN/A");
    }

    #[test]
    fn test_markdown_reports_invalid_documents() {
        let processed = ProcessedIssue {
            title: "Broken".to_string(),
            description: IssueDescription {
                original_description: Some(json!({"type": "paragraph"})),
                custom_fields: vec![
                    CustomField {
                        field_id: "customfield_1".to_string(),
                        field_value: json!({"type": "notdoc"}),
                    },
                    CustomField {
                        field_id: "customfield_2".to_string(),
                        field_value: json!("text"),
                    },
                ],
            },
        };
        let markdown = issue_markdown(&AdfConverter::new(), &processed);
        assert!(markdown.contains("### Original Description\n\nError converting original description.\n"));
        assert!(markdown.contains("#### customfield_1\n\nError processing field: Invalid ADF document"));
        assert!(markdown.contains("#### customfield_2\n\nUnsupported field structure.\n"));
    }

    #[test]
    fn test_requests_custom_fields() {
        let source = FakeSource {
            fields: vec![field("summary"), field("customfield_1"), field("customfield_2")],
            ..Default::default()
        };
        let exporter = SprintExporter::new(source, "17", "out");
        assert_eq!(
            exporter.requested_fields().unwrap(),
            "summary,description,customfield_1,customfield_2"
        );
        assert_eq!(exporter.query(), "sprint = \"17\"");
    }

    #[test]
    fn test_exports_every_issue() {
        let dir = tempfile::tempdir().unwrap();
        let source = FakeSource {
            fields: vec![field("customfield_10010")],
            issues: vec![issue("ABC-1"), json!({"fields": {"summary": "no key"}}), issue("ABC-3")],
            ..Default::default()
        };
        let exporter = SprintExporter::new(source, "17", dir.path());

        let summary = exporter.run().unwrap();
        assert_eq!(summary, ExportSummary { exported: 2, failed: 1 });

        let queries = exporter.source.queries.borrow();
        assert_eq!(
            queries.as_slice(),
            &[(
                "sprint = \"17\"".to_string(),
                "summary,description,customfield_10010".to_string()
            )]
        );

        let markdown = fs::read_to_string(dir.path().join("md").join("ABC-1.md")).unwrap();
        assert!(markdown.starts_with("# Fix login\n"));

        let json = fs::read_to_string(dir.path().join("json").join("ABC-3.json")).unwrap();
        assert!(json.starts_with("{\n    \"title\": \"Fix login\""));
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed["description"]["custom_fields"][0]["field_id"],
            "customfield_10010"
        );
    }

    #[test]
    fn test_empty_sprint_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = SprintExporter::new(FakeSource::default(), "17", dir.path().join("out"));

        let summary = exporter.run().unwrap();
        assert_eq!(summary, ExportSummary::default());
        assert!(!exporter.output_folder().exists());
    }
}
