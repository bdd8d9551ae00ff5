use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::consistency::{ConsistencyIssue, check_references};
use crate::schema::validator::{Validation, ValidationOptions, Warning};
use crate::schema::parse_document_with;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Valid,
    Invalid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntityCounts {
    pub custom_moods: usize,
    pub tags: usize,
    pub day_entries: usize,
    pub achievements: usize,
    pub prefs: usize,
    pub reminders: usize,
    pub writing_templates: usize,
}

/// Outcome of validating one export, as printed by the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub source: String,
    pub status: ReportStatus,
    pub version: Option<i64>,
    pub counts: Option<EntityCounts>,
    pub warnings: Vec<Warning>,
    /// Only filled when reference checks were requested.
    pub issues: Vec<ConsistencyIssue>,
    pub error: Option<String>,
}

impl ValidationReport {
    pub fn valid(source: impl Into<String>, validation: &Validation, issues: Vec<ConsistencyIssue>) -> Self {
        let doc = &validation.document;
        Self {
            source: source.into(),
            status: ReportStatus::Valid,
            version: Some(doc.version),
            counts: Some(EntityCounts {
                custom_moods: doc.custom_moods.len(),
                tags: doc.tags.len(),
                day_entries: doc.day_entries.len(),
                achievements: doc.achievements.len(),
                prefs: doc.prefs.len(),
                reminders: doc.reminders.len(),
                writing_templates: doc.writing_templates.len(),
            }),
            warnings: validation.warnings.clone(),
            issues,
            error: None,
        }
    }

    pub fn invalid(source: impl Into<String>, error: &SchemaError) -> Self {
        Self::failed(source, error.to_string())
    }

    /// A report for input that never reached validation, or failed it.
    pub fn failed(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: ReportStatus::Invalid,
            version: None,
            counts: None,
            warnings: Vec::new(),
            issues: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == ReportStatus::Valid
    }
}

pub fn build_report(
    source: &str,
    text: &str,
    options: &ValidationOptions,
    check_refs: bool,
) -> ValidationReport {
    match parse_document_with(text, options) {
        Ok(validation) => {
            let issues = if check_refs {
                check_references(&validation.document)
            } else {
                Vec::new()
            };
            ValidationReport::valid(source, &validation, issues)
        }
        Err(err) => ValidationReport::invalid(source, &err),
    }
}

/// JSON Schema of [`ValidationReport`], for consumers of `validate --json`.
pub fn report_schema() -> Schema {
    schemars::schema_for!(ValidationReport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_text_is_an_invalid_report() {
        let report = build_report("broken.json", "{\"version\":", &ValidationOptions::default(), false);
        assert!(!report.is_valid());
        assert!(report.error.unwrap().starts_with("invalid JSON:"));
        assert_eq!(report.counts, None);
    }

    #[test]
    fn schema_violation_is_reported_as_text() {
        let report = build_report("a.json", "{}", &ValidationOptions::default(), true);
        assert_eq!(report.status, ReportStatus::Invalid);
        assert_eq!(
            report.error.as_deref(),
            Some("Document.version (key \"version\") at $: missing required field")
        );
    }

    #[test]
    fn report_serializes_status_in_lowercase() {
        let report = ValidationReport::invalid("x", &SchemaError::Json("eof".to_string()));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "invalid");
        assert_eq!(value["error"], "invalid JSON: eof");
    }

    #[test]
    fn report_schema_describes_the_report() {
        let schema = serde_json::to_value(report_schema()).unwrap();
        assert_eq!(schema["title"], "ValidationReport");
        assert!(schema["properties"]["status"].is_object());
        assert!(schema["properties"]["warnings"].is_object());
    }
}
