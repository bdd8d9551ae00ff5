//! File-level operations behind the CLI subcommands.
//!
//! Validation and re-encoding are CPU-bound and run on the blocking pool;
//! several files are processed concurrently and reported in input order.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::{fs, task};
use tracing::{debug, warn};

use crate::error::{SchemaError, ServiceError, ServiceResult};
use crate::schema::achievement::{Milestone, ProgressField};
use crate::schema::alias::milestone_key;
use crate::schema::registry::{self, ACHIEVEMENT, EntitySpec, Presence};
use crate::schema::report::{ValidationReport, build_report};
use crate::schema::validator::{ValidationOptions, Warning, validate_document_with};
use crate::schema::encode_document;

async fn validate_file(
    path: PathBuf,
    options: ValidationOptions,
    check_references: bool,
) -> ServiceResult<ValidationReport> {
    let source = path.display().to_string();
    let text = match fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %source, error = %err, "cannot read export");
            return Ok(ValidationReport::failed(source, format!("cannot read file: {err}")));
        }
    };
    debug!(path = %source, bytes = text.len(), "read export");
    let report =
        task::spawn_blocking(move || build_report(&source, &text, &options, check_references))
            .await?;
    Ok(report)
}

/// Validates every file; an unreadable or invalid file yields a failed
/// report rather than aborting the batch.
pub async fn validate_files(
    paths: &[PathBuf],
    options: &ValidationOptions,
    check_references: bool,
) -> ServiceResult<Vec<ValidationReport>> {
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::spawn(validate_file(path, options.clone(), check_references)))
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await??);
    }
    Ok(reports)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundtripOutcome {
    pub encoded: Value,
    /// Top-level keys whose value differs between input and re-encoding.
    pub differing_keys: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl RoundtripOutcome {
    pub fn is_identical(&self) -> bool {
        self.differing_keys.is_empty()
    }
}

fn differing_keys(original: &Value, encoded: &Value) -> Vec<String> {
    let (Some(before), Some(after)) = (original.as_object(), encoded.as_object()) else {
        return if original == encoded {
            Vec::new()
        } else {
            vec!["$".to_string()]
        };
    };
    let mut keys: Vec<String> = before
        .iter()
        .filter(|(key, value)| after.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    keys.extend(after.keys().filter(|key| !before.contains_key(*key)).cloned());
    keys
}

pub fn roundtrip_text(text: &str, options: &ValidationOptions) -> ServiceResult<RoundtripOutcome> {
    let original: Value = serde_json::from_str(text).map_err(SchemaError::from)?;
    let validation = validate_document_with(&original, options)?;
    let encoded = encode_document(&validation.document)?;
    let differing_keys = differing_keys(&original, &encoded);
    if !differing_keys.is_empty() {
        debug!(keys = ?differing_keys, "re-encoding changed top-level keys");
    }
    Ok(RoundtripOutcome {
        encoded,
        differing_keys,
        warnings: validation.warnings,
    })
}

pub async fn roundtrip_file(path: &Path, options: &ValidationOptions) -> ServiceResult<RoundtripOutcome> {
    let text = fs::read_to_string(path).await?;
    let options = options.clone();
    task::spawn_blocking(move || roundtrip_text(&text, &options)).await?
}

/// Writes via a uniquely named temp file in the target directory, renamed
/// into place, so a failed write leaves any existing file intact.
pub async fn write_json(path: &Path, value: &Value, pretty: bool) -> ServiceResult<()> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let path = path.to_path_buf();
    task::spawn_blocking(move || -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|err| err.error)?;
        Ok(())
    })
    .await??;
    Ok(())
}

fn presence_label(presence: Presence) -> &'static str {
    match presence {
        Presence::Required => "required",
        Presence::Optional => "optional",
    }
}

fn push_entity(out: &mut String, spec: &EntitySpec) {
    out.push_str(spec.name);
    out.push('\n');
    for field in spec.fields {
        out.push_str(&format!(
            "  {:<32} {:<46} {:<24} {}\n",
            field.field,
            field.key,
            field.kind.to_string(),
            presence_label(field.presence)
        ));
    }
    if spec.name == ACHIEVEMENT.name {
        for milestone in Milestone::all() {
            for progress in ProgressField::ALL {
                out.push_str(&format!(
                    "  {:<32} {:<46} {:<24} {}\n",
                    format!("{}.{}", milestone.as_str().to_ascii_lowercase(), progress.field()),
                    milestone_key(milestone, progress),
                    progress.kind().to_string(),
                    presence_label(Presence::Optional)
                ));
            }
        }
    }
}

/// Registry listing for one entity (case-insensitive name) or all of them.
pub fn field_table(entity: Option<&str>) -> ServiceResult<String> {
    let specs: Vec<&EntitySpec> = match entity {
        Some(name) => {
            let spec = registry::entity(name).ok_or_else(|| {
                let known: Vec<&str> = registry::entities().iter().map(|spec| spec.name).collect();
                ServiceError::Other(format!(
                    "Unknown entity '{name}'; expected one of: {}",
                    known.join(", ")
                ))
            })?;
            vec![spec]
        }
        None => registry::entities().to_vec(),
    };

    let mut out = String::new();
    for (index, spec) in specs.into_iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        push_entity(&mut out, spec);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn differing_keys_reports_changed_added_and_removed() {
        let before = json!({"a": 1, "b": 2, "c": 3});
        let after = json!({"a": 1, "b": 5, "d": 4});
        assert_eq!(differing_keys(&before, &after), vec!["b", "c", "d"]);
        assert!(differing_keys(&before, &before).is_empty());
    }

    #[test]
    fn field_table_lists_external_keys() {
        let table = field_table(Some("dayentry")).unwrap();
        assert!(table.starts_with("DayEntry\n"));
        assert!(table.contains("time_zone_offset"));
        assert!(table.contains("timeZoneOffset"));
        assert!(!table.contains("Metadatum"));
    }

    #[test]
    fn field_table_expands_achievement_milestones() {
        let table = field_table(Some("Achievement")).unwrap();
        assert!(table.contains("AC_STREAK_BONUS_UNLOCKED_AT"));
        assert!(table.contains("streak_bonus.unlocked_at"));
    }

    #[test]
    fn unknown_entity_is_an_error() {
        let err = field_table(Some("Goal")).unwrap_err();
        assert!(err.to_string().starts_with("Unknown entity 'Goal'"));
    }

    #[test]
    fn roundtrip_of_invalid_json_is_a_schema_error() {
        let err = roundtrip_text("[", &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Schema(SchemaError::Json(_))));
    }

    #[tokio::test]
    async fn unreadable_file_yields_failed_report_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{}").unwrap();
        let missing = dir.path().join("missing.json");

        let reports = validate_files(&[missing.clone(), broken.clone()], &ValidationOptions::default(), false)
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].source, missing.display().to_string());
        assert!(reports[0].error.as_deref().unwrap().starts_with("cannot read file:"));
        assert_eq!(reports[1].source, broken.display().to_string());
        assert!(!reports[1].is_valid());
    }

    #[tokio::test]
    async fn write_json_replaces_target_and_leaves_neighbours_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        let neighbour = dir.path().join("out.tmp");
        std::fs::write(&target, "old").unwrap();
        std::fs::write(&neighbour, "keep me").unwrap();

        write_json(&target, &json!({"version": 14}), false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"{"version":14}"#);
        assert_eq!(std::fs::read_to_string(&neighbour).unwrap(), "keep me");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
