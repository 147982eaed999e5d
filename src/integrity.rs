// Validates the static JSON assets against their schemas before deployment

use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::schema::{self, Diagnostic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTarget {
    pub name: String,
    pub schema: PathBuf,
    pub data: PathBuf,
}

impl ValidationTarget {
    pub fn new(name: &str, schema: PathBuf, data: PathBuf) -> Self {
        ValidationTarget {
            name: name.to_string(),
            schema,
            data,
        }
    }
}

pub fn default_targets(settings: &Settings) -> Vec<ValidationTarget> {
    let schemas = &settings.schemas_dir;
    let data = &settings.data_dir;
    vec![
        ValidationTarget::new(
            "categories",
            schemas.join("categories.schema.json"),
            data.join("categories.json"),
        ),
        ValidationTarget::new("filters", schemas.join("filters.schema.json"), data.join("filters.json")),
        ValidationTarget::new(
            "vehicles",
            schemas.join("vehicles.schema.json"),
            settings.vehicles_dir().join("vehicles.json"),
        ),
        ValidationTarget::new(
            "listings",
            schemas.join("listings.schema.json"),
            data.join("listings.json"),
        ),
    ]
}

async fn read_document(path: &Path) -> Result<Value> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Diagnostics for one target. I/O and parse failures are errors, data defects are not.
pub async fn validate_target(target: &ValidationTarget) -> Result<Vec<Diagnostic>> {
    let (schema, data) = futures::try_join!(read_document(&target.schema), read_document(&target.data))?;
    Ok(schema::validate(&schema, &data))
}

#[derive(Debug)]
pub enum Outcome {
    Valid,
    Invalid(Vec<Diagnostic>),
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct TargetReport {
    pub name: String,
    pub outcome: Outcome,
}

impl fmt::Display for TargetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Valid => write!(f, "✅ {} valid", self.name),
            Outcome::Invalid(diagnostics) => {
                write!(f, "❌ {} invalid", self.name)?;
                for diagnostic in diagnostics {
                    write!(f, "\n  • {}", diagnostic)?;
                }
                Ok(())
            }
            Outcome::Failed(error) => write!(f, "❌ Failed to validate {}\n{:#}", self.name, error),
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub targets: Vec<TargetReport>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.targets
            .iter()
            .any(|t| !matches!(t.outcome, Outcome::Valid))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for target in &self.targets {
            writeln!(f, "{}", target)?;
        }
        if !self.has_errors() {
            write!(f, "All JSON assets validated successfully.")?;
        }
        Ok(())
    }
}

// Targets run one after another; a broken file never stops the rest
pub async fn validate_all(targets: &[ValidationTarget]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for target in targets {
        let outcome = match validate_target(target).await {
            Ok(diagnostics) if diagnostics.is_empty() => Outcome::Valid,
            Ok(diagnostics) => {
                tracing::warn!(target_name = %target.name, count = diagnostics.len(), "Schema violations found");
                Outcome::Invalid(diagnostics)
            }
            Err(e) => {
                tracing::error!(target_name = %target.name, "Validation failed: {:#}", e);
                Outcome::Failed(e)
            }
        };
        report.targets.push(TargetReport {
            name: target.name.clone(),
            outcome,
        });
    }
    report
}
