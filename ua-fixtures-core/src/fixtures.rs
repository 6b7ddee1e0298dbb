//! Batch generation of fixture pairs.

use crate::error::Result;
use crate::persist;
use crate::rules::{FixtureContext, RuleFixture, Variant};
use crate::writer::WriterConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One fixture file that was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFixture {
    pub rule_id: String,
    pub variant: Variant,
    pub path: PathBuf,
    pub objects: usize,
}

/// One fixture that could not be produced. No file exists for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureFailure {
    pub rule_id: String,
    pub output_dir: String,
    pub variant: Variant,
    pub error: String,
}

/// Outcome of a generation run, written as `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedFixture>,
    pub failures: Vec<FixtureFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as `manifest.json` under `root`.
    pub fn write_manifest(&self, root: impl AsRef<Path>) -> Result<PathBuf> {
        let path = root.as_ref().join("manifest.json");
        std::fs::create_dir_all(root.as_ref())?;
        std::fs::write(&path, self.to_json()?)?;
        Ok(path)
    }
}

/// Where `rule`'s `variant` lands under `root`.
pub fn fixture_path(root: &Path, rule: &dyn RuleFixture, variant: Variant) -> PathBuf {
    root.join(rule.output_dir()).join(rule.file_name(variant))
}

/// Builds and saves one variant.
pub fn generate_variant(
    rule: &dyn RuleFixture,
    variant: Variant,
    root: &Path,
    ctx: &FixtureContext,
    config: WriterConfig,
) -> Result<GeneratedFixture> {
    let graph = rule.build(variant, ctx)?;
    let path = fixture_path(root, rule, variant);
    persist::save(&graph, &path, config)?;

    info!(
        rule = rule.rule_id(),
        %variant,
        path = %path.display(),
        objects = graph.len(),
        "wrote fixture"
    );
    Ok(GeneratedFixture {
        rule_id: rule.rule_id().to_string(),
        variant,
        path,
        objects: graph.len(),
    })
}

/// Builds and saves both variants of `rule`. Each variant succeeds or fails
/// on its own.
pub fn generate_pair(
    rule: &dyn RuleFixture,
    root: &Path,
    ctx: &FixtureContext,
    config: WriterConfig,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    for variant in Variant::ALL {
        match generate_variant(rule, variant, root, ctx, config) {
            Ok(fixture) => report.generated.push(fixture),
            Err(e) => {
                error!(
                    rule = rule.rule_id(),
                    dir = rule.output_dir(),
                    %variant,
                    error = %e,
                    "fixture generation failed"
                );
                report.failures.push(FixtureFailure {
                    rule_id: rule.rule_id().to_string(),
                    output_dir: rule.output_dir().to_string(),
                    variant,
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Runs every pair in `rules`, continuing past failures.
pub fn generate_all(
    rules: &[Box<dyn RuleFixture>],
    root: &Path,
    ctx: &FixtureContext,
    config: WriterConfig,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    for rule in rules {
        let pair = generate_pair(rule.as_ref(), root, ctx, config);
        report.generated.extend(pair.generated);
        report.failures.extend(pair.failures);
    }
    info!(
        generated = report.generated.len(),
        failed = report.failures.len(),
        "generation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{StaticFontSource, SystemFontSource};
    use crate::rules::{all_rules, CircularRoleMapping, RegistryMismatch};
    use tempfile::TempDir;

    #[test]
    fn test_generate_pair_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let report = generate_pair(
            &CircularRoleMapping,
            dir.path(),
            &FixtureContext::default(),
            WriterConfig::default(),
        );

        assert!(report.is_success());
        assert_eq!(report.generated.len(), 2);
        let base = dir.path().join("structure_ua1_7_1_3");
        assert!(base.join("mh_ua1-7.1-3_fail__A_circular_mapping_exists.pdf").is_file());
        assert!(base.join("mh_ua1-7.1-3_pass__A_circular_mapping_exists.pdf").is_file());
    }

    #[test]
    fn test_failures_are_recorded_without_files() {
        let dir = TempDir::new().unwrap();
        let ctx = FixtureContext::new(SystemFontSource::with_candidates(vec![dir
            .path()
            .join("missing.ttf")]));
        let report = generate_pair(&RegistryMismatch, dir.path(), &ctx, WriterConfig::default());

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].error.contains("missing.ttf"));
        assert!(!dir.path().join("fonts_ua1_7_21_3_1").exists());
    }

    #[test]
    fn test_generate_all_and_manifest() {
        let dir = TempDir::new().unwrap();
        let ctx = FixtureContext::new(StaticFontSource::synthetic());
        let report = generate_all(&all_rules(), dir.path(), &ctx, WriterConfig::default());

        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.generated.len(), 18);

        let manifest = report.write_manifest(dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(manifest).unwrap()).unwrap();
        assert_eq!(json["generated"].as_array().unwrap().len(), 18);
        assert_eq!(json["generated"][0]["variant"], "fail");
        assert_eq!(json["failures"].as_array().unwrap().len(), 0);
    }
}
