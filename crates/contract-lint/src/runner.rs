//! Run driver shared by the CLI and library users.
//!
//! One run discovers the files, processes each of them on the analyzer's
//! worker pool and merges the per-file results after the join. The import
//! graph is built and searched for cycles only once every file is done.

use std::path::{Path, PathBuf};

use contract_lint_core::{
    Analyzer, AnalyzerError, Config, ConfigError, FileIssue, IssueKind, LoadOutcome, RuleBox,
    RunMode, RunReport, Transformation, Violation,
};
use contract_lint_fix::{fix_source, write_with_backup, Proposer};
use contract_lint_graph::{
    analyze_imports, is_package_file, module_name, package_prefix, LanguageExtractor,
    ModuleImports, PythonExtractor,
};
use contract_lint_rules::Preset;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Config file names to search for, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["contract-lint.toml", ".contract-lint.toml"];

/// Errors that stop a run before any file is processed.
#[derive(Debug, Error)]
pub enum RunError {
    /// Discovery or pool setup failed.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// The configuration could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `preset` names no known preset.
    #[error("unknown preset `{0}`. Valid presets: recommended, strict, minimal")]
    UnknownPreset(String),

    /// A rule selected by name or code does not exist.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),
}

/// Per-invocation overrides on top of the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Rule names or codes to run instead of the preset. Empty keeps the preset.
    pub rules: Vec<String>,
    /// Extra exclude globs.
    pub excludes: Vec<String>,
}

/// Finds the first config candidate in `root`.
#[must_use]
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Loads the explicit config file, else the first candidate in `root`, else
/// the defaults.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, RunError> {
    let path = match explicit {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(root.join(path)),
        None => find_config(root),
    };
    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            Ok(Config::from_file(&path)?)
        }
        None => Ok(Config::default()),
    }
}

/// Resolves the configured preset, `recommended` when unset.
///
/// # Errors
///
/// Returns an error for an unknown preset name.
pub fn resolve_preset(config: &Config) -> Result<Preset, RunError> {
    let name = config.preset.as_deref().unwrap_or("recommended");
    Preset::from_name(name).ok_or_else(|| RunError::UnknownPreset(name.to_string()))
}

/// Builds the analyzer for `root` with the preset's rules, or the rules
/// selected in `options`.
///
/// # Errors
///
/// Returns an error for an unknown preset or rule, or if the analyzer
/// cannot be built.
pub fn build_analyzer(
    root: &Path,
    config: Config,
    options: &RunOptions,
) -> Result<Analyzer, RunError> {
    let rules = select_rules(&config, &options.rules)?;
    let analyzer = Analyzer::builder()
        .root(root)
        .rules(rules)
        .excludes(options.excludes.iter().cloned())
        .config(config)
        .build()?;
    Ok(analyzer)
}

fn select_rules(config: &Config, selected: &[String]) -> Result<Vec<RuleBox>, RunError> {
    if selected.is_empty() {
        return Ok(resolve_preset(config)?.configured_rules(config));
    }
    let mut available = Preset::Strict.configured_rules(config);
    for wanted in selected {
        if !available
            .iter()
            .any(|r| r.name() == wanted || r.code() == wanted)
        {
            return Err(RunError::UnknownRule(wanted.clone()));
        }
    }
    available.retain(|r| {
        selected
            .iter()
            .any(|wanted| r.name() == wanted || r.code() == wanted)
    });
    Ok(available)
}

/// Everything one file contributed to the run.
#[derive(Default)]
struct FileOutcome {
    checked: bool,
    violations: Vec<Violation>,
    transformations: Vec<Transformation>,
    issues: Vec<FileIssue>,
    modified: Option<PathBuf>,
    imports: Option<ModuleImports>,
    pure_interfaces: usize,
}

/// Runs one mode over `root`.
///
/// Per-file failures are recorded in the report and never stop the run.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, discovery fails or the
/// worker pool cannot be created.
pub fn run(
    mode: RunMode,
    root: &Path,
    config: Config,
    options: &RunOptions,
) -> Result<RunReport, RunError> {
    let fail_on = config.fail_on_severity()?;
    let include_type_checking = config.graph.include_type_checking;
    let proposer = Proposer::from_config(&config);
    let analyzer = build_analyzer(root, config, options)?;

    info!("Starting {} at {}", mode, analyzer.root().display());
    let files = analyzer.discover_files()?;
    info!("Found {} files", files.len());

    let prefix = package_prefix(analyzer.base_dir());
    let driver = FileDriver {
        analyzer: &analyzer,
        proposer: &proposer,
        prefix: prefix.as_deref(),
        mode,
    };
    let outcomes = analyzer.par_map(&files, |path| driver.process(path))?;

    let mut report = RunReport::new(mode).with_fail_on(fail_on);
    let mut modules = Vec::new();
    for outcome in outcomes {
        report.files_checked += usize::from(outcome.checked);
        report.violations.extend(outcome.violations);
        report.transformations.extend(outcome.transformations);
        report.issues.extend(outcome.issues);
        report.files_modified.extend(outcome.modified);
        report.pure_interfaces += outcome.pure_interfaces;
        modules.extend(outcome.imports);
    }
    contract_lint_core::sort_violations(&mut report.violations);

    if mode == RunMode::AnalyzeImports {
        let analysis = analyze_imports(&modules, include_type_checking);
        info!(
            "Import graph: {} modules, {} edges, {} cycles",
            analysis.graph.module_count(),
            analysis.graph.edge_count(),
            analysis.cycles.len()
        );
        report.cycles = analysis.cycles;
    }

    info!(
        "{} complete: {} violations, {} transformations in {} files",
        mode,
        report.violations.len(),
        report.transformations.len(),
        report.files_checked
    );
    Ok(report)
}

/// Per-file pipeline shared by every worker.
struct FileDriver<'a> {
    analyzer: &'a Analyzer,
    proposer: &'a Proposer,
    prefix: Option<&'a str>,
    mode: RunMode,
}

impl FileDriver<'_> {
    fn process(&self, path: &Path) -> FileOutcome {
        let relative = self.analyzer.relative(path);
        let mut outcome = FileOutcome::default();

        let source = match self.analyzer.load(path) {
            LoadOutcome::Parsed(source) => source,
            LoadOutcome::ParseFailed(violation) => {
                outcome.checked = true;
                outcome.violations.push(violation);
                if self.mode == RunMode::AnalyzeImports {
                    outcome.imports = self.module(&relative, Vec::new());
                }
                return outcome;
            }
            LoadOutcome::Skipped => {
                debug!("Not checking {} (sentinel)", relative.display());
                outcome.checked = true;
                if self.mode == RunMode::AnalyzeImports {
                    outcome.imports = self.module(&relative, Vec::new());
                }
                return outcome;
            }
            LoadOutcome::Unreadable(issue) => {
                outcome.issues.push(issue);
                return outcome;
            }
        };
        outcome.checked = true;

        match self.mode {
            RunMode::Scan => {
                outcome.violations = self.analyzer.check_source(&source);
                outcome.pure_interfaces = source.pure_interface_count();
            }
            RunMode::FixDryRun | RunMode::FixApply => {
                if self.analyzer.is_skipped(&source) {
                    debug!("Not rewriting {} (sentinel)", relative.display());
                    return outcome;
                }
                let fix = match fix_source(self.proposer, &source, &relative) {
                    Ok(fix) => fix,
                    Err(e) => {
                        warn!("Leaving {} untouched: {}", relative.display(), e);
                        outcome
                            .issues
                            .push(FileIssue::new(relative, IssueKind::Transform, e.to_string()));
                        return outcome;
                    }
                };
                if self.mode == RunMode::FixApply {
                    if let Some(text) = &fix.rewritten {
                        let suffix = &self.analyzer.config().fix.backup_suffix;
                        match write_with_backup(path, text, suffix) {
                            Ok(_) => outcome.modified = Some(relative.clone()),
                            Err(e) => {
                                warn!("Failed to write {}: {}", relative.display(), e);
                                outcome.issues.push(FileIssue::new(
                                    relative,
                                    IssueKind::Write,
                                    e.to_string(),
                                ));
                                return outcome;
                            }
                        }
                    }
                }
                outcome.transformations = fix.transformations;
            }
            RunMode::AnalyzeImports => {
                let imports = PythonExtractor::new().imports(source.root(), source.text());
                outcome.imports = self.module(&relative, imports);
            }
        }
        outcome
    }

    /// Maps a file onto its graph node; files without a module name are left out.
    fn module(
        &self,
        relative: &Path,
        imports: Vec<contract_lint_graph::ImportInfo>,
    ) -> Option<ModuleImports> {
        match module_name(relative, self.prefix) {
            Ok(module) => Some(ModuleImports::new(
                module,
                is_package_file(relative),
                imports,
            )),
            Err(e) => {
                warn!("Leaving {} out of the import graph: {}", relative.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_preset_defaults_to_recommended() {
        let config = Config::default();
        assert_eq!(resolve_preset(&config).ok(), Some(Preset::Recommended));
    }

    #[test]
    fn resolve_preset_from_config() {
        let mut config = Config::default();
        config.preset = Some("strict".to_string());
        assert_eq!(resolve_preset(&config).ok(), Some(Preset::Strict));
    }

    #[test]
    fn resolve_preset_rejects_unknown() {
        let mut config = Config::default();
        config.preset = Some("lenient".to_string());
        assert!(matches!(
            resolve_preset(&config),
            Err(RunError::UnknownPreset(name)) if name == "lenient"
        ));
    }

    #[test]
    fn select_rules_by_name_or_code() {
        let config = Config::default();
        let rules = select_rules(
            &config,
            &["forbidden-import".to_string(), "CL007".to_string()],
        )
        .expect("known rules");
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["forbidden-import", "vague-naming"]);
    }

    #[test]
    fn select_rules_rejects_unknown() {
        let config = Config::default();
        assert!(matches!(
            select_rules(&config, &["no-such-rule".to_string()]),
            Err(RunError::UnknownRule(_))
        ));
    }

    #[test]
    fn load_config_prefers_first_candidate() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join(".contract-lint.toml"), "preset = \"minimal\"\n")
            .expect("Failed to write");
        std::fs::write(dir.path().join("contract-lint.toml"), "preset = \"strict\"\n")
            .expect("Failed to write");

        let config = load_config(dir.path(), None).expect("config");
        assert_eq!(config.preset.as_deref(), Some("strict"));
    }

    #[test]
    fn load_config_defaults_without_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = load_config(dir.path(), None).expect("config");
        assert!(config.preset.is_none());
    }

    #[test]
    fn load_config_explicit_relative_to_root() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("lint.toml"), "fail_on = \"warning\"\n")
            .expect("Failed to write");
        let config = load_config(dir.path(), Some(Path::new("lint.toml"))).expect("config");
        assert_eq!(config.fail_on.as_deref(), Some("warning"));
    }
}
