//! Core analyzer for orchestrating lint execution.
//!
//! The analyzer discovers Python files, parses and classifies each one, and
//! runs every enabled rule through a single tree walk per file. Files are
//! processed on a rayon pool; each task returns its own results.

use crate::config::{Config, RuleConfig};
use crate::context::FileContext;
use crate::rule::{Rule, RuleBox};
use crate::source::{SourceError, SourceFile};
use crate::types::{FileIssue, IssueKind, LintResult, Location, Severity, Violation};
use crate::utils::allowance::{check_allow_with_reason, has_skip_sentinel, AllowCheck};
use crate::utils::nodes;

use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Root path does not exist.
    #[error("Root path does not exist: {0}")]
    MissingRoot(PathBuf),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// File walk error.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result of loading one file.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file parsed cleanly and is classified.
    Parsed(SourceFile),
    /// The file could not be parsed; carries the parse-error violation.
    ParseFailed(Violation),
    /// The file could not be parsed but carries the skip sentinel.
    Skipped,
    /// The file could not be read.
    Unreadable(FileIssue),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or a pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        if !root.exists() {
            return Err(AnalyzerError::MissingRoot(root));
        }

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns: compile(&exclude_patterns)?,
            include_patterns: compile(&include_patterns)?,
            config,
        })
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, AnalyzerError> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(AnalyzerError::from))
        .collect()
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<Pattern>,
    include_patterns: Vec<Pattern>,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory module identifiers are computed from.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            &self.root
        }
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rules.get(rule_name)
    }

    /// Path relative to the base directory.
    #[must_use]
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.base_dir())
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or pool creation fails. Per-file
    /// failures are recorded in the result instead.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let per_file = self.par_map(&files, |path| {
            let mut result = LintResult::new();
            match self.load(path) {
                LoadOutcome::Parsed(source) => {
                    result.violations = self.check_source(&source);
                    result.files_checked = 1;
                }
                LoadOutcome::ParseFailed(violation) => {
                    result.violations.push(violation);
                    result.files_checked = 1;
                }
                LoadOutcome::Skipped => result.files_checked = 1,
                LoadOutcome::Unreadable(issue) => result.issues.push(issue),
            }
            result
        })?;

        let mut result = LintResult::new();
        for file_result in per_file {
            result.extend(file_result);
        }
        sort_violations(&mut result.violations);

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs `task` over every file on the configured worker pool.
    ///
    /// Results are returned in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created.
    pub fn par_map<T, F>(&self, files: &[PathBuf], task: F) -> Result<Vec<T>, AnalyzerError>
    where
        T: Send,
        F: Fn(&Path) -> T + Send + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.analyzer.parallelism.unwrap_or(0))
            .build()?;
        Ok(pool.install(|| files.par_iter().map(|p| task(p)).collect()))
    }

    /// Reads, parses and classifies one file.
    #[must_use]
    pub fn load(&self, path: &Path) -> LoadOutcome {
        debug!("Loading: {}", path.display());
        let relative = self.relative(path);

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path.display(), e);
                return LoadOutcome::Unreadable(FileIssue::new(
                    relative,
                    IssueKind::Io,
                    e.to_string(),
                ));
            }
        };

        let skipped = has_skip_sentinel(&text, &self.config.analyzer.skip_sentinel);
        match SourceFile::parse(path, text) {
            Ok(source) => LoadOutcome::Parsed(source),
            Err(e) if skipped => {
                debug!("Skipping unparsable {} (sentinel): {}", path.display(), e);
                LoadOutcome::Skipped
            }
            Err(SourceError::Syntax {
                line,
                column,
                offset,
                message,
            }) => {
                warn!("Failed to parse {}: {}", path.display(), message);
                LoadOutcome::ParseFailed(Violation::parse_error(
                    Location::new(relative, line, column).with_span(offset, 0),
                    format!("File could not be parsed: {message}"),
                ))
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                LoadOutcome::ParseFailed(Violation::parse_error(
                    Location::new(relative, 1, 1),
                    format!("File could not be parsed: {e}"),
                ))
            }
        }
    }

    /// True if the file opted out with the skip sentinel.
    #[must_use]
    pub fn is_skipped(&self, source: &SourceFile) -> bool {
        has_skip_sentinel(source.text(), &self.config.analyzer.skip_sentinel)
    }

    /// Runs every enabled rule over one classified file.
    ///
    /// The tree is walked once. Each node is handed to the rules registered
    /// for its kind; documentation statements are not descended into.
    #[must_use]
    pub fn check_source(&self, source: &SourceFile) -> Vec<Violation> {
        if self.is_skipped(source) {
            debug!("Skipping {} (sentinel)", source.path().display());
            return Vec::new();
        }

        let ctx = FileContext::new(source, self.base_dir());
        let mut dispatch: HashMap<&str, Vec<&dyn Rule>> = HashMap::new();
        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            for kind in rule.node_kinds() {
                dispatch.entry(*kind).or_default().push(rule.as_ref());
            }
        }

        let mut violations = Vec::new();
        let mut cursor = source.root().walk();
        'walk: loop {
            let node = cursor.node();
            let documentation = nodes::is_docstring(node) && source.in_doc_span(nodes::line(node));

            if !documentation {
                if let Some(rules) = dispatch.get(node.kind()) {
                    for rule in rules {
                        let found = rule.visit(node, &ctx);
                        violations.extend(self.finish(*rule, found, source.text()));
                    }
                }
                if cursor.goto_first_child() {
                    continue;
                }
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        sort_violations(&mut violations);
        violations
    }

    /// Applies severity overrides and allow directives.
    fn finish(&self, rule: &dyn Rule, violations: Vec<Violation>, text: &str) -> Vec<Violation> {
        let override_severity = self.config.rule_severity(rule.name());
        violations
            .into_iter()
            .filter_map(|mut v| {
                if let Some(severity) = override_severity {
                    v.severity = severity;
                }
                match check_allow_with_reason(text, v.location.line, rule.name()) {
                    AllowCheck::Denied => Some(v),
                    AllowCheck::Allowed { reason: Some(_) } => None,
                    AllowCheck::Allowed { reason: None } if rule.requires_allow_reason() => {
                        v.severity = Severity::Warning;
                        v.message = format!(
                            "{} (allow directive for `{}` requires reason=\"...\")",
                            v.message,
                            rule.name()
                        );
                        Some(v)
                    }
                    AllowCheck::Allowed { reason: None } => None,
                }
            })
            .collect()
    }

    /// Discovers all Python files to analyze, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let walker = ignore::WalkBuilder::new(&self.root)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .git_exclude(self.config.analyzer.respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file())
                || path.extension().and_then(|e| e.to_str()) != Some("py")
            {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        let relative_str = relative.to_string_lossy();

        if self
            .config
            .analyzer
            .exclude_substrings
            .iter()
            .any(|s| !s.is_empty() && relative_str.contains(s.as_str()))
        {
            return true;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|p| p.matches_with(&relative_str, MATCH_OPTIONS))
        {
            return true;
        }

        !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| p.matches_with(&relative_str, MATCH_OPTIONS))
    }
}

/// Sorts violations by file, then line, then column.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
            .then_with(|| a.code.cmp(&b.code))
    });
}
