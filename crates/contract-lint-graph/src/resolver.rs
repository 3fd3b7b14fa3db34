//! Module resolution: maps file paths and import statements to module identifiers.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::extractor::ImportInfo;
use crate::GraphError;

/// Derives the dotted module identifier of a file.
///
/// `relative` is the file path relative to the analysis root. When the root
/// itself is a package, `package_prefix` carries its name so that absolute
/// imports through that package still resolve.
///
/// # Errors
///
/// Returns an error if a path component is not valid UTF-8 or the path names
/// no module at all (an `__init__.py` directly under an unnamed root).
pub fn module_name(relative: &Path, package_prefix: Option<&str>) -> Result<String, GraphError> {
    let mut parts: Vec<String> = package_prefix.map(str::to_string).into_iter().collect();
    for component in relative.with_extension("").components() {
        if let Component::Normal(segment) = component {
            let segment = segment.to_str().ok_or_else(|| GraphError::NonUtf8Path {
                path: relative.to_path_buf(),
            })?;
            parts.push(segment.to_string());
        }
    }
    if parts.last().is_some_and(|last| last == "__init__") {
        parts.pop();
    }
    if parts.is_empty() {
        return Err(GraphError::EmptyModule {
            path: relative.to_path_buf(),
        });
    }
    Ok(parts.join("."))
}

/// Name of the analysis root when it is itself a package.
///
/// Files under such a root are named through the package, so that
/// `from pkg.core import x` inside `pkg/api.py` resolves when `pkg/` is the root.
#[must_use]
pub fn package_prefix(root: &Path) -> Option<String> {
    if !root.join("__init__.py").is_file() {
        return None;
    }
    let name = root.file_name().map(|n| n.to_os_string()).or_else(|| {
        root.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
    })?;
    name.into_string().ok()
}

/// Returns true for `__init__.py` files.
#[must_use]
pub fn is_package_file(path: &Path) -> bool {
    path.file_stem().is_some_and(|s| s == "__init__")
}

/// Resolves import targets to modules of the analyzed file set.
///
/// Resolution is longest-prefix-match: `import a.b.c` depends on the most
/// specific known module among `a.b.c`, `a.b` and `a`. Targets outside the
/// file set resolve to nothing.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    modules: BTreeSet<String>,
}

impl ModuleResolver {
    /// Builds a resolver over the known module identifiers.
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `module` belongs to the file set.
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// Most specific known module that `dotted` is or lies within.
    #[must_use]
    pub fn longest_prefix(&self, dotted: &str) -> Option<&str> {
        let mut candidate = dotted;
        loop {
            if let Some(found) = self.modules.get(candidate) {
                return Some(found.as_str());
            }
            candidate = &candidate[..candidate.rfind('.')?];
        }
    }

    /// Resolves one import of `importer` to the modules it depends on.
    ///
    /// `importer_is_package` tells whether the importer is an `__init__.py`,
    /// which is its own package for relative imports.
    #[must_use]
    pub fn resolve(
        &self,
        importer: &str,
        importer_is_package: bool,
        import: &ImportInfo,
    ) -> Vec<String> {
        let Some(base) = absolute_target(importer, importer_is_package, import) else {
            return Vec::new();
        };

        let mut targets = BTreeSet::new();
        if import.names.is_empty() {
            targets.extend(self.longest_prefix(&base).map(str::to_string));
        } else {
            for name in &import.names {
                let full = if base.is_empty() {
                    name.clone()
                } else {
                    format!("{base}.{name}")
                };
                let resolved = if self.contains(&full) {
                    Some(full.as_str())
                } else {
                    self.longest_prefix(&base)
                };
                targets.extend(resolved.map(str::to_string));
            }
        }
        targets.into_iter().collect()
    }
}

/// Absolute dotted path an import refers to, before resolution.
fn absolute_target(importer: &str, importer_is_package: bool, import: &ImportInfo) -> Option<String> {
    if import.level == 0 {
        return Some(import.module.clone());
    }

    let mut package: Vec<&str> = importer.split('.').collect();
    if !importer_is_package {
        package.pop();
    }
    for _ in 1..import.level {
        package.pop()?;
    }

    if !import.module.is_empty() {
        package.push(&import.module);
    }
    Some(package.join("."))
}
