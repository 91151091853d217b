//! Filesystem package discovery over GOROOT and GOPATH `src` trees.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use findunexp_core::{ImportPath, PackageDescriptor, PackageSource, ResolveError};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::build::header::FileHeader;
use crate::build::{constraint, BuildContext};

/// Discovers packages below the `src` directories of a [`BuildContext`].
pub struct GoWorkspace {
    ctx: BuildContext,
    exclude: Vec<glob::Pattern>,
}

impl GoWorkspace {
    /// Creates a workspace for `ctx`.
    #[must_use]
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            ctx,
            exclude: Vec::new(),
        }
    }

    /// Leaves import paths matching any of `patterns` out of discovery.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Result<Self, glob::PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for p in patterns {
            self.exclude.push(glob::Pattern::new(p.as_ref())?);
        }
        Ok(self)
    }

    /// The build context in use.
    #[must_use]
    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(path))
    }

    fn resolve_dir(&self, path: &ImportPath, dir: &Path) -> Result<PackageDescriptor, ResolveError> {
        let io_err = |source| ResolveError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".go") || name.starts_with(['_', '.']) {
                continue;
            }
            if entry.file_type().map_err(io_err)?.is_file() {
                names.push(name);
            }
        }
        names.sort();

        let mut pkg = PackageDescriptor::new(path.clone(), dir);
        let mut name_source: Option<String> = None;
        let mut ignored = 0usize;

        for name in names {
            if !self.ctx.good_os_arch_file(&name) {
                debug!("{}: {} excluded by file name", path, name);
                ignored += 1;
                continue;
            }

            let file = dir.join(&name);
            let bytes = std::fs::read(&file).map_err(|source| ResolveError::Io {
                path: file.clone(),
                source,
            })?;
            let source = String::from_utf8_lossy(&bytes);

            if let Some(expr) = constraint::find_go_build(&source) {
                if !self.ctx.eval_constraint(expr) {
                    debug!("{}: {} excluded by //go:build {}", path, name, expr);
                    ignored += 1;
                    continue;
                }
            } else {
                let lines = constraint::find_plus_build(&source);
                if !self.ctx.eval_plus_build(&lines) {
                    debug!("{}: {} excluded by +build {:?}", path, name, lines);
                    ignored += 1;
                    continue;
                }
            }

            let header = FileHeader::read(&source);
            if header.package.as_deref() == Some("documentation") {
                debug!("{}: {} is a documentation file", path, name);
                ignored += 1;
                continue;
            }
            let is_test = name.ends_with("_test.go");
            let mut pkg_name = header.package.clone();
            let mut is_xtest = false;
            if is_test {
                if let Some(n) = &pkg_name {
                    if let Some(base) = n.strip_suffix("_test") {
                        if pkg.name != *n {
                            is_xtest = true;
                            pkg_name = Some(base.to_string());
                        }
                    }
                }
            }

            if let Some(n) = pkg_name {
                match &name_source {
                    None => {
                        pkg.name = n;
                        name_source = Some(name.clone());
                    }
                    Some(first_file) if pkg.name != n => {
                        return Err(ResolveError::MultiplePackages {
                            dir: dir.to_path_buf(),
                            first: pkg.name.clone(),
                            first_file: first_file.clone(),
                            second: n,
                            second_file: name,
                        });
                    }
                    Some(_) => {}
                }
            }

            if is_xtest {
                pkg.xtest_go_files.push(name);
            } else if is_test {
                pkg.test_go_files.push(name);
            } else if header.imports_c() {
                if self.ctx.cgo_enabled {
                    pkg.cgo_files.push(name);
                } else {
                    ignored += 1;
                }
            } else {
                pkg.go_files.push(name);
            }
        }

        if pkg.file_count() == 0 {
            return Err(ResolveError::NoSources {
                dir: dir.to_path_buf(),
                excluded: ignored > 0,
            });
        }
        Ok(pkg)
    }
}

/// Converts a directory below `src` to its import path.
fn import_path_of(src: &Path, dir: &Path) -> Option<ImportPath> {
    let rel = dir.strip_prefix(src).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(ImportPath::new(parts.join("/")))
}

fn skip_dir(name: &str) -> bool {
    name.starts_with(['.', '_']) || name == "testdata"
}

impl PackageSource for GoWorkspace {
    fn for_each_package(&self, visit: &mut dyn FnMut(ImportPath, Option<ResolveError>)) {
        let mut seen: HashSet<ImportPath> = HashSet::new();

        for src in self.ctx.src_dirs() {
            if !src.is_dir() {
                debug!("Skipping missing source root {}", src.display());
                continue;
            }
            debug!("Walking {}", src.display());

            let walker = WalkDir::new(&src)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    e.file_type().is_dir() && !skip_dir(&e.file_name().to_string_lossy())
                });

            for entry in walker {
                match entry {
                    Ok(entry) => {
                        let Some(path) = import_path_of(&src, entry.path()) else {
                            continue;
                        };
                        if self.is_excluded(path.as_str()) {
                            debug!("Excluding {}", path);
                            continue;
                        }
                        if seen.insert(path.clone()) {
                            visit(path, None);
                        }
                    }
                    Err(e) => {
                        let Some(dir) = e.path().map(Path::to_path_buf) else {
                            warn!("Walk error under {}: {}", src.display(), e);
                            continue;
                        };
                        let Some(path) = import_path_of(&src, &dir) else {
                            warn!("Cannot read {}: {}", dir.display(), e);
                            continue;
                        };
                        if self.is_excluded(path.as_str()) || !seen.insert(path.clone()) {
                            continue;
                        }
                        let message = e.to_string();
                        let source = e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other(message));
                        visit(path, Some(ResolveError::Io { path: dir, source }));
                    }
                }
            }
        }
    }

    fn resolve(&self, path: &ImportPath) -> Result<PackageDescriptor, ResolveError> {
        let mut searched = Vec::new();
        for src in self.ctx.src_dirs() {
            let dir = path
                .as_str()
                .split('/')
                .fold(PathBuf::from(&src), |acc, part| acc.join(part));
            if dir.is_dir() {
                return self.resolve_dir(path, &dir);
            }
            searched.push(dir);
        }
        Err(ResolveError::NotFound {
            path: path.to_string(),
            searched,
        })
    }
}
