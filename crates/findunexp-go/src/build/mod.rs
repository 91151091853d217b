//! Build context: which roots are searched and which files are buildable.

pub mod constraint;
pub mod header;

use std::path::PathBuf;

use constraint::Expr;
use tracing::debug;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Target platform and search roots for package discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Go installation root; its `src/` is searched first.
    pub goroot: Option<PathBuf>,
    /// GOPATH entries, each holding a `src/` tree.
    pub gopath: Vec<PathBuf>,
    /// Target operating system.
    pub goos: String,
    /// Target architecture.
    pub goarch: String,
    /// Whether cgo files are buildable.
    pub cgo_enabled: bool,
    /// Additional satisfied build tags.
    pub tags: Vec<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            goroot: None,
            gopath: Vec::new(),
            goos: host_os().to_string(),
            goarch: host_arch().to_string(),
            cgo_enabled: true,
            tags: Vec::new(),
        }
    }
}

impl BuildContext {
    /// Builds a context from `GOROOT`, `GOPATH`, `GOOS`, `GOARCH` and
    /// `CGO_ENABLED`, falling back to `~/go` and the host platform.
    #[must_use]
    pub fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let gopath: Vec<PathBuf> = match std::env::var_os("GOPATH") {
            Some(v) if !v.is_empty() => std::env::split_paths(&v).collect(),
            _ => home::home_dir().map(|h| h.join("go")).into_iter().collect(),
        };

        let ctx = Self {
            goroot: env("GOROOT").map(PathBuf::from),
            gopath,
            goos: env("GOOS").unwrap_or_else(|| host_os().to_string()),
            goarch: env("GOARCH").unwrap_or_else(|| host_arch().to_string()),
            cgo_enabled: env("CGO_ENABLED").map_or(true, |v| v != "0"),
            tags: Vec::new(),
        };
        debug!("Build context from environment: {:?}", ctx);
        ctx
    }

    /// `src` directories in search order: GOROOT first, then GOPATH.
    #[must_use]
    pub fn src_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.goroot.iter().map(|r| r.join("src")).collect();
        for root in &self.gopath {
            if self.goroot.as_ref() == Some(root) {
                continue;
            }
            dirs.push(root.join("src"));
        }
        dirs
    }

    /// Whether a single build tag is satisfied.
    #[must_use]
    pub fn match_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "cgo" => self.cgo_enabled,
            "gc" => true,
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ => is_release_tag(tag) || self.tags.iter().any(|t| t == tag),
        }
    }

    /// Applies the `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` file-name rules.
    #[must_use]
    pub fn good_os_arch_file(&self, file_name: &str) -> bool {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let Some(i) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[i..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        let n = parts.len();
        if n >= 2 && is_known_os(parts[n - 2]) && is_known_arch(parts[n - 1]) {
            return self.match_tag(parts[n - 2]) && self.match_tag(parts[n - 1]);
        }
        if n >= 1 && (is_known_os(parts[n - 1]) || is_known_arch(parts[n - 1])) {
            return self.match_tag(parts[n - 1]);
        }
        true
    }

    /// Evaluates a `//go:build` expression. Malformed expressions exclude
    /// the file.
    #[must_use]
    pub fn eval_constraint(&self, expr: &str) -> bool {
        match Expr::parse(expr) {
            Ok(e) => e.eval(&|t| self.match_tag(t)),
            Err(e) => {
                debug!("Ignoring malformed build constraint `{}`: {}", expr, e);
                false
            }
        }
    }

    /// Evaluates legacy `// +build` lines; all lines must hold.
    #[must_use]
    pub fn eval_plus_build(&self, lines: &[&str]) -> bool {
        lines.iter().all(|line| match constraint::parse_plus_build(line) {
            Ok(e) => e.eval(&|t| self.match_tag(t)),
            Err(e) => {
                debug!("Ignoring malformed +build line `{}`: {}", line, e);
                false
            }
        })
    }
}

fn is_known_os(s: &str) -> bool {
    KNOWN_OS.contains(&s)
}

fn is_known_arch(s: &str) -> bool {
    KNOWN_ARCH.contains(&s)
}

/// `go1.N` release tags are all considered satisfied.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
