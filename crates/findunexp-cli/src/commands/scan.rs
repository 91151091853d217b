//! The scan command: resolve settings, then run the scanner over stdout.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use findunexp_core::{Config, ReportFormat};
use findunexp_go::{BuildContext, GoWorkspace, Reporter, Scanner};

use crate::config_resolver;
use crate::Cli;

/// Runs a full scan with settings from `cli` and the config file.
pub fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let source = config_resolver::locate(&cwd, cli.config.as_deref());
    let config = config_resolver::load(&source)?;

    let ctx = build_context(BuildContext::from_env(), cli, &config);
    let excludes: Vec<&String> = config.scan.exclude.iter().chain(&cli.exclude).collect();
    let workspace = GoWorkspace::new(ctx)
        .with_excludes(excludes)
        .context("Invalid exclude pattern")?;

    let pattern = cli
        .import_pattern
        .as_deref()
        .unwrap_or(&config.scan.import_pattern);
    let format = cli.format.map_or(config.output.format, ReportFormat::from);

    tracing::info!(
        "Searching {} with pattern `{}`",
        workspace
            .context()
            .src_dirs()
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        pattern
    );

    let reporter = Reporter::new(BufWriter::new(io::stdout().lock()), format);
    let mut scanner = match Scanner::new(pattern, workspace, reporter) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    };

    let summary = scanner.run().context("Failed to write report")?;
    scanner
        .into_reporter()
        .into_inner()
        .flush()
        .context("Failed to write report")?;

    if summary.render_failures > 0 {
        tracing::warn!(
            "{} structs could not be reconstructed",
            summary.render_failures
        );
    }
    Ok(())
}

/// Layers config file values, then command-line flags, over `base`.
fn build_context(mut ctx: BuildContext, cli: &Cli, config: &Config) -> BuildContext {
    let scan = &config.scan;

    if let Some(goroot) = cli.goroot.as_ref().or(scan.goroot.as_ref()) {
        ctx.goroot = Some(goroot.clone());
    }
    let roots = if cli.root.is_empty() {
        &scan.roots
    } else {
        &cli.root
    };
    if !roots.is_empty() {
        ctx.gopath.clone_from(roots);
    }
    if let Some(goos) = &scan.goos {
        ctx.goos.clone_from(goos);
    }
    if let Some(goarch) = &scan.goarch {
        ctx.goarch.clone_from(goarch);
    }
    if let Some(cgo) = scan.cgo {
        ctx.cgo_enabled = cgo;
    }
    ctx.tags.extend(scan.tags.iter().chain(&cli.tags).cloned());
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("findunexp").chain(args.iter().copied())).unwrap()
    }

    fn base() -> BuildContext {
        BuildContext {
            goroot: Some(PathBuf::from("/env/goroot")),
            gopath: vec![PathBuf::from("/env/gopath")],
            goos: "linux".into(),
            goarch: "amd64".into(),
            cgo_enabled: true,
            tags: vec![],
        }
    }

    #[test]
    fn environment_used_without_overrides() {
        let ctx = build_context(base(), &cli(&[]), &Config::default());
        assert_eq!(ctx, base());
    }

    #[test]
    fn config_overrides_environment() {
        let config = Config::parse(
            "[scan]\nroots = [\"/cfg\"]\ngoos = \"windows\"\ncgo = false\ntags = [\"a\"]\n",
        )
        .unwrap();
        let ctx = build_context(base(), &cli(&[]), &config);
        assert_eq!(ctx.gopath, [PathBuf::from("/cfg")]);
        assert_eq!(ctx.goos, "windows");
        assert_eq!(ctx.goarch, "amd64");
        assert!(!ctx.cgo_enabled);
        assert_eq!(ctx.tags, ["a"]);
    }

    #[test]
    fn flags_override_config() {
        let config =
            Config::parse("[scan]\nroots = [\"/cfg\"]\ngoroot = \"/cfg/go\"\ntags = [\"a\"]\n")
                .unwrap();
        let args = cli(&["--root", "/flag", "--goroot", "/flag/go", "--tags", "b"]);
        let ctx = build_context(base(), &args, &config);
        assert_eq!(ctx.gopath, [PathBuf::from("/flag")]);
        assert_eq!(ctx.goroot, Some(PathBuf::from("/flag/go")));
        assert_eq!(ctx.tags, ["a", "b"]);
    }
}
