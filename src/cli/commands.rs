//! Command dispatch

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{BatchReport, FileStatus, WalkOutcome, Walkthrough};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::Session;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let base_dir = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(command) => {
            let settings = Settings::load(Some(base_dir.as_path()))?;
            let container = ServiceContainer::new(settings);
            dispatch(command, &container, &base_dir)
        }
        None => Err(CliError::Usage(
            "no command given, try `diagtree --help`".to_string(),
        )),
    }
}

fn dispatch(command: &Commands, container: &ServiceContainer, base_dir: &Path) -> CliResult<()> {
    match command {
        Commands::Validate {
            path,
            strict,
            format,
        } => {
            let target = match path {
                Some(p) => resolve(base_dir, p),
                None => resolve(base_dir, &container.settings.trees_dir),
            };
            let strict = *strict || container.settings.validate.strict;
            let format = format.unwrap_or(container.settings.validate.format);
            cmd_validate(container, &target, strict, format)
        }
        Commands::Show { file } => cmd_show(container, &resolve(base_dir, file)),
        Commands::Walk { file } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            cmd_walk(container, &resolve(base_dir, file), stdin.lock(), stdout.lock())
        }
        Commands::Config { command } => cmd_config(command, container, base_dir),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[instrument(skip(container))]
fn cmd_validate(
    container: &ServiceContainer,
    target: &Path,
    strict: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let report = container.batch_validator().validate_path(target)?;
    match format {
        OutputFormat::Json => output::info(&report.to_json()?),
        OutputFormat::Text => print_report(&report, target),
    }

    if report.is_success(strict) {
        Ok(())
    } else {
        let failing = if strict {
            report
                .files
                .iter()
                .filter(|f| !f.is_valid() || !f.warnings.is_empty())
                .count()
        } else {
            report.invalid_count()
        };
        Err(CliError::ValidationFailed {
            invalid: failing,
            total: report.files.len(),
        })
    }
}

fn print_report(report: &BatchReport, root: &Path) {
    for file in &report.files {
        let shown = file.path.strip_prefix(root).unwrap_or(file.path.as_path());
        let shown = if shown.as_os_str().is_empty() {
            file.path.display()
        } else {
            shown.display()
        };
        match file.status {
            FileStatus::Valid => output::success(&format!("{shown} ({} nodes)", file.node_count)),
            FileStatus::Invalid => output::failure(&format!(
                "{shown} ({} nodes, {} defect(s))",
                file.node_count,
                file.defects.len()
            )),
            FileStatus::Unreadable => output::failure(&format!(
                "{shown}: {}",
                file.error.as_deref().unwrap_or("unreadable")
            )),
        }
        for defect in &file.defects {
            output::defect(defect);
        }
        for warning in &file.warnings {
            output::lint(warning);
        }
    }
    output::header(&format!(
        "{} file(s): {} valid, {} invalid, {} warning(s)",
        report.files.len(),
        report.valid_count(),
        report.invalid_count(),
        report.warning_count()
    ));
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.loader().load_tree(file)?;
    if let Some(title) = tree.title() {
        output::header(title);
    }
    output::info(&tree.to_display_tree());
    Ok(())
}

fn cmd_walk<R: BufRead, W: Write>(
    container: &ServiceContainer,
    file: &Path,
    input: R,
    out: W,
) -> CliResult<()> {
    let tree = container.loader().load_tree(file)?;
    let mut session = Session::new(tree);
    let summary = Walkthrough::new(input, out).run(&mut session)?;
    debug!("walk finished: {:?}", summary);

    match summary.outcome {
        WalkOutcome::Solved(id) => {
            output::success(&format!("Reached {id} after {} step(s)", summary.path.len()))
        }
        WalkOutcome::Quit(id) | WalkOutcome::EndOfInput(id) => {
            output::warning(&format!("Stopped at {id}"))
        }
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, container: &ServiceContainer, base_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::detail(&format!("global: {}", p.display())),
                None => output::detail(&"global: (no config directory)"),
            }
            output::detail(&format!("local:  {}", local_config_path(base_dir).display()));
        }
        ConfigCommands::Init { force } => {
            let path = local_config_path(base_dir);
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}
