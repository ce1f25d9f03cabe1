//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use device_backup_browser::core::config::Config;
use device_backup_browser::core::errors::DbbError;
use device_backup_browser::core::paths::resolve_backup_dir;
use device_backup_browser::gate::{GateDecision, ManifestProbe, check_load_preconditions};
use device_backup_browser::loader::{
    BackupLoader, LoadError, LoadSinks, LoadedBackup, validate_backup_directory,
};
use device_backup_browser::logger::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use device_backup_browser::manifest::{
    DomainLabel, MANIFEST_DB, MANIFEST_PLIST, RecordKind, load_manifest_db, load_manifest_plist,
};
use device_backup_browser::view::icons::IconTheme;
use device_backup_browser::view::term::{
    TerminalAlerts, TerminalFileList, TerminalStatus, TerminalTreeView,
};

/// Device Backup Browser — inspects and loads device backup directories.
#[derive(Debug, Parser)]
#[command(
    name = "dbb",
    author,
    version,
    about = "Device Backup Browser - Backup Archive Inspector",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Check whether a backup directory is ready to load.
    Check(CheckArgs),
    /// Show device and backup metadata from the manifest.
    Info(InfoArgs),
    /// Load a backup and render its file tree.
    Load(LoadArgs),
    /// Render only the file tree of a backup.
    Tree(TreeArgs),
    /// List raw manifest records.
    Records(RecordsArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct CheckArgs {
    /// Backup directory to check.
    #[arg(value_name = "DIR")]
    directory: String,
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct InfoArgs {
    /// Backup directory to inspect.
    #[arg(value_name = "DIR")]
    directory: String,
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct LoadArgs {
    /// Backup directory to load.
    #[arg(value_name = "DIR")]
    directory: String,
    /// Group top-level tree entries by backup domain.
    #[arg(long)]
    by_domain: bool,
    /// Limit tree rendering depth.
    #[arg(long, value_name = "N")]
    depth: Option<usize>,
    /// Render with the built-in icon glyphs.
    #[arg(long)]
    icons: bool,
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct TreeArgs {
    /// Backup directory to load.
    #[arg(value_name = "DIR")]
    directory: String,
    /// Group top-level tree entries by backup domain.
    #[arg(long)]
    by_domain: bool,
    /// Limit tree rendering depth.
    #[arg(long, value_name = "N")]
    depth: Option<usize>,
    /// Render with the built-in icon glyphs.
    #[arg(long)]
    icons: bool,
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct RecordsArgs {
    /// Backup directory to read records from.
    #[arg(value_name = "DIR")]
    directory: String,
    /// Only records whose domain starts with this prefix.
    #[arg(long, value_name = "PREFIX")]
    domain: Option<String>,
    /// Maximum records to return.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Recompute record identifiers and report mismatches.
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Clone, Args, Serialize, Default)]
struct ConfigArgs {
    #[command(subcommand)]
    #[serde(skip)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the effective config file path.
    Path,
    /// Print the effective configuration as TOML.
    Show,
    /// Check that the configuration loads and validates.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Operation partially succeeded.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Check(args) => run_check(cli, args),
        Command::Info(args) => run_info(cli, args),
        Command::Load(args) => run_load(cli, args),
        Command::Tree(args) => run_tree(cli, args),
        Command::Records(args) => run_records(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ───────────────────────────── check ──────────────────────────────────

fn run_check(cli: &Cli, args: &CheckArgs) -> Result<(), CliError> {
    let dir = resolve_backup_dir(&args.directory);

    if let Err(e) = validate_backup_directory(&dir) {
        match output_mode(cli) {
            OutputMode::Human => eprintln!("Not loadable: {e}"),
            OutputMode::Json => {
                let payload = json!({
                    "command": "check",
                    "directory": dir.to_string_lossy(),
                    "ready": false,
                    "error": e.to_string(),
                    "code": e.code(),
                });
                write_json_line(&payload)?;
            }
        }
        return Err(CliError::User(e.to_string()));
    }

    let decision = check_load_preconditions(&dir, &ManifestProbe)
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    let plist_present = dir.join(MANIFEST_PLIST).is_file();
    let db_present = dir.join(MANIFEST_DB).is_file();

    if let GateDecision::Deny(reason) = decision {
        match output_mode(cli) {
            OutputMode::Human => eprintln!("Not loadable: {}", reason.message()),
            OutputMode::Json => {
                let payload = json!({
                    "command": "check",
                    "directory": dir.to_string_lossy(),
                    "ready": false,
                    "reason": reason.message(),
                    "code": reason.into_error(&dir).code(),
                });
                write_json_line(&payload)?;
            }
        }
        return Err(CliError::User(reason.message().to_string()));
    }

    let ready = plist_present && db_present;
    match output_mode(cli) {
        OutputMode::Human => {
            if ready {
                println!("Backup directory is ready to load.");
            } else {
                println!("Backup directory is not ready to load.");
            }
            println!("  Directory: {}", dir.display());
            println!("  {MANIFEST_PLIST}: {}", presence(plist_present));
            println!("  {MANIFEST_DB}: {}", presence(db_present));
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "check",
                "directory": dir.to_string_lossy(),
                "ready": ready,
                "manifest_plist": plist_present,
                "manifest_db": db_present,
            });
            write_json_line(&payload)?;
        }
    }

    if ready {
        Ok(())
    } else {
        Err(CliError::User("manifest files missing".to_string()))
    }
}

const fn presence(present: bool) -> &'static str {
    if present { "present" } else { "missing" }
}

// ───────────────────────────── info ───────────────────────────────────

fn run_info(cli: &Cli, args: &InfoArgs) -> Result<(), CliError> {
    let dir = resolve_backup_dir(&args.directory);
    validate_backup_directory(&dir).map_err(|e| CliError::User(e.to_string()))?;

    let metadata = load_manifest_plist(&dir).map_err(|e| CliError::Runtime(e.to_string()))?;
    let lockdown = metadata.lockdown.clone().unwrap_or_default();
    let backup_date = metadata.date.clone().map(format_date);

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "Device:    {} ({})",
                or_unknown(lockdown.device_name.as_deref()),
                or_unknown(lockdown.product_type.as_deref()),
            );
            println!(
                "OS:        {} (build {})",
                or_unknown(lockdown.product_version.as_deref()),
                or_unknown(lockdown.build_version.as_deref()),
            );
            println!("Serial:    {}", or_unknown(lockdown.serial_number.as_deref()));
            println!("UDID:      {}", or_unknown(lockdown.unique_device_id.as_deref()));
            println!(
                "Backup:    {} (version {})",
                or_unknown(backup_date.as_deref()),
                or_unknown(metadata.version.as_deref()),
            );
            println!(
                "Encrypted: {}{}",
                if metadata.is_encrypted { "yes" } else { "no" },
                if metadata.was_passcode_set {
                    " (passcode was set)"
                } else {
                    ""
                },
            );
            if let Some(count) = metadata.application_count() {
                println!("Apps:      {count}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "info",
                "directory": dir.to_string_lossy(),
                "device_name": lockdown.device_name,
                "product_type": lockdown.product_type,
                "product_version": lockdown.product_version,
                "build_version": lockdown.build_version,
                "serial_number": lockdown.serial_number,
                "unique_device_id": lockdown.unique_device_id,
                "backup_version": metadata.version,
                "backup_date": backup_date,
                "is_encrypted": metadata.is_encrypted,
                "was_passcode_set": metadata.was_passcode_set,
                "application_count": metadata.application_count(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn format_date(date: plist::Date) -> String {
    let time: SystemTime = date.into();
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

// ───────────────────────────── load ───────────────────────────────────

fn run_load(cli: &Cli, args: &LoadArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let dir = resolve_backup_dir(&args.directory);

    let mut view = TerminalTreeView::new(args.depth);
    let result = match output_mode(cli) {
        OutputMode::Human => {
            let mut list = TerminalFileList::default();
            let mut status = TerminalStatus::new(cli.quiet);
            let mut alerts = TerminalAlerts;
            let mut sinks = LoadSinks {
                tree: Some(&mut view),
                list: Some(&mut list),
                status: Some(&mut status),
                alerts: Some(&mut alerts),
            };
            execute_load(&config, &dir, args.by_domain, args.icons, &mut sinks)
        }
        OutputMode::Json => {
            let mut sinks = LoadSinks {
                tree: Some(&mut view),
                ..LoadSinks::detached()
            };
            execute_load(&config, &dir, args.by_domain, args.icons, &mut sinks)
        }
    };

    match result {
        Ok((loaded, duration_ms)) => {
            match output_mode(cli) {
                OutputMode::Human => {
                    view.render(&mut io::stdout().lock())?;
                    if cli.verbose {
                        let skipped =
                            loaded.stats.skipped_malformed + loaded.stats.skipped_duplicates;
                        println!(
                            "{} records: {} files, {} directories, {} skipped ({duration_ms} ms)",
                            loaded.records.len(),
                            loaded.stats.files,
                            loaded.stats.directories,
                            skipped,
                        );
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "load",
                        "directory": dir.to_string_lossy(),
                        "duration_ms": duration_ms,
                        "records": loaded.records.len(),
                        "stats": serde_json::to_value(&loaded.stats)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            if output_mode(cli) == OutputMode::Json {
                let payload = json!({
                    "command": "load",
                    "directory": dir.to_string_lossy(),
                    "stage": err.stage.to_string(),
                    "code": err.code(),
                    "error": err.source.to_string(),
                });
                write_json_line(&payload)?;
            }
            Err(cli_error_for(&err))
        }
    }
}

// ───────────────────────────── tree ───────────────────────────────────

fn run_tree(cli: &Cli, args: &TreeArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let dir = resolve_backup_dir(&args.directory);

    let mut view = TerminalTreeView::new(args.depth);
    let mut sinks = LoadSinks {
        tree: Some(&mut view),
        ..LoadSinks::detached()
    };
    let result = execute_load(&config, &dir, args.by_domain, args.icons, &mut sinks);

    match result {
        Ok(_) => {
            match output_mode(cli) {
                OutputMode::Human => view.render(&mut io::stdout().lock())?,
                OutputMode::Json => {
                    let payload = json!({
                        "command": "tree",
                        "directory": dir.to_string_lossy(),
                        "nodes": serde_json::to_value(view.nodes())?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            match output_mode(cli) {
                OutputMode::Human => eprintln!("{err}"),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "tree",
                        "directory": dir.to_string_lossy(),
                        "stage": err.stage.to_string(),
                        "code": err.code(),
                        "error": err.source.to_string(),
                    });
                    write_json_line(&payload)?;
                }
            }
            Err(cli_error_for(&err))
        }
    }
}

/// Run the full load pipeline with activity logging, returning the result
/// and the wall-clock duration in milliseconds.
fn execute_load(
    config: &Config,
    dir: &Path,
    by_domain: bool,
    builtin_icons: bool,
    sinks: &mut LoadSinks<'_>,
) -> Result<(LoadedBackup, u64), LoadError> {
    let mut effective = config.clone();
    if by_domain {
        effective.load.group_by_domain = true;
    }
    let mut loader = BackupLoader::new(&effective);
    if builtin_icons {
        loader = loader.with_theme(IconTheme::builtin());
    }

    let mut log = effective
        .logging
        .enabled
        .then(|| JsonlWriter::open(JsonlConfig::from(&effective.logging)));

    if let Some(log) = log.as_mut() {
        let mut entry = LogEntry::new(EventType::LoadStarted, Severity::Info);
        entry.path = Some(dir.to_string_lossy().into_owned());
        log.write_entry(&entry);
    }

    let started = Instant::now();
    let result = loader.load(dir, sinks);
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Some(log) = log.as_mut() {
        match &result {
            Ok(loaded) => {
                let mut entry = LogEntry::new(EventType::LoadCompleted, Severity::Info);
                entry.path = Some(dir.to_string_lossy().into_owned());
                entry.duration_ms = Some(duration_ms);
                entry.files = Some(loaded.stats.files);
                entry.directories = Some(loaded.stats.directories);
                entry.skipped =
                    Some(loaded.stats.skipped_malformed + loaded.stats.skipped_duplicates);
                log.write_entry(&entry);
            }
            Err(err) => {
                let denied = matches!(
                    err.source,
                    DbbError::DecryptionInProgress { .. } | DbbError::DecryptionIncomplete { .. }
                );
                let (event, severity) = if denied {
                    (EventType::GateDenied, Severity::Warning)
                } else {
                    (EventType::LoadFailed, Severity::Error)
                };
                let mut entry = LogEntry::new(event, severity);
                entry.path = Some(dir.to_string_lossy().into_owned());
                entry.stage = Some(err.stage.to_string());
                entry.error_code = Some(err.code().to_string());
                entry.retryable = Some(err.source.is_retryable());
                entry.message = Some(err.source.to_string());
                entry.duration_ms = Some(duration_ms);
                log.write_entry(&entry);
            }
        }
        log.flush();
    }

    result.map(|loaded| (loaded, duration_ms))
}

fn cli_error_for(err: &LoadError) -> CliError {
    match err.source {
        DbbError::DecryptionInProgress { .. }
        | DbbError::DecryptionIncomplete { .. }
        | DbbError::InvalidDirectory { .. } => CliError::User(err.to_string()),
        _ => CliError::Runtime(err.to_string()),
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Config::load(cli.config.as_deref()).map_err(|e| CliError::Runtime(e.to_string()))
}

// ──────────────────────────── records ─────────────────────────────────

fn run_records(cli: &Cli, args: &RecordsArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let dir = resolve_backup_dir(&args.directory);

    validate_backup_directory(&dir).map_err(|e| CliError::User(e.to_string()))?;
    let decision = check_load_preconditions(&dir, &ManifestProbe)
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    if let GateDecision::Deny(reason) = decision {
        return Err(CliError::User(reason.message().to_string()));
    }

    let records = load_manifest_db(&dir, config.load.decode_metadata)
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let filtered: Vec<_> = records
        .iter()
        .filter(|r| {
            args.domain
                .as_deref()
                .is_none_or(|prefix| r.domain.starts_with(prefix))
        })
        .collect();
    let shown = args.limit.unwrap_or(filtered.len()).min(filtered.len());

    if args.verify {
        return verify_records(cli, &filtered);
    }

    match output_mode(cli) {
        OutputMode::Human => {
            // Split the domain so the path column lines up even when app
            // bundle identifiers are in the mix.
            for record in &filtered[..shown] {
                let domain = DomainLabel::parse(&record.domain);
                println!(
                    "{}  {:9}  {:24}  {:28}  {}",
                    record.file_id,
                    record.kind,
                    domain.category(),
                    domain.identifier().unwrap_or("-"),
                    record.relative_path
                );
            }
            if !cli.quiet {
                eprintln!("{} of {} records", shown, filtered.len());
            }
        }
        OutputMode::Json => {
            let records = filtered[..shown]
                .iter()
                .map(|record| {
                    let mut value = serde_json::to_value(record)?;
                    if let Value::Object(fields) = &mut value {
                        let blob = (record.kind == RecordKind::File)
                            .then(|| record.blob_path(&dir))
                            .flatten()
                            .map_or(Value::Null, |p| {
                                Value::String(p.to_string_lossy().into_owned())
                            });
                        fields.insert("blob_path".to_string(), blob);
                    }
                    Ok(value)
                })
                .collect::<Result<Vec<Value>, serde_json::Error>>()?;
            let payload = json!({
                "command": "records",
                "directory": dir.to_string_lossy(),
                "total": filtered.len(),
                "returned": shown,
                "records": records,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn verify_records(
    cli: &Cli,
    records: &[&device_backup_browser::manifest::FileRecord],
) -> Result<(), CliError> {
    let mismatches: Vec<_> = records.iter().filter(|r| !r.id_matches()).collect();

    match output_mode(cli) {
        OutputMode::Human => {
            for record in &mismatches {
                println!(
                    "MISMATCH  {} (expected {})  {}  {}",
                    record.file_id,
                    record.expected_file_id(),
                    record.domain,
                    record.relative_path
                );
            }
            println!(
                "{} records verified, {} mismatches",
                records.len(),
                mismatches.len()
            );
        }
        OutputMode::Json => {
            let bad: Vec<Value> = mismatches
                .iter()
                .map(|r| {
                    json!({
                        "file_id": r.file_id,
                        "expected": r.expected_file_id(),
                        "domain": r.domain,
                        "relative_path": r.relative_path,
                    })
                })
                .collect();
            let payload = json!({
                "command": "records",
                "verified": records.len(),
                "mismatches": bad,
            });
            write_json_line(&payload)?;
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(CliError::Partial(format!(
            "{} of {} record identifiers do not match their domain and path",
            mismatches.len(),
            records.len()
        )))
    }
}

// ──────────────────────────── config ──────────────────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────────────── output ──────────────────────────────────

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("DBB_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        Some("auto") | None => fallback,
        Some(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "dbb",
            "--config",
            "/tmp/dbb.toml",
            "--json",
            "--no-color",
            "-v",
            "check",
            "/tmp/backup",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["dbb", "check", "/tmp/backup", "--json", "--no-color"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_all_subcommands() {
        let cases = [
            vec!["dbb", "check", "/backups/abc"],
            vec!["dbb", "info", "/backups/abc"],
            vec!["dbb", "load", "/backups/abc", "--by-domain", "--depth", "2"],
            vec!["dbb", "load", "/backups/abc", "--icons"],
            vec!["dbb", "tree", "/backups/abc", "--depth", "1"],
            vec!["dbb", "records", "/backups/abc", "--domain", "HomeDomain"],
            vec!["dbb", "records", "/backups/abc", "--limit", "5", "--verify"],
            vec!["dbb", "config", "path"],
            vec!["dbb", "config", "show"],
            vec!["dbb", "config", "validate"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["dbb", "-v", "-q", "check", "/tmp"]).is_err());
    }

    #[test]
    fn load_requires_directory() {
        assert!(Cli::try_parse_from(["dbb", "load"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["dbb", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(
            resolve_output_mode(true, Some("human"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("human"), false),
            OutputMode::Human
        );
        assert_eq!(resolve_output_mode(false, None, true), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
        assert_eq!(
            resolve_output_mode(false, Some("garbage"), true),
            OutputMode::Human
        );
    }

    #[test]
    fn exit_codes_follow_contract() {
        assert_eq!(CliError::User(String::new()).exit_code(), 1);
        assert_eq!(CliError::Runtime(String::new()).exit_code(), 2);
        assert_eq!(CliError::Internal(String::new()).exit_code(), 3);
        assert_eq!(CliError::Partial(String::new()).exit_code(), 4);
    }
}
