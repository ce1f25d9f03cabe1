//! Shared fixtures and CLI harness for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use device_backup_browser::manifest::expected_file_id;

// ───────────────────────── backup fixtures ────────────────────────────

/// One row of the synthetic manifest database.
pub struct RecordFixture {
    /// Stored file identifier; `None` derives the canonical digest.
    pub file_id: Option<String>,
    pub domain: String,
    pub relative_path: String,
    pub flags: i64,
}

pub fn file_row(domain: &str, relative_path: &str) -> RecordFixture {
    RecordFixture {
        file_id: None,
        domain: domain.to_string(),
        relative_path: relative_path.to_string(),
        flags: 1,
    }
}

pub fn dir_row(domain: &str, relative_path: &str) -> RecordFixture {
    RecordFixture {
        file_id: None,
        domain: domain.to_string(),
        relative_path: relative_path.to_string(),
        flags: 2,
    }
}

pub fn raw_row(file_id: &str, domain: &str, relative_path: &str, flags: i64) -> RecordFixture {
    RecordFixture {
        file_id: Some(file_id.to_string()),
        domain: domain.to_string(),
        relative_path: relative_path.to_string(),
        flags,
    }
}

/// Write a binary `Manifest.plist` with a fixed device identity.
pub fn write_manifest_plist(dir: &Path, encrypted: bool) {
    let mut lockdown = plist::Dictionary::new();
    lockdown.insert(
        "DeviceName".to_string(),
        plist::Value::String("Integration iPhone".to_string()),
    );
    lockdown.insert(
        "ProductType".to_string(),
        plist::Value::String("iPhone14,2".to_string()),
    );
    lockdown.insert(
        "ProductVersion".to_string(),
        plist::Value::String("17.4".to_string()),
    );
    lockdown.insert(
        "BuildVersion".to_string(),
        plist::Value::String("21E219".to_string()),
    );
    lockdown.insert(
        "SerialNumber".to_string(),
        plist::Value::String("F2LX0000TEST".to_string()),
    );
    lockdown.insert(
        "UniqueDeviceID".to_string(),
        plist::Value::String("00008110-000000000000001E".to_string()),
    );

    let backup_date = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let mut root = plist::Dictionary::new();
    root.insert(
        "Version".to_string(),
        plist::Value::String("10.1".to_string()),
    );
    root.insert("Date".to_string(), plist::Value::Date(backup_date.into()));
    root.insert("IsEncrypted".to_string(), plist::Value::Boolean(encrypted));
    root.insert(
        "WasPasscodeSet".to_string(),
        plist::Value::Boolean(encrypted),
    );
    root.insert("Lockdown".to_string(), plist::Value::Dictionary(lockdown));

    plist::Value::Dictionary(root)
        .to_file_binary(dir.join("Manifest.plist"))
        .expect("write Manifest.plist");
}

/// Write a `Manifest.db` containing `rows`. Blob columns stay NULL; record
/// metadata decoding tolerates that.
pub fn write_manifest_db(dir: &Path, rows: &[RecordFixture]) {
    let conn = Connection::open(dir.join("Manifest.db")).expect("create Manifest.db");
    conn.execute_batch(
        "CREATE TABLE Files (
            fileID TEXT PRIMARY KEY,
            domain TEXT,
            relativePath TEXT,
            flags INTEGER,
            file BLOB
        );",
    )
    .expect("create Files table");

    for row in rows {
        let file_id = row
            .file_id
            .clone()
            .unwrap_or_else(|| expected_file_id(&row.domain, &row.relative_path));
        conn.execute(
            "INSERT INTO Files (fileID, domain, relativePath, flags, file)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![file_id, row.domain, row.relative_path, row.flags],
        )
        .expect("insert manifest row");
    }
}

/// A small unencrypted backup with a two-branch tree.
pub fn standard_backup(dir: &Path) {
    write_manifest_plist(dir, false);
    write_manifest_db(
        dir,
        &[
            dir_row("HomeDomain", "Library"),
            dir_row("HomeDomain", "Library/SMS"),
            file_row("HomeDomain", "Library/SMS/sms.db"),
            file_row("MediaDomain", "Media/IMG_0001.jpg"),
        ],
    );
}

pub fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").expect("create marker file");
}

// ───────────────────────── CLI harness ────────────────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

impl CmdResult {
    /// Parse stdout as a single JSON payload line.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim()).unwrap_or_else(|e| {
            panic!(
                "stdout is not valid JSON ({e}); log: {}",
                self.log_path.display()
            )
        })
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_dbb") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "dbb.exe" } else { "dbb" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve dbb binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_env(case_name, args, &[])
}

/// Run `dbb` with `args` and extra environment variables, capturing output
/// to a per-case log file.
///
/// `HOME` points at a per-case scratch directory so config and activity-log
/// paths never touch the real home, and activity logging defaults to off;
/// pass `DBB_LOGGING_ENABLED=1` in `envs` to opt back in.
pub fn run_cli_case_env(case_name: &str, args: &[&str], envs: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("dbb-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let case = format!("{}-{}", sanitize(case_name), now_millis());
    let log_path = root.join(format!("{case}.log"));
    let home = root.join(format!("{case}-home"));
    fs::create_dir_all(&home).expect("create temp test home dir");
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", &home)
        .env("DBB_LOGGING_ENABLED", "0")
        .env("RUST_BACKTRACE", "1");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("execute dbb command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
