//! Build a tiny synthetic backup, run it through the load pipeline, and
//! render the resulting tree.
//!
//! Usage:
//!   cargo run --example load_backup [-- /path/to/backup]
//!
//! Without an argument a throwaway backup directory is synthesized first;
//! with one, that backup is loaded instead.

use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use device_backup_browser::core::config::Config;
use device_backup_browser::loader::{BackupLoader, LoadSinks};
use device_backup_browser::manifest::expected_file_id;
use device_backup_browser::view::icons::IconTheme;
use device_backup_browser::view::term::{TerminalAlerts, TerminalStatus, TerminalTreeView};

fn main() {
    // The scratch guard keeps a synthesized backup alive until exit.
    let (dir, _scratch) = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => (path, None),
        None => {
            let scratch = tempfile::tempdir().expect("create scratch dir");
            synthesize_backup(scratch.path());
            println!("Synthesized backup at {}", scratch.path().display());
            (scratch.path().to_path_buf(), Some(scratch))
        }
    };

    let config = Config::default();
    let loader = BackupLoader::new(&config).with_theme(IconTheme::builtin());

    let mut view = TerminalTreeView::new(None);
    let mut status = TerminalStatus::new(false);
    let mut alerts = TerminalAlerts;
    let mut sinks = LoadSinks {
        tree: Some(&mut view),
        list: None,
        status: Some(&mut status),
        alerts: Some(&mut alerts),
    };

    match loader.load(&dir, &mut sinks) {
        Ok(loaded) => {
            let mut out = io::stdout().lock();
            view.render(&mut out).expect("render tree");
            println!(
                "{} records loaded: {} files, {} directories",
                loaded.records.len(),
                loaded.stats.files,
                loaded.stats.directories
            );
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn synthesize_backup(dir: &Path) {
    let mut lockdown = plist::Dictionary::new();
    lockdown.insert(
        "DeviceName".to_string(),
        plist::Value::String("Demo iPhone".to_string()),
    );
    lockdown.insert(
        "ProductType".to_string(),
        plist::Value::String("iPhone14,2".to_string()),
    );

    let mut manifest = plist::Dictionary::new();
    manifest.insert(
        "Version".to_string(),
        plist::Value::String("10.1".to_string()),
    );
    manifest.insert("IsEncrypted".to_string(), plist::Value::Boolean(false));
    manifest.insert("Lockdown".to_string(), plist::Value::Dictionary(lockdown));
    plist::Value::Dictionary(manifest)
        .to_file_binary(dir.join("Manifest.plist"))
        .expect("write Manifest.plist");

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

    let rows: [(&str, &str, i64); 6] = [
        ("HomeDomain", "Library", 2),
        ("HomeDomain", "Library/SMS", 2),
        ("HomeDomain", "Library/SMS/sms.db", 1),
        ("HomeDomain", "Library/Preferences/com.apple.mobilephone.plist", 1),
        ("CameraRollDomain", "Media/DCIM/100APPLE/IMG_0001.JPG", 1),
        ("CameraRollDomain", "Media/DCIM/100APPLE/IMG_0002.JPG", 1),
    ];
    for (domain, relative_path, flags) in rows {
        conn.execute(
            "INSERT INTO Files (fileID, domain, relativePath, flags, file)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![expected_file_id(domain, relative_path), domain, relative_path, flags],
        )
        .expect("insert manifest row");
    }
}
