use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tutordeskd::backup;
use tutordeskd::cache::SessionCache;
use tutordeskd::db;
use tutordeskd::facade;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn zip_export_and_import_roundtrip() {
    let workspace = temp_dir("tutordesk-backup-src");
    let workspace2 = temp_dir("tutordesk-backup-dst");
    let out_dir = temp_dir("tutordesk-backup-out");

    {
        let conn = db::open_db(&workspace).expect("open source workspace");
        let mut cache = SessionCache::new();
        facade::add_book(&conn, &mut cache, "Nuovo Espresso 1").expect("seed book");
    }

    let bundle_path = out_dir.join("workspace.tdbackup.zip");
    let export = backup::export_workspace_bundle(&workspace, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.db_sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&export.db_sha256));
    archive
        .by_name("db/tutordesk.sqlite3")
        .expect("database entry in bundle");

    let import = backup::import_workspace_bundle(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);

    let conn = db::open_db(&workspace2).expect("open restored workspace");
    let mut cache = SessionCache::new();
    cache.reload(&conn).expect("reload restored data");
    assert!(cache.libri_disponibili.contains("Nuovo Espresso 1"));

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn import_rejects_files_that_are_not_bundles() {
    let out_dir = temp_dir("tutordesk-backup-bad");
    let workspace = temp_dir("tutordesk-backup-bad-dst");

    let not_a_zip = out_dir.join("garbage.zip");
    std::fs::write(&not_a_zip, b"definitely not a zip archive").expect("write garbage");

    let err = backup::import_workspace_bundle(&not_a_zip, &workspace).unwrap_err();
    assert!(err.to_string().contains("invalid zip archive"));
    assert!(!workspace.join("tutordesk.sqlite3").exists());

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn import_rejects_a_tampered_database_entry() {
    let out_dir = temp_dir("tutordesk-backup-tampered");
    let workspace = temp_dir("tutordesk-backup-tampered-dst");

    // Manifest digest and database bytes deliberately disagree.
    let bundle_path = out_dir.join("tampered.zip");
    let f = File::create(&bundle_path).expect("create bundle");
    let mut zip = zip::ZipWriter::new(f);
    let opts = zip::write::FileOptions::default();
    zip.start_file("manifest.json", opts).expect("manifest");
    zip.write_all(
        format!(
            "{{\"format\":\"{}\",\"dbSha256\":\"{}\"}}",
            backup::BUNDLE_FORMAT_V1,
            "0".repeat(64)
        )
        .as_bytes(),
    )
    .expect("write manifest");
    zip.start_file("db/tutordesk.sqlite3", opts).expect("db entry");
    zip.write_all(b"tampered-bytes").expect("write db entry");
    zip.finish().expect("finish zip");

    let err = backup::import_workspace_bundle(&bundle_path, &workspace).unwrap_err();
    assert!(err.to_string().contains("digest mismatch"));
    assert!(!workspace.join("tutordesk.sqlite3").exists());

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}
