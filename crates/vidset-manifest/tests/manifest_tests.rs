use std::io::Write;

use vidset_manifest::{LinkTable, ManifestError, load_manifest};

fn write_manifest(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_basic_manifest() {
    let file = write_manifest(
        "file_name\tcdn_link\n\
         sav_000.tar\thttps://cdn.example/sav_000.tar\n\
         sav_001.tar\thttps://cdn.example/sav_001.tar\n",
    );

    let table = load_manifest(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.get("sav_000.tar"),
        Some("https://cdn.example/sav_000.tar")
    );
    let names: Vec<_> = table.names().collect();
    assert_eq!(names, vec!["sav_000.tar", "sav_001.tar"]);
}

#[test]
fn test_column_order_does_not_matter() {
    let file = write_manifest(
        "size\tcdn_link\tfile_name\n\
         123\thttps://cdn.example/a.tar\ta.tar\n",
    );

    let table = load_manifest(file.path()).unwrap();
    assert_eq!(table.get("a.tar"), Some("https://cdn.example/a.tar"));
}

#[test]
fn test_missing_column_is_reported() {
    let file = write_manifest("file_name\turl\na.tar\thttps://cdn.example/a.tar\n");

    let err = load_manifest(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ManifestError::MissingColumn { column: "cdn_link" }
    ));
}

#[test]
fn test_blank_file_name_is_malformed() {
    let file = write_manifest("file_name\tcdn_link\n\thttps://cdn.example/a.tar\n");

    let err = load_manifest(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::MalformedRow { .. }));
}

#[test]
fn test_duplicate_names_keep_last() {
    let file = write_manifest(
        "file_name\tcdn_link\n\
         a.tar\thttps://old\n\
         a.tar\thttps://new\n",
    );

    let table = load_manifest(file.path()).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("a.tar"), Some("https://new"));
}

#[test]
fn test_missing_manifest_file() {
    let err = load_manifest("/no/such/manifest.tsv").unwrap_err();
    assert!(matches!(err, ManifestError::NotFound { .. }));
}

#[test]
fn test_save_and_load_preserve_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset_links.json");

    let mut table = LinkTable::new();
    table.insert("z.tar", "https://cdn.example/z.tar");
    table.insert("a.tar", "https://cdn.example/a.tar");
    table.insert("m.tar", "https://cdn.example/m.tar");
    table.save(&path).unwrap();

    let loaded = LinkTable::load(&path).unwrap();
    assert_eq!(loaded, table);
    let names: Vec<_> = loaded.names().collect();
    assert_eq!(names, vec!["z.tar", "a.tar", "m.tar"]);
}

#[test]
fn test_load_rejects_non_json() {
    let file = write_manifest("not json at all");
    let err = LinkTable::load(file.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Json { .. }));
}
