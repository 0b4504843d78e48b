//! Upload gateway tests
//! Per-identity isolation, sanitization and the abort-on-failure policy

use admin_gate::auth::VerifiedIdentity;
use admin_gate::error::Error;
use admin_gate::upload::{IncomingFile, UploadGateway};
use std::fs;
use tempfile::TempDir;

fn identity(name: &str) -> VerifiedIdentity {
    VerifiedIdentity(name.to_string())
}

#[tokio::test]
async fn test_identities_do_not_share_files() {
    let temp = TempDir::new().unwrap();
    let gateway = UploadGateway::new(temp.path());

    let alice = gateway
        .upload(&identity("alice"), vec![IncomingFile::new("cat.png", &b"alice"[..])])
        .await
        .unwrap();
    let bob = gateway
        .upload(&identity("bob"), vec![IncomingFile::new("cat.png", &b"bob"[..])])
        .await
        .unwrap();

    assert_eq!(alice, vec!["/images/alice/cat.png"]);
    assert_eq!(bob, vec!["/images/bob/cat.png"]);
    assert_eq!(fs::read(gateway.storage_path("alice", "cat.png")).unwrap(), b"alice");
    assert_eq!(fs::read(gateway.storage_path("bob", "cat.png")).unwrap(), b"bob");
}

#[tokio::test]
async fn test_same_name_overwrites_without_leftovers() {
    let temp = TempDir::new().unwrap();
    let gateway = UploadGateway::new(temp.path());

    for content in [&b"first version"[..], &b"second"[..]] {
        gateway
            .upload(&identity("alice"), vec![IncomingFile::new("cat.png", content)])
            .await
            .unwrap();
    }

    assert_eq!(fs::read(gateway.storage_path("alice", "cat.png")).unwrap(), b"second");
    // Only the final file remains, no temporary files
    let entries: Vec<_> = fs::read_dir(temp.path().join("alice")).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_storage_and_retrieval_paths_mirror_each_other() {
    let temp = TempDir::new().unwrap();
    let gateway = UploadGateway::new(temp.path());

    assert_eq!(
        gateway.storage_path("alice", "cat.png"),
        temp.path().join("alice").join("cat.png")
    );
    assert_eq!(
        UploadGateway::retrieval_path("alice", "cat.png"),
        "/images/alice/cat.png"
    );
    assert_eq!(
        UploadGateway::retrieval_path("alice", "my photo?.png"),
        "/images/alice/my%20photo%3F.png"
    );
    assert_eq!(
        UploadGateway::retrieval_path("alice", "sale%2Fcat.png"),
        "/images/alice/sale%252Fcat.png"
    );
}

#[tokio::test]
async fn test_windows_style_path_is_stripped() {
    let temp = TempDir::new().unwrap();
    let gateway = UploadGateway::new(temp.path());

    let urls = gateway
        .upload(
            &identity("alice"),
            vec![IncomingFile::new("..\\..\\bob\\cat.png", &b"x"[..])],
        )
        .await
        .unwrap();

    assert_eq!(urls, vec!["/images/alice/cat.png"]);
}

#[tokio::test]
async fn test_unwritable_root_reports_failed_file() {
    let temp = TempDir::new().unwrap();
    // The upload root is a regular file, so no identity directory can be created
    let root = temp.path().join("not-a-dir");
    fs::write(&root, b"").unwrap();
    let gateway = UploadGateway::new(&root);

    let result = gateway
        .upload(
            &identity("alice"),
            vec![
                IncomingFile::new("cat.png", &b"1"[..]),
                IncomingFile::new("dog.png", &b"2"[..]),
            ],
        )
        .await;

    match result {
        Err(Error::Upload {
            filename, stored, ..
        }) => {
            assert_eq!(filename, "cat.png");
            assert!(stored.is_empty());
        }
        other => panic!("Expected Upload error, got {:?}", other),
    }
}
