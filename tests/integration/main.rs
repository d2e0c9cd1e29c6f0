//! Integration tests for Larder

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn larder() -> Command {
        cargo_bin_cmd!("larder")
    }

    /// A manifest whose origin refuses connections immediately
    fn write_unreachable_manifest(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("larder.toml");
        std::fs::write(
            &path,
            r#"
version = "v1"
origin = "http://127.0.0.1:9"
assets = ["/", "/index.html"]

[network]
timeout_secs = 1
"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn help_displays() {
        larder()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline Asset Cache"));
    }

    #[test]
    fn version_displays() {
        larder()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("larder"));
    }

    #[test]
    fn status_empty_store() {
        let dir = TempDir::new().unwrap();
        larder()
            .args(["status"])
            .env("LARDER_STORE", dir.path().join("store"))
            .env("LARDER_MANIFEST", dir.path().join("larder.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("No generations stored"));
    }

    #[test]
    fn init_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("larder.toml");

        larder()
            .args(["init", "--origin", "https://shop.example"])
            .env("LARDER_MANIFEST", &manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("larder deploy"));

        let content = std::fs::read_to_string(&manifest).unwrap();
        assert!(content.contains("version"));
        assert!(content.contains("https://shop.example"));
    }

    #[test]
    fn init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("larder.toml");
        std::fs::write(&manifest, "version = \"keep\"").unwrap();

        larder()
            .args(["init", "--origin", "https://shop.example"])
            .env("LARDER_MANIFEST", &manifest)
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));

        assert!(std::fs::read_to_string(&manifest).unwrap().contains("keep"));
    }

    #[test]
    fn install_failure_leaves_store_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = write_unreachable_manifest(dir.path());
        let store = dir.path().join("store");

        larder()
            .args(["install"])
            .env("LARDER_MANIFEST", &manifest)
            .env("LARDER_STORE", &store)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install of generation v1 failed"));

        larder()
            .args(["status"])
            .env("LARDER_MANIFEST", &manifest)
            .env("LARDER_STORE", &store)
            .assert()
            .success()
            .stdout(predicate::str::contains("No generations stored"));
    }

    #[test]
    fn activate_without_install_fails() {
        let dir = TempDir::new().unwrap();
        let manifest = write_unreachable_manifest(dir.path());

        larder()
            .args(["activate"])
            .env("LARDER_MANIFEST", &manifest)
            .env("LARDER_STORE", dir.path().join("store"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("never completed install"));
    }

    #[test]
    fn missing_manifest_reports_hint() {
        let dir = TempDir::new().unwrap();

        larder()
            .args(["install"])
            .env("LARDER_MANIFEST", dir.path().join("nope.toml"))
            .env("LARDER_STORE", dir.path().join("store"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Manifest file not found"))
            .stderr(predicate::str::contains("larder init"));
    }

    #[test]
    fn get_with_unreachable_network_fails() {
        let dir = TempDir::new().unwrap();
        let manifest = write_unreachable_manifest(dir.path());

        larder()
            .args(["get", "/index.html"])
            .env("LARDER_MANIFEST", &manifest)
            .env("LARDER_STORE", dir.path().join("store"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network request failed"));
    }
}
