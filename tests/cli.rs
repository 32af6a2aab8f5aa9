use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CREDENTIAL_VARS: &[&str] = &[
    "GALAXY_SERVER_URL",
    "GALAXY_SERVER_TOKEN",
    "ANSIBLE_GALAXY_SERVER_GALAXY_URL",
    "ANSIBLE_GALAXY_SERVER_VALIDATED_TOKEN",
];

/// Binary running in `workdir` with no credentials and no global config
fn publisher(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("collection-publisher").expect("Binary exists");
    cmd.current_dir(workdir).env("HOME", workdir);
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("COLLECTIONS_ROOT");
    cmd.env_remove("GALAXY_COMMAND_TIMEOUT");
    cmd
}

fn write_collection(root: &Path, namespace: &str, name: &str, tags: &[&str]) {
    let dir = root.join(namespace).join(name);
    fs::create_dir_all(&dir).unwrap();
    let manifest = serde_json::json!({
        "collection_info": {
            "namespace": namespace,
            "name": name,
            "version": "1.0.0",
            "authors": ["Ops Team <ops@example.com>"],
            "tags": tags,
            "license": ["GPL-3.0-or-later"],
            "license_file": null
        },
        "format": 1
    });
    fs::write(dir.join("MANIFEST.json"), manifest.to_string()).unwrap();
}

#[test]
fn no_selection_prints_usage_and_exits_1() {
    let workdir = TempDir::new().unwrap();

    publisher(workdir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn conflicting_selection_exits_1() {
    let workdir = TempDir::new().unwrap();

    publisher(workdir.path())
        .args(["--all", "--namespace", "acme"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn malformed_target_exits_1() {
    let workdir = TempDir::new().unwrap();

    publisher(workdir.path())
        .args(["--target", "acme"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("expected <namespace>.<name>"));
}

#[test]
fn help_exits_0() {
    let workdir = TempDir::new().unwrap();

    publisher(workdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--collections-root"));
}

#[test]
fn missing_token_exits_1_before_reading_manifests() {
    let workdir = TempDir::new().unwrap();
    let root = workdir.path().join("collections");
    write_collection(&root, "acme", "tool", &["tools"]);

    publisher(workdir.path())
        .env("GALAXY_SERVER_URL", "galaxy.example.com")
        .args(["--target", "acme.tool", "--collections-root"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GALAXY_SERVER_TOKEN"));

    assert!(!root.join("acme/tool/galaxy.yml").exists());
}

#[test]
fn unsupported_server_scheme_exits_1_before_processing() {
    let workdir = TempDir::new().unwrap();
    let root = workdir.path().join("collections");
    write_collection(&root, "acme", "tool", &["tools"]);

    publisher(workdir.path())
        .env("GALAXY_SERVER_URL", "ftp://galaxy.example.com")
        .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
        .args(["--target", "acme.tool", "--collections-root"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported server URL"))
        .stdout(predicate::str::contains("failed-at-resolve").not());

    assert!(!root.join("acme/tool/galaxy.yml").exists());
}

#[test]
fn unknown_namespace_exits_1() {
    let workdir = TempDir::new().unwrap();
    let root = workdir.path().join("collections");
    fs::create_dir_all(&root).unwrap();

    publisher(workdir.path())
        .env("GALAXY_SERVER_URL", "galaxy.example.com")
        .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
        .args(["--namespace", "nope", "--collections-root"])
        .arg(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
mod with_fake_galaxy {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in `ansible-galaxy`: build drops the artifact into the working
    /// directory, publish answers with a scripted message and status
    fn install_fake_galaxy(workdir: &Path, publish_reply: &str, publish_status: i32) {
        let bin = workdir.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let script = format!(
            "#!/bin/sh\ncase \"$2\" in\n  build) : > acme-tool-1.0.0.tar.gz ;;\n  publish) echo \"{}\" >&2; exit {} ;;\nesac\n",
            publish_reply, publish_status
        );
        let path = bin.join("ansible-galaxy");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        fs::write(
            workdir.join(".collection-publisher.yaml"),
            format!(
                "galaxyCommand: {}\ncollectionsRoot: {}\noutputDir: {}\n",
                path.display(),
                workdir.join("collections").display(),
                workdir.join("dist").display()
            ),
        )
        .unwrap();
    }

    #[test]
    fn certified_collection_is_published() {
        let workdir = TempDir::new().unwrap();
        write_collection(&workdir.path().join("collections"), "acme", "tool", &["aacertified"]);
        install_fake_galaxy(workdir.path(), "published", 0);

        publisher(workdir.path())
            .env("GALAXY_SERVER_URL", "galaxy.example.com")
            .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
            .args(["--target", "acme.tool"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "acme.tool: published to https://galaxy.example.com/api/galaxy/content/aa-certified/",
            ))
            .stdout(predicate::str::contains("token-abcdefghij").not());

        assert!(workdir.path().join("dist/acme-tool-1.0.0.tar.gz").exists());
        assert!(workdir.path().join("collections/acme/tool/galaxy.yml").exists());
    }

    #[test]
    fn rejected_publish_exits_0_unless_strict() {
        let workdir = TempDir::new().unwrap();
        write_collection(&workdir.path().join("collections"), "acme", "tool", &["tools"]);
        install_fake_galaxy(workdir.path(), "HTTP Error 500", 1);

        publisher(workdir.path())
            .env("GALAXY_SERVER_URL", "galaxy.example.com")
            .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
            .arg("--all")
            .assert()
            .success()
            .stdout(predicate::str::contains("acme.tool: failed-at-publish"));

        publisher(workdir.path())
            .env("GALAXY_SERVER_URL", "galaxy.example.com")
            .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
            .args(["--all", "--strict"])
            .assert()
            .code(2);
    }

    #[test]
    fn already_published_is_not_a_failure() {
        let workdir = TempDir::new().unwrap();
        write_collection(&workdir.path().join("collections"), "acme", "tool", &["tools"]);
        install_fake_galaxy(workdir.path(), "Error: version already exists", 1);

        publisher(workdir.path())
            .env("GALAXY_SERVER_URL", "galaxy.example.com")
            .env("GALAXY_SERVER_TOKEN", "token-abcdefghij")
            .args(["--namespace", "acme", "--strict"])
            .assert()
            .success()
            .stdout(predicate::str::contains("acme.tool: already-published"));
    }
}
