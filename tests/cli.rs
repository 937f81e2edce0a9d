use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sealer(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kubectl-sealer").unwrap();
    cmd.env("KUBECTL_SEALER_CONFIG_DIR", config_dir.path())
        .env_remove("SEALED_SECRETS_CONTROLLER_NAMESPACE")
        .env_remove("KUBECTL_SEALER_KUBESEAL")
        .env_remove("KUBECTL_SEALER_KUBECTL")
        .env_remove("KUBECTL_SEALER_CERT")
        .env_remove("KUBECTL_SEALER_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    sealer(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("edit"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("new"));
}

#[test]
fn version_prints_name_and_version() {
    let dir = TempDir::new().unwrap();
    sealer(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kubectl-sealer "))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_shows_environment_overrides() {
    let dir = TempDir::new().unwrap();
    sealer(&dir)
        .arg("config")
        .env("SEALED_SECRETS_CONTROLLER_NAMESPACE", "sealed-secrets")
        .assert()
        .success()
        .stdout(predicate::str::contains("sealed-secrets"))
        .stdout(predicate::str::contains("settings.json"));
}

#[test]
fn edit_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    sealer(&dir)
        .args(["edit", "-f"])
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn new_rejects_unknown_scope() {
    let dir = TempDir::new().unwrap();
    sealer(&dir)
        .args(["new", "--scope", "everywhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scope"));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    const SEALED: &str = "\
apiVersion: bitnami.com/v1alpha1
kind: SealedSecret
metadata:
  name: s1
  namespace: ns
spec:
  encryptedData:
    a: ORIG-A
    b: ORIG-B
  template:
    metadata:
      name: s1
      namespace: ns
";

    const UNSEALED: &str = r#"{"apiVersion":"v1","kind":"Secret","metadata":{"name":"s1","namespace":"ns","creationTimestamp":null,"ownerReferences":[{"apiVersion":"bitnami.com/v1alpha1","kind":"SealedSecret","name":"s1","uid":""}]},"data":{"a":"MQ==","b":"Mg=="}}"#;

    const SKELETON: &str = r#"{"apiVersion":"bitnami.com/v1alpha1","kind":"SealedSecret","metadata":{"name":"s1","namespace":"ns"},"spec":{"template":{"metadata":{"name":"s1","namespace":"ns"}},"encryptedData":{}}}"#;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    struct Fixture {
        dir: TempDir,
        sealed: PathBuf,
        kubectl: PathBuf,
        kubeseal: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let sealed = dir.path().join("sealed.yaml");
            fs::write(&sealed, SEALED).unwrap();

            let kubectl = script(
                dir.path(),
                "kubectl",
                r#"cat > /dev/null
printf '%s' '{"apiVersion":"v1","kind":"List","items":[{"kind":"Secret"}]}'"#,
            );
            let kubeseal = script(
                dir.path(),
                "kubeseal",
                &format!(
                    r#"cat > /dev/null
case "$*" in
  *--recovery-unseal*) printf '%s' '{}' ;;
  *--raw*) echo NEWCIPHER ;;
  *) printf '%s' '{}' ;;
esac"#,
                    UNSEALED, SKELETON
                ),
            );

            Self {
                dir,
                sealed,
                kubectl,
                kubeseal,
            }
        }

        fn command(&self, editor: &Path) -> Command {
            let mut cmd = sealer(&self.dir);
            cmd.env("KUBECTL_SEALER_KUBECTL", &self.kubectl)
                .env("KUBECTL_SEALER_KUBESEAL", &self.kubeseal)
                .env_remove("VISUAL")
                .env("EDITOR", editor);
            cmd
        }
    }

    #[test]
    fn failing_kubectl_leaves_input_untouched() {
        let fixture = Fixture::new();
        let failing = script(fixture.dir.path(), "failing-kubectl", "echo forbidden >&2\nexit 1");
        let editor = script(fixture.dir.path(), "editor", "exit 0");

        fixture
            .command(&editor)
            .env("KUBECTL_SEALER_KUBECTL", &failing)
            .args(["edit", "-i", "-f"])
            .arg(&fixture.sealed)
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("forbidden"));

        assert_eq!(fs::read_to_string(&fixture.sealed).unwrap(), SEALED);
    }

    #[test]
    fn show_prints_plaintext() {
        let fixture = Fixture::new();
        let editor = script(fixture.dir.path(), "editor", "exit 0");

        fixture
            .command(&editor)
            .args(["show", "-f"])
            .arg(&fixture.sealed)
            .assert()
            .success()
            .stdout(predicate::str::contains("stringData"))
            .stdout(predicate::str::contains("ownerReferences").not());
    }

    #[test]
    fn untouched_edit_reports_no_change() {
        let fixture = Fixture::new();
        let editor = script(fixture.dir.path(), "editor", "exit 0");

        fixture
            .command(&editor)
            .args(["edit", "-i", "-f"])
            .arg(&fixture.sealed)
            .assert()
            .success()
            .stdout("no change\n");

        assert_eq!(fs::read_to_string(&fixture.sealed).unwrap(), SEALED);
    }

    #[test]
    fn in_place_edit_reencrypts_only_changed_value() {
        let fixture = Fixture::new();
        let editor = script(
            fixture.dir.path(),
            "editor",
            r#"sed -i 's/^  b: .*/  b: changed/' "$1""#,
        );

        fixture
            .command(&editor)
            .args(["edit", "-i", "-f"])
            .arg(&fixture.sealed)
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("selective merge"));

        let output = fs::read(&fixture.sealed).unwrap();
        let sealed = sealer::models::SealedResource::from_slice(&output).unwrap();
        let encrypted = sealed.encrypted_data();
        assert_eq!(encrypted.get("a").map(String::as_str), Some("ORIG-A"));
        assert_eq!(encrypted.get("b").map(String::as_str), Some("NEWCIPHER"));
        assert_eq!(encrypted.len(), 2);
    }
}
