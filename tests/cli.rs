use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    root: PathBuf,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().to_path_buf();
        for sub in ["home", "xdg", "work", "projects/alpha", "contexts"] {
            fs::create_dir_all(root.join(sub)).expect("sandbox dirs");
        }
        let config = root.join("config.toml");
        fs::write(
            &config,
            "[paths]\nindex_folders = [\"projects\"]\n\n[contexts]\nroot = \"contexts\"\ntemplates = \"templates\"\n",
        )
        .expect("config");
        Self {
            _dir: dir,
            root,
            config,
        }
    }

    fn navgator(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("navgator"));
        cmd.current_dir(self.root.join("work"))
            .env("HOME", self.root.join("home"))
            .env("XDG_CONFIG_HOME", self.root.join("xdg"))
            .env("NAVGATOR_CONFIG", &self.config)
            .env_remove("NAVGATOR_OUTPUT")
            .env_remove("NAVGATOR_LOG_FILE");
        cmd
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn missing_configuration_is_fatal() {
    let sandbox = Sandbox::new();
    fs::remove_file(&sandbox.config).expect("remove config");
    sandbox
        .navgator()
        .args(["context", "anything", "--no-create"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No navgator config found"));
}

#[test]
fn context_is_created_then_resolved() {
    let sandbox = Sandbox::new();
    let expected = path_text(&sandbox.path("contexts/client-work"));

    sandbox
        .navgator()
        .args([
            "context",
            "Client Work",
            "--create",
            "--description",
            "billing",
            "--tag",
            "work",
        ])
        .assert()
        .success()
        .stdout(predicate::eq(expected.clone()));

    let marker = fs::read_to_string(sandbox.path("contexts/client-work/.navgator.toml"))
        .expect("marker written");
    assert!(marker.contains("context = \"Client Work\""));
    assert!(marker.contains("description = \"billing\""));

    sandbox
        .navgator()
        .args(["context", "Client Work", "--no-create"])
        .assert()
        .success()
        .stdout(predicate::eq(expected.clone()));

    // An existing context ignores creation options.
    sandbox
        .navgator()
        .args(["context", "Client Work", "--create", "--template", "nope"])
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn missing_context_fails_without_output() {
    let sandbox = Sandbox::new();
    sandbox
        .navgator()
        .args(["context", "ghost", "--no-create"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No context named 'ghost'"));

    sandbox
        .navgator()
        .args(["context", "ghost"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--create"));
    assert!(!sandbox.path("contexts/ghost").exists());
}

#[test]
fn context_json_output() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .navgator()
        .args(["context", "notes", "--create", "--json"])
        .output()
        .expect("run navgator");
    assert!(output.status.success());
    let entry: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(entry["name"], "notes");
    assert_eq!(entry["created"], true);
    assert_eq!(entry["tags"][0], "context");
}

#[test]
fn context_path_can_go_to_an_output_file() {
    let sandbox = Sandbox::new();
    let output_file = sandbox.path("selection.txt");
    sandbox
        .navgator()
        .env("NAVGATOR_OUTPUT", &output_file)
        .args(["context", "scratch", "--create"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(
        fs::read_to_string(output_file).expect("output file"),
        path_text(&sandbox.path("contexts/scratch"))
    );
}

#[test]
fn conflicting_flags_are_a_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .navgator()
        .args(["context", "x", "--create", "--no-create"])
        .assert()
        .code(2);
}

#[test]
fn schema_describes_the_config_file() {
    let sandbox = Sandbox::new();
    sandbox
        .navgator()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("index_folders"))
        .stdout(predicate::str::contains("max_depth"));
}

#[test]
fn empty_index_is_reported() {
    let sandbox = Sandbox::new();
    fs::write(
        &sandbox.config,
        "[paths]\nindex_folders = [\"nowhere\"]\n",
    )
    .expect("config");
    sandbox
        .navgator()
        .arg("navigate")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("navgator: no directories found"));
}
