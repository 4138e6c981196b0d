#![allow(clippy::unwrap_used, clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch config, rule source and project for one test
struct Workspace {
    _temp: TempDir,
    config: PathBuf,
    source: PathBuf,
    project: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("rules");
        let project = temp.path().join("project");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&project).unwrap();
        fs::write(source.join("vue.md"), "# Vue\nUse the composition API.\n").unwrap();
        fs::write(source.join("laravel.md"), "# Laravel\nUse form requests.\n").unwrap();
        fs::write(source.join("README.md"), "Not a rule.\n").unwrap();
        Self {
            config: temp.path().join("config").join("config.toml"),
            _temp: temp,
            source,
            project,
        }
    }

    /// Workspace with `init` already run against the source
    fn initialized() -> Self {
        let ws = Self::new();
        ws.cmd()
            .arg("init")
            .arg("--source")
            .arg(&ws.source)
            .args(["--frequency", "never"])
            .assert()
            .success();
        ws
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rulekeeper").unwrap();
        cmd.env("RULEKEEPER_CONFIG", &self.config)
            .env("RULEKEEPER_PROJECT", &self.project)
            .env_remove("RULEKEEPER_LOG_FILE");
        cmd
    }

    fn local(&self, file: &str) -> PathBuf {
        self.project.join(".claude").join(file)
    }

    fn manifest(&self) -> PathBuf {
        self.project.join(".rulekeeper").join("manifest.toml")
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_help_output() {
    let mut cmd = Command::cargo_bin("rulekeeper").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep shared Claude rules in sync"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("detach"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_commands_require_config() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("status")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not configured"));
}

#[test]
fn test_init_writes_config() {
    let ws = Workspace::initialized();
    let config = read(&ws.config);
    assert!(config.contains("[source]"));
    assert!(config.contains("pullFrequency = \"never\""));

    ws.cmd()
        .arg("init")
        .arg("--source")
        .arg(&ws.source)
        .assert()
        .success()
        .stdout(predicate::str::contains("already configured"));
}

#[test]
fn test_init_without_source_needs_terminal() {
    let ws = Workspace::new();
    ws.cmd().arg("init").assert().failure();
    assert!(!ws.config.exists());
}

#[test]
fn test_add_installs_and_tracks_rules() {
    let ws = Workspace::initialized();
    ws.cmd()
        .args(["add", "VUE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added vue.md"))
        .stdout(predicate::str::contains("Added 1 rule."));

    assert_eq!(read(&ws.local("vue.md")), read(&ws.source.join("vue.md")));
    let manifest = read(&ws.manifest());
    assert!(manifest.contains("[rules.vue]"));
    assert!(manifest.contains("sha256:"));
    assert!(!manifest.contains("laravel"));
}

#[test]
fn test_add_without_rules_is_a_usage_error() {
    let ws = Workspace::initialized();
    ws.cmd()
        .arg("add")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Use --all"));
}

#[test]
fn test_add_unknown_rule_fails_without_changes() {
    let ws = Workspace::initialized();
    ws.cmd()
        .args(["add", "vue", "svelte"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("svelte"));
    assert!(!ws.local("vue.md").exists());
}

#[test]
fn test_add_all_skips_readme() {
    let ws = Workspace::initialized();
    ws.cmd()
        .args(["add", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 rules."));
    assert!(ws.local("laravel.md").exists());
    assert!(!ws.local("README.md").exists());
}

#[test]
fn test_status_reports_synced_and_diverged() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "--all"]).assert().success();

    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("RuleKeeper Status"))
        .stdout(predicate::str::contains("All rules are synced."));

    fs::write(ws.local("vue.md"), "# Vue\nMy own rules.\n").unwrap();
    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("diverged"))
        .stdout(predicate::str::contains("needs attention"));
}

#[test]
fn test_status_without_manifest_fails() {
    let ws = Workspace::initialized();
    ws.cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rules installed"));
}

#[test]
fn test_pull_applies_source_changes() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "--all"]).assert().success();

    fs::write(ws.source.join("vue.md"), "# Vue\nUse script setup.\n").unwrap();
    ws.cmd()
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated vue.md"))
        .stdout(predicate::str::contains("1 rule updated."));
    assert_eq!(read(&ws.local("vue.md")), "# Vue\nUse script setup.\n");

    ws.cmd()
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("All rules are up to date."));
}

#[test]
fn test_pull_leaves_local_edits_without_terminal() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "vue"]).assert().success();

    fs::write(ws.source.join("vue.md"), "# Vue\nUpstream.\n").unwrap();
    fs::write(ws.local("vue.md"), "# Vue\nMine.\n").unwrap();

    ws.cmd().args(["pull", "vue"]).assert().success();
    assert_eq!(read(&ws.local("vue.md")), "# Vue\nMine.\n");

    ws.cmd().args(["pull", "--force"]).assert().success();
    assert_eq!(read(&ws.local("vue.md")), "# Vue\nUpstream.\n");
}

#[test]
fn test_diff_shows_local_edits() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "vue"]).assert().success();
    fs::write(ws.local("vue.md"), "# Vue\nUse the options API.\n").unwrap();

    ws.cmd()
        .args(["diff", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- source/vue.md"))
        .stdout(predicate::str::contains("- Use the composition API."))
        .stdout(predicate::str::contains("+ Use the options API."));

    ws.cmd()
        .args(["diff", "--all", "--minimal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 added, 1 removed"));
}

#[test]
fn test_diff_edge_cases() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "--all"]).assert().success();

    ws.cmd()
        .arg("diff")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specify a rule name"));

    ws.cmd()
        .args(["diff", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No diverged rules to show."));

    ws.cmd()
        .args(["diff", "laravel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No difference found for 'laravel'."));

    fs::remove_file(ws.local("laravel.md")).unwrap();
    ws.cmd()
        .args(["diff", "laravel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local file is missing."));
}

#[test]
fn test_list_marks_installed_rules() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "vue"]).assert().success();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Rules"))
        .stdout(predicate::str::contains("laravel.md"))
        .stdout(predicate::str::contains("(installed)"))
        .stdout(predicate::str::contains("README").not());

    ws.cmd()
        .args(["list", "--installed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed Rules"))
        .stdout(predicate::str::contains("vue.md"))
        .stdout(predicate::str::contains("laravel.md").not());
}

#[test]
fn test_detach_and_attach() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "vue"]).assert().success();

    ws.cmd()
        .args(["detach", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule 'vue' is now detached."));
    assert!(read(&ws.manifest()).contains("detached"));

    fs::write(ws.source.join("vue.md"), "# Vue\nChanged upstream.\n").unwrap();
    ws.cmd().arg("pull").assert().success();
    assert_eq!(
        read(&ws.local("vue.md")),
        "# Vue\nUse the composition API.\n"
    );

    ws.cmd()
        .args(["detach", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already detached"));

    // Contents differ and there is no terminal to ask
    ws.cmd()
        .args(["attach", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remains detached"));

    fs::write(ws.local("vue.md"), "# Vue\nChanged upstream.\n").unwrap();
    ws.cmd()
        .args(["attach", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule 'vue' is now attached."));
}

#[test]
fn test_remove_deletes_local_file() {
    let ws = Workspace::initialized();
    ws.cmd().args(["add", "--all"]).assert().success();

    ws.cmd()
        .args(["remove", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 rule."));
    assert!(!ws.local("vue.md").exists());
    assert!(!read(&ws.manifest()).contains("[rules.vue]"));

    ws.cmd()
        .args(["remove", "laravel", "--keep-file"])
        .assert()
        .success();
    assert!(ws.local("laravel.md").exists());
}

#[test]
fn test_source_show_and_set() {
    let ws = Workspace::initialized();
    ws.cmd()
        .args(["source", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Source Configuration"))
        .stdout(predicate::str::contains("local"));

    let other = ws.project.join("other-rules");
    fs::create_dir_all(&other).unwrap();
    ws.cmd()
        .args(["source", "set"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("Source updated"));
    assert!(read(&ws.config).contains("other-rules"));

    ws.cmd()
        .args(["source", "pull"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn test_doctor_reports_checks() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("RuleKeeper Diagnostics"))
        .stdout(predicate::str::contains("Global config"))
        .stdout(predicate::str::contains("issue found."));

    let ws = Workspace::initialized();
    ws.cmd().args(["add", "--all"]).assert().success();
    ws.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("All tracked rules have local files"))
        .stdout(predicate::str::contains("All checks passed."));
}
