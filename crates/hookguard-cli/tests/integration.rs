#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hookguard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hookguard").unwrap();
    cmd.current_dir(dir.path()).env("HOOKGUARD_ROOT", dir.path());
    cmd
}

const TDD_SKILL: &str = r#"---
name: tdd
provides: [failing_test, passing_test]
tier: hard
tool_policy:
  deny_until:
    write_impl:
      until: failing_test
      reason: Tests must be written first
    commit:
      until: passing_test
      reason: Tests must pass first
sandbox:
  state: blocked
  profiles:
    blocked:
      name: blocked
      allow_commands: ["cargo test", "ls"]
      allow_write: ["tests/**"]
    red:
      name: red
      allow_commands: ["*"]
      deny_commands: ["git push"]
      allow_write: ["**"]
      deny_write: [".git/**"]
---

# TDD skill
"#;

const TDD_PROFILE: &str = r#"---
name: tdd-workflow
match: [implement, "fix bug"]
capabilities_required: [failing_test, passing_test]
strictness: strict
priority: 10
---

# TDD workflow profile
"#;

fn init_project(dir: &TempDir) {
    let skills = dir.path().join(".hookguard/skills");
    let profiles = dir.path().join(".hookguard/profiles");
    std::fs::create_dir_all(&skills).unwrap();
    std::fs::create_dir_all(&profiles).unwrap();
    std::fs::write(skills.join("tdd.md"), TDD_SKILL).unwrap();
    std::fs::write(profiles.join("tdd-workflow.md"), TDD_PROFILE).unwrap();
}

// ---------------------------------------------------------------------------
// hookguard hook
// ---------------------------------------------------------------------------

#[test]
fn hook_allows_without_session() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Read","input":{"path":"src/main.rs"}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("no active session"));
}

#[test]
fn hook_auto_activates_and_blocks_impl_write() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .arg("hook")
        .write_stdin(
            r#"{"tool":"Write","input":{"path":"src/login.rs"},"prompt":"implement login"}"#,
        )
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHAIN ENFORCEMENT: BLOCKED"))
        .stderr(predicate::str::contains("Tests must be written first"));

    // The activated session was persisted.
    assert!(dir.path().join(".hookguard/session.json").exists());
}

#[test]
fn hook_allows_test_write_under_active_session() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    // Activate via a prompt-bearing call first.
    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Read","prompt":"implement login"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("activated profile 'tdd-workflow'"));

    // Writing a test file is not blocked: only write_impl and commit are.
    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Write","input":{"path":"tests/login.rs"}}"#)
        .assert()
        .success();
}

#[test]
fn hook_blocks_commit_under_active_session() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Read","prompt":"implement login"}"#)
        .assert()
        .success();

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Bash","input":{"command":"git commit -m wip"}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit: Tests must pass first"));
}

#[test]
fn hook_respects_auto_select_false() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Read","prompt":"implement login","autoSelect":false}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("no active session"));

    assert!(!dir.path().join(".hookguard/session.json").exists());
}

#[test]
fn hook_fails_open_on_corrupt_session() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join(".hookguard/session.json"), "{broken").unwrap();

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Write","input":{"path":"src/main.rs"}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("no active session"));
}

#[test]
fn hook_rejects_malformed_payload() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .arg("hook")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid hook payload"));
}

#[test]
fn hook_json_output() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["hook", "--json"])
        .write_stdin(r#"{"tool":"Read"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"allowed\": true"));
}

// ---------------------------------------------------------------------------
// hookguard phase
// ---------------------------------------------------------------------------

#[test]
fn phase_starts_blocked_and_cycles() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["phase", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"));

    hookguard(&dir)
        .args(["phase", "event", "test-written"])
        .assert()
        .success()
        .stdout(predicate::str::contains("red"));

    hookguard(&dir)
        .args(["phase", "event", "test-passed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("green"));
}

#[test]
fn phase_invalid_event_is_noop() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    // test-passed is invalid in blocked; the phase must not move
    hookguard(&dir)
        .args(["phase", "event", "test-passed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"))
        .stderr(predicate::str::contains("no-op"));
}

#[test]
fn phase_force_and_reset() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["phase", "force", "green"])
        .assert()
        .success()
        .stdout(predicate::str::contains("green"));

    hookguard(&dir)
        .args(["phase", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"));
}

#[test]
fn phase_force_unknown_phase_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["phase", "force", "purple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid phase"));
}

// ---------------------------------------------------------------------------
// hookguard sandbox
// ---------------------------------------------------------------------------

#[test]
fn sandbox_blocked_phase_denies_impl_write() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["sandbox", "write", "src/main.rs", "--skill", "tdd"])
        .assert()
        .failure();

    hookguard(&dir)
        .args(["sandbox", "write", "tests/login.rs", "--skill", "tdd"])
        .assert()
        .success();
}

#[test]
fn sandbox_follows_persisted_phase() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    // blocked phase: only cargo test/ls allowed
    hookguard(&dir)
        .args(["sandbox", "command", "git push origin main", "--skill", "tdd"])
        .assert()
        .failure();

    hookguard(&dir)
        .args(["phase", "force", "red"])
        .assert()
        .success();

    // red phase allows everything except git push
    hookguard(&dir)
        .args(["sandbox", "command", "cargo build", "--skill", "tdd"])
        .assert()
        .success();
    hookguard(&dir)
        .args(["sandbox", "command", "git push origin main", "--skill", "tdd"])
        .assert()
        .failure();
}

#[test]
fn sandbox_unknown_skill_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["sandbox", "command", "ls", "--skill", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skill not found"));
}

// ---------------------------------------------------------------------------
// hookguard validate
// ---------------------------------------------------------------------------

#[test]
fn validate_compliant_text() {
    let dir = TempDir::new().unwrap();

    hookguard(&dir)
        .args(["validate", "--require", "tdd"])
        .write_stdin("I'll start with Skill(tdd) as required.")
        .assert()
        .success()
        .stdout(predicate::str::contains("compliant"));
}

#[test]
fn validate_missing_skill_emits_retry_prompt() {
    let dir = TempDir::new().unwrap();

    hookguard(&dir)
        .args(["validate", "--require", "tdd", "--attempt", "1", "--max-retries", "3"])
        .write_stdin("I will implement directly.")
        .assert()
        .failure()
        .stderr(predicate::str::contains("COMPLIANCE ERROR"))
        .stderr(predicate::str::contains("1/3"));
}

#[test]
fn validate_exhausted_retries_has_no_prompt() {
    let dir = TempDir::new().unwrap();

    hookguard(&dir)
        .args(["validate", "--require", "tdd", "--attempt", "3", "--max-retries", "3"])
        .write_stdin("I will implement directly.")
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-compliant after 3 attempts"));
}

// ---------------------------------------------------------------------------
// hookguard session
// ---------------------------------------------------------------------------

#[test]
fn session_show_and_clear() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hookguard(&dir)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));

    hookguard(&dir)
        .arg("hook")
        .write_stdin(r#"{"tool":"Read","prompt":"implement login"}"#)
        .assert()
        .success();

    hookguard(&dir)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tdd-workflow"))
        .stdout(predicate::str::contains("write_impl"));

    hookguard(&dir)
        .args(["session", "clear"])
        .assert()
        .success();

    hookguard(&dir)
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}
