//! Per-phase sandbox policy matching. The matcher renders decisions only —
//! it never performs process or filesystem-level enforcement.
//!
//! Precedence is absolute for both commands and write paths:
//! empty allow-list ⇒ deny everything; deny patterns are checked before
//! allow patterns; deny always wins.

use crate::error::{GuardError, Result};
use crate::types::TddPhase;
use globset::GlobBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// SandboxPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SandboxPolicy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub allow_commands: Vec<String>,
    #[serde(default)]
    pub deny_commands: Vec<String>,
    #[serde(default)]
    pub allow_write: Vec<String>,
    #[serde(default)]
    pub deny_write: Vec<String>,
}

// ---------------------------------------------------------------------------
// SandboxConfig
// ---------------------------------------------------------------------------

/// One policy per phase, plus the phase the config considers active.
/// Loaded once per skill activation and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SandboxConfig {
    pub state: TddPhase,
    pub profiles: BTreeMap<TddPhase, SandboxPolicy>,
}

impl SandboxConfig {
    /// Load-time invariant: `state` must be a key of `profiles`. Running
    /// with an ambiguous policy is worse than refusing to load.
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(GuardError::SandboxConfig(
                "profiles must not be empty".to_string(),
            ));
        }
        if !self.profiles.contains_key(&self.state) {
            return Err(GuardError::SandboxConfig(format!(
                "state '{}' has no matching profile",
                self.state
            )));
        }
        Ok(())
    }

    pub fn active_policy(&self) -> &SandboxPolicy {
        // validate() guarantees presence; fall back to an empty (deny-all)
        // policy rather than panicking if a caller skipped validation.
        static EMPTY: SandboxPolicy = SandboxPolicy {
            name: String::new(),
            allow_commands: Vec::new(),
            deny_commands: Vec::new(),
            allow_write: Vec::new(),
            deny_write: Vec::new(),
        };
        self.profiles.get(&self.state).unwrap_or(&EMPTY)
    }

    pub fn policy_for(&self, phase: TddPhase) -> Option<&SandboxPolicy> {
        self.profiles.get(&phase)
    }
}

// ---------------------------------------------------------------------------
// Pattern matching
// ---------------------------------------------------------------------------

/// Glob match with `**`, `*`, brace groups, and dotfiles. An unparseable
/// pattern matches nothing.
fn glob_match(text: &str, pattern: &str) -> bool {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .build()
        .map(|g| g.compile_matcher().is_match(text))
        .unwrap_or(false)
}

/// Prefix match for commands only: pattern `rm -rf` matches `rm -rf /tmp`
/// but not `sudo rm -rf`. Kept as its own pass, separate from glob
/// matching — folding the two styles together silently changes which
/// strings match.
fn prefix_match(command: &str, pattern: &str) -> bool {
    command.starts_with(pattern)
}

fn matches_command(command: &str, pattern: &str) -> bool {
    if pattern == command {
        return true;
    }
    if pattern == "*" || pattern == "**" {
        return true;
    }
    if prefix_match(command, pattern) {
        return true;
    }
    glob_match(command, pattern)
}

fn matches_write(path: &str, pattern: &str) -> bool {
    if pattern == path {
        return true;
    }
    if pattern == "*" || pattern == "**" {
        return true;
    }
    glob_match(path, pattern)
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Is `command` permitted under `policy`? Empty allow-list denies
/// everything; deny wins over allow.
pub fn is_command_allowed(command: &str, policy: &SandboxPolicy) -> bool {
    if policy.allow_commands.is_empty() {
        return false;
    }
    if policy
        .deny_commands
        .iter()
        .any(|p| matches_command(command, p))
    {
        return false;
    }
    policy
        .allow_commands
        .iter()
        .any(|p| matches_command(command, p))
}

/// Is a write to `path` permitted under `policy`? Identical precedence to
/// [`is_command_allowed`] but without the prefix pass.
pub fn is_write_allowed(path: &str, policy: &SandboxPolicy) -> bool {
    if policy.allow_write.is_empty() {
        return false;
    }
    if policy.deny_write.iter().any(|p| matches_write(path, p)) {
        return false;
    }
    policy.allow_write.iter().any(|p| matches_write(path, p))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(
        allow_commands: &[&str],
        deny_commands: &[&str],
        allow_write: &[&str],
        deny_write: &[&str],
    ) -> SandboxPolicy {
        SandboxPolicy {
            name: "test".to_string(),
            allow_commands: allow_commands.iter().map(|s| s.to_string()).collect(),
            deny_commands: deny_commands.iter().map(|s| s.to_string()).collect(),
            allow_write: allow_write.iter().map(|s| s.to_string()).collect(),
            deny_write: deny_write.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_allow_denies_everything() {
        let p = policy(&[], &[], &[], &[]);
        assert!(!is_command_allowed("ls", &p));
        assert!(!is_command_allowed("", &p));
        assert!(!is_write_allowed("src/main.rs", &p));
    }

    #[test]
    fn deny_wins_over_allow() {
        let p = policy(&["*"], &["rm -rf"], &["**"], &["src/**"]);
        assert!(!is_command_allowed("rm -rf /tmp", &p));
        assert!(is_command_allowed("ls -la", &p));
        assert!(!is_write_allowed("src/main.rs", &p));
        assert!(is_write_allowed("tests/main.rs", &p));
    }

    #[test]
    fn exact_command_match() {
        let p = policy(&["cargo test"], &[], &[], &[]);
        assert!(is_command_allowed("cargo test", &p));
        // prefix pass also admits longer commands starting with the pattern
        assert!(is_command_allowed("cargo test --workspace", &p));
        assert!(!is_command_allowed("cargo build", &p));
    }

    #[test]
    fn wildcard_all_matches_everything() {
        let star = policy(&["*"], &[], &["*"], &[]);
        let double = policy(&["**"], &[], &["**"], &[]);
        assert!(is_command_allowed("anything at all", &star));
        assert!(is_command_allowed("anything at all", &double));
        assert!(is_write_allowed("deep/nested/path.rs", &star));
        assert!(is_write_allowed("deep/nested/path.rs", &double));
    }

    #[test]
    fn prefix_matches_commands_but_not_super_strings() {
        let p = policy(&["*"], &["rm -rf"], &[], &[]);
        // prefix: "rm -rf /tmp" starts with "rm -rf" → denied
        assert!(!is_command_allowed("rm -rf /tmp", &p));
        // "sudo rm -rf" does not start with the deny pattern → allowed
        assert!(is_command_allowed("sudo rm -rf", &p));
    }

    #[test]
    fn write_matching_has_no_prefix_pass() {
        // "src" is not a glob and not an exact match for "src/main.rs";
        // without a prefix pass it must not match.
        let p = policy(&[], &[], &["src"], &[]);
        assert!(!is_write_allowed("src/main.rs", &p));
        assert!(is_write_allowed("src", &p));
    }

    #[test]
    fn glob_brace_groups_and_dotfiles() {
        let p = policy(
            &["cargo {test,check}"],
            &[],
            &["**/*.{rs,toml}", ".env*"],
            &[],
        );
        assert!(is_command_allowed("cargo test", &p));
        assert!(is_command_allowed("cargo check", &p));
        assert!(!is_command_allowed("cargo publish", &p));
        assert!(is_write_allowed("src/lib.rs", &p));
        assert!(is_write_allowed("Cargo.toml", &p));
        assert!(is_write_allowed(".envrc", &p));
        assert!(!is_write_allowed("src/lib.py", &p));
    }

    #[test]
    fn unparseable_glob_matches_nothing() {
        let p = policy(&["[unclosed"], &[], &["[also-unclosed"], &[]);
        assert!(!is_command_allowed("x", &p));
        assert!(!is_write_allowed("x", &p));
        // exact text still matches via the equality pass
        assert!(is_command_allowed("[unclosed", &p));
    }

    #[test]
    fn config_validates_state_in_profiles() {
        let mut profiles = BTreeMap::new();
        profiles.insert(TddPhase::Red, SandboxPolicy::default());
        let ok = SandboxConfig {
            state: TddPhase::Red,
            profiles: profiles.clone(),
        };
        assert!(ok.validate().is_ok());

        let bad = SandboxConfig {
            state: TddPhase::Green,
            profiles,
        };
        assert!(matches!(
            bad.validate(),
            Err(GuardError::SandboxConfig(_))
        ));

        let empty = SandboxConfig {
            state: TddPhase::Blocked,
            profiles: BTreeMap::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn config_yaml_roundtrip() {
        let yaml = r#"
state: red
profiles:
  red:
    name: red
    allow_commands: ["cargo test"]
    deny_commands: ["git push"]
    allow_write: ["tests/**"]
    deny_write: ["src/**"]
  green:
    name: green
    allow_commands: ["*"]
"#;
        let config: SandboxConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.state, TddPhase::Red);
        let active = config.active_policy();
        assert_eq!(active.name, "red");
        assert!(is_command_allowed("cargo test --lib", active));
        assert!(!is_write_allowed("src/main.rs", active));
        assert!(is_write_allowed("tests/login.rs", active));
    }

    #[test]
    fn config_rejects_unknown_phase() {
        let yaml = "state: purple\nprofiles:\n  purple:\n    name: p\n";
        assert!(serde_yaml::from_str::<SandboxConfig>(yaml).is_err());
    }

    #[test]
    fn active_policy_without_validation_is_deny_all() {
        let config = SandboxConfig {
            state: TddPhase::Green,
            profiles: BTreeMap::new(),
        };
        let p = config.active_policy();
        assert!(!is_command_allowed("ls", p));
        assert!(!is_write_allowed("a", p));
    }
}
