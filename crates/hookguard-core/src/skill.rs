//! Skill and profile definitions, parsed from YAML frontmatter in markdown
//! files. Loading is validate-then-construct: missing required fields fail
//! at load time and only strongly-typed records cross this boundary.

use crate::error::{GuardError, Result};
use crate::sandbox::SandboxConfig;
use crate::types::{EnforcementTier, Strictness};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// SkillSpec
// ---------------------------------------------------------------------------

/// A blocked-intent rule: the intent stays blocked until the named
/// capability is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenyUntil {
    pub until: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolPolicy {
    #[serde(default)]
    pub deny_until: BTreeMap<String, DenyUntil>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSpec {
    pub name: String,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub tier: EnforcementTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_policy: Option<ToolPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxConfig>,
}

impl SkillSpec {
    /// The deny-until rules this skill registers, keyed by intent tag.
    pub fn deny_until(&self) -> Option<&BTreeMap<String, DenyUntil>> {
        self.tool_policy.as_ref().map(|p| &p.deny_until)
    }

    /// True if this skill registered a blocking rule for `intent`.
    pub fn blocks_intent(&self, intent: &str) -> bool {
        self.deny_until()
            .map(|m| m.contains_key(intent))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// ProfileSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,
    /// Trigger words matched (case-insensitive substring) against the
    /// user's prompt for auto-activation.
    #[serde(rename = "match", default)]
    pub match_words: Vec<String>,
    #[serde(default)]
    pub capabilities_required: Vec<String>,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub completion_requirements: Vec<String>,
}

impl ProfileSpec {
    /// Case-insensitive substring match of any trigger word in `prompt`.
    pub fn matches_prompt(&self, prompt: &str) -> bool {
        let lower = prompt.to_lowercase();
        self.match_words
            .iter()
            .any(|w| !w.is_empty() && lower.contains(&w.to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Frontmatter loading
// ---------------------------------------------------------------------------

/// Extract the YAML between the leading `---` fence and its closing fence.
fn extract_frontmatter(content: &str, file: &Path) -> Result<String> {
    let missing = || GuardError::MissingFrontmatter(file.display().to_string());
    let rest = content.strip_prefix("---").ok_or_else(missing)?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")).ok_or_else(missing)?;
    let end = rest.find("\n---").ok_or_else(missing)?;
    Ok(rest[..end].to_string())
}

fn load_definition<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let yaml = extract_frontmatter(&content, path)?;
    serde_yaml::from_str(&yaml).map_err(|e| GuardError::Definition {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load one skill definition. Declarative config errors (bad sandbox state,
/// missing name) are load errors, not runtime surprises.
pub fn load_skill(path: &Path) -> Result<SkillSpec> {
    let skill: SkillSpec = load_definition(path)?;
    if let Some(sandbox) = &skill.sandbox {
        sandbox.validate().map_err(|e| GuardError::Definition {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(skill)
}

pub fn load_profile(path: &Path) -> Result<ProfileSpec> {
    load_definition(path)
}

fn markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().map(|e| e == "md").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

/// Scan a directory of `*.md` skill definitions. A missing directory is an
/// empty set, not an error.
pub fn load_skills(dir: &Path) -> Result<Vec<SkillSpec>> {
    markdown_files(dir)?.iter().map(|p| load_skill(p)).collect()
}

pub fn load_profiles(dir: &Path) -> Result<Vec<ProfileSpec>> {
    markdown_files(dir)?.iter().map(|p| load_profile(p)).collect()
}

pub fn find_skill<'a>(skills: &'a [SkillSpec], name: &str) -> Result<&'a SkillSpec> {
    skills
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| GuardError::SkillNotFound(name.to_string()))
}

// ---------------------------------------------------------------------------
// SkillLibrary
// ---------------------------------------------------------------------------

/// Directory-backed skill/profile store for long-lived callers. Scans are
/// cached in caller-owned value objects with a TTL; `invalidate` forces a
/// rescan. One-shot callers can use [`load_skills`]/[`load_profiles`]
/// directly.
pub struct SkillLibrary {
    skills_dir: std::path::PathBuf,
    profiles_dir: std::path::PathBuf,
    skills: crate::cache::ScanCache<Vec<SkillSpec>>,
    profiles: crate::cache::ScanCache<Vec<ProfileSpec>>,
}

impl SkillLibrary {
    pub fn new(root: &Path) -> Self {
        Self::with_ttl(root, chrono::Duration::seconds(30))
    }

    pub fn with_ttl(root: &Path, ttl: chrono::Duration) -> Self {
        Self {
            skills_dir: crate::paths::skills_dir(root),
            profiles_dir: crate::paths::profiles_dir(root),
            skills: crate::cache::ScanCache::new(ttl),
            profiles: crate::cache::ScanCache::new(ttl),
        }
    }

    pub fn skills(&mut self) -> Result<Vec<SkillSpec>> {
        let key = self.skills_dir.display().to_string();
        if let Some(cached) = self.skills.get(&key) {
            return Ok(cached.clone());
        }
        let loaded = load_skills(&self.skills_dir)?;
        self.skills.put(key, loaded.clone());
        Ok(loaded)
    }

    pub fn profiles(&mut self) -> Result<Vec<ProfileSpec>> {
        let key = self.profiles_dir.display().to_string();
        if let Some(cached) = self.profiles.get(&key) {
            return Ok(cached.clone());
        }
        let loaded = load_profiles(&self.profiles_dir)?;
        self.profiles.put(key, loaded.clone());
        Ok(loaded)
    }

    pub fn invalidate(&mut self) {
        self.skills.clear();
        self.profiles.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
