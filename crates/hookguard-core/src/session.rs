//! Session state — the externally-persisted record of an active workflow.
//! Stored as JSON at `.hookguard/session.json`. A missing or unreadable
//! file loads as "no active session": enforcement fails open rather than
//! refusing every tool call over a corrupt state file.

use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use crate::skill::{ProfileSpec, SkillSpec};
use crate::types::Strictness;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatisfiedCapability {
    pub capability: String,
    pub satisfied_at: DateTime<Utc>,
    pub satisfied_by: String,
    pub evidence_type: String,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub profile_id: String,
    pub activated_at: DateTime<Utc>,
    #[serde(default)]
    pub chain: Vec<String>,
    #[serde(default)]
    pub capabilities_required: Vec<String>,
    #[serde(default)]
    pub capabilities_satisfied: Vec<SatisfiedCapability>,
    #[serde(default)]
    pub current_skill_index: usize,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default)]
    pub blocked_intents: BTreeMap<String, String>,
}

impl SessionState {
    /// Create a session for a matched profile. The chain is the ordered
    /// list of skills providing the profile's required capabilities;
    /// blocked intents are seeded from those skills' deny-until rules,
    /// since no capability is satisfied yet.
    pub fn activate(profile: &ProfileSpec, skills: &[SkillSpec]) -> Self {
        let mut chain = Vec::new();
        for capability in &profile.capabilities_required {
            if let Some(skill) = skills.iter().find(|s| s.provides.contains(capability)) {
                if !chain.contains(&skill.name) {
                    chain.push(skill.name.clone());
                }
            }
        }

        let mut blocked_intents = BTreeMap::new();
        for name in &chain {
            if let Some(skill) = skills.iter().find(|s| &s.name == name) {
                if let Some(deny) = skill.deny_until() {
                    for (intent, rule) in deny {
                        blocked_intents
                            .entry(intent.clone())
                            .or_insert_with(|| rule.reason.clone());
                    }
                }
            }
        }

        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            profile_id: profile.name.clone(),
            activated_at: Utc::now(),
            chain,
            capabilities_required: profile.capabilities_required.clone(),
            capabilities_satisfied: Vec::new(),
            current_skill_index: 0,
            strictness: profile.strictness,
            blocked_intents,
        }
    }

    pub fn current_skill(&self) -> Option<&str> {
        self.chain.get(self.current_skill_index).map(|s| s.as_str())
    }

    pub fn remaining_capabilities(&self) -> Vec<&str> {
        self.capabilities_required
            .iter()
            .filter(|c| {
                !self
                    .capabilities_satisfied
                    .iter()
                    .any(|s| &s.capability == *c)
            })
            .map(|c| c.as_str())
            .collect()
    }

    /// All required capabilities satisfied.
    pub fn is_complete(&self) -> bool {
        self.remaining_capabilities().is_empty()
    }

    /// Record a satisfied capability and lift every blocked intent whose
    /// deny-until rule named it.
    pub fn satisfy_capability(
        &mut self,
        capability: &str,
        satisfied_by: &str,
        evidence_type: &str,
        skills: &[SkillSpec],
    ) {
        if self
            .capabilities_satisfied
            .iter()
            .any(|s| s.capability == capability)
        {
            return;
        }
        self.capabilities_satisfied.push(SatisfiedCapability {
            capability: capability.to_string(),
            satisfied_at: Utc::now(),
            satisfied_by: satisfied_by.to_string(),
            evidence_type: evidence_type.to_string(),
        });

        let lifted: Vec<String> = skills
            .iter()
            .filter_map(|s| s.deny_until())
            .flat_map(|deny| deny.iter())
            .filter(|(_, rule)| rule.until == capability)
            .map(|(intent, _)| intent.clone())
            .collect();
        for intent in lifted {
            self.blocked_intents.remove(&intent);
        }

        // Advance past skills whose provided capabilities are all in.
        while let Some(name) = self.current_skill() {
            let done = skills
                .iter()
                .find(|s| s.name == name)
                .map(|s| {
                    s.provides.iter().all(|c| {
                        self.capabilities_satisfied
                            .iter()
                            .any(|sat| &sat.capability == c)
                    })
                })
                .unwrap_or(true);
            if done {
                self.current_skill_index += 1;
            } else {
                break;
            }
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the persisted session. Missing file ⇒ `None`. A malformed file
    /// also loads as `None` — deliberately fail-open, with a warning.
    pub fn load(root: &Path) -> Option<SessionState> {
        let path = paths::session_path(root);
        let data = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "malformed session file, treating as no active session"
                );
                None
            }
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::session_path(root);
        let data = serde_json::to_string_pretty(self)?;
        atomic_write(&path, data.as_bytes())
    }

    pub fn clear(root: &Path) -> Result<()> {
        let path = paths::session_path(root);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
