//! Enforcement decision engine — turns classified intents plus the active
//! session's blocked-intent state into an allow/deny verdict with a
//! human-readable message. Also runs prompt-driven profile auto-activation.
//!
//! Failure semantics: a missing or malformed session means "no active
//! session" and the verdict is allowed.

use crate::classifier::{find_blocked_intents, BlockedIntent, ToolInvocation};
use crate::session::SessionState;
use crate::skill::{ProfileSpec, SkillSpec};
use crate::types::{impact_of, EnforcementTier};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_intents: Vec<BlockedIntent>,
    pub message: String,
}

/// A verdict plus the session to persist. Auto-activation creates a new
/// session; persistence stays the caller's responsibility.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub session: Option<SessionState>,
    pub activated: bool,
}

impl CheckOutcome {
    /// Hook-protocol exit code: 0 when allowed, 1 when blocked.
    pub fn exit_code(&self) -> i32 {
        if self.verdict.allowed {
            0
        } else {
            1
        }
    }
}

// ---------------------------------------------------------------------------
// EnforcementEngine
// ---------------------------------------------------------------------------

pub struct EnforcementEngine {
    skills: Vec<SkillSpec>,
    profiles: Vec<ProfileSpec>,
    auto_select: bool,
}

impl EnforcementEngine {
    pub fn new(skills: Vec<SkillSpec>, profiles: Vec<ProfileSpec>) -> Self {
        Self {
            skills,
            profiles,
            auto_select: true,
        }
    }

    /// Disable prompt-driven profile auto-activation for every check.
    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }

    /// Evaluate one tool invocation against the active session. Never
    /// errors for a well-formed invocation: no session means allowed.
    pub fn check(&self, invocation: &ToolInvocation, session: Option<SessionState>) -> CheckOutcome {
        let mut session = session;
        let mut activated = false;

        if session.is_none() && self.auto_select_enabled(invocation) {
            if let Some(prompt) = invocation.prompt.as_deref() {
                if let Some(profile) = self.match_profile(prompt) {
                    let new = SessionState::activate(profile, &self.skills);
                    tracing::info!(profile = %profile.name, session = %new.session_id, "auto-activated profile");
                    session = Some(new);
                    activated = true;
                }
            }
        }

        let Some(session) = session else {
            return CheckOutcome {
                verdict: Verdict {
                    allowed: true,
                    blocked_intents: Vec::new(),
                    message: "hookguard: no active session".to_string(),
                },
                session: None,
                activated: false,
            };
        };

        let blocked: Vec<BlockedIntent> =
            find_blocked_intents(invocation, &session.blocked_intents)
                .into_iter()
                .filter(|b| {
                    self.tier_for(&b.intent, &session)
                        .blocks(impact_of(&b.intent))
                })
                .collect();

        let verdict = if blocked.is_empty() {
            Verdict {
                allowed: true,
                blocked_intents: Vec::new(),
                message: allowed_message(&session, activated),
            }
        } else {
            Verdict {
                allowed: false,
                message: blocked_message(&session, &blocked),
                blocked_intents: blocked,
            }
        };

        CheckOutcome {
            verdict,
            session: Some(session),
            activated,
        }
    }

    /// Hook-protocol wrapper: the outcome plus its exit code. The caller
    /// writes the message to stdout on 0 and stderr on 1.
    pub fn check_with_exit_code(
        &self,
        invocation: &ToolInvocation,
        session: Option<SessionState>,
    ) -> (CheckOutcome, i32) {
        let outcome = self.check(invocation, session);
        let code = outcome.exit_code();
        (outcome, code)
    }

    fn auto_select_enabled(&self, invocation: &ToolInvocation) -> bool {
        self.auto_select && invocation.auto_select != Some(false)
    }

    /// Candidate profiles in descending priority order; first prompt match
    /// wins.
    fn match_profile(&self, prompt: &str) -> Option<&ProfileSpec> {
        let mut candidates: Vec<&ProfileSpec> = self.profiles.iter().collect();
        candidates.sort_by_key(|p| std::cmp::Reverse(p.priority));
        candidates.into_iter().find(|p| p.matches_prompt(prompt))
    }

    /// The tier of the skill that registered the blocking rule for
    /// `intent`, searched along the session chain. Rules with no
    /// registering skill get the default (hard) tier — conservative.
    fn tier_for(&self, intent: &str, session: &SessionState) -> EnforcementTier {
        session
            .chain
            .iter()
            .filter_map(|name| self.skills.iter().find(|s| &s.name == name))
            .find(|skill| skill.blocks_intent(intent))
            .map(|skill| skill.tier)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

fn allowed_message(session: &SessionState, activated: bool) -> String {
    let mut out = String::new();
    if activated {
        out.push_str(&format!(
            "hookguard: activated profile '{}' ({})\n",
            session.profile_id, session.strictness
        ));
    }
    out.push_str(&format!("Profile: {}", session.profile_id));
    if let Some(skill) = session.current_skill() {
        out.push_str(&format!("\nCurrent skill: {skill}"));
    }
    if session.is_complete() {
        out.push_str("\nCOMPLETE: all required capabilities satisfied");
    } else {
        let remaining = session.remaining_capabilities().join(", ");
        out.push_str(&format!("\nRemaining capabilities: {remaining}"));
    }
    out
}

fn blocked_message(session: &SessionState, blocked: &[BlockedIntent]) -> String {
    let mut out = String::from("CHAIN ENFORCEMENT: BLOCKED\n\n");
    out.push_str("The active workflow blocks this tool call:\n");
    for b in blocked {
        out.push_str(&format!("  - {}: {}\n", b.intent, b.reason));
    }
    out.push_str(&format!("\nProfile: {}", session.profile_id));
    if let Some(skill) = session.current_skill() {
        out.push_str(&format!(" | current skill: {skill}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
