//! Response compliance validation — scans agent-generated text for the
//! skill invocations a profile requires, and drives a bounded
//! retry/feedback loop. The loop never re-invokes anything itself: the
//! caller re-runs the agent and increments the attempt counter.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceValidation {
    pub has_required_skill_calls: bool,
    pub missing_skills: Vec<String>,
    pub extraneous_calls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_retry_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackLoopResult {
    pub compliant: bool,
    pub missing_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<String>,
    pub attempt_number: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackLoopConfig {
    pub required_skills: Vec<String>,
    pub suggested_skills: Vec<String>,
    pub max_retries: u32,
}

// ---------------------------------------------------------------------------
// Skill call extraction
// ---------------------------------------------------------------------------

static CALL_RE: OnceLock<Regex> = OnceLock::new();

/// The textual call forms recognized as a skill invocation:
/// `Skill(name)` and `skill: name`.
fn call_re() -> &'static Regex {
    CALL_RE.get_or_init(|| {
        Regex::new(r"(?i)\bskill\s*[:(]\s*([a-z0-9][a-z0-9_\-]*)\s*\)?").unwrap()
    })
}

/// Every skill name invoked in `text`, in order of first appearance,
/// deduplicated.
pub fn extract_skill_calls(text: &str) -> Vec<String> {
    let mut calls = Vec::new();
    for capture in call_re().captures_iter(text) {
        let name = capture[1].to_lowercase();
        if !calls.contains(&name) {
            calls.push(name);
        }
    }
    calls
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that every required skill was invoked in the generated text.
/// `missing_skills` preserves the required order; `extraneous_calls` are
/// invocations outside both the required and suggested lists.
pub fn validate_response(
    text: &str,
    required: &[String],
    suggested: &[String],
) -> ComplianceValidation {
    let invoked = extract_skill_calls(text);

    let missing_skills: Vec<String> = required
        .iter()
        .filter(|r| !invoked.iter().any(|i| i == &r.to_lowercase()))
        .cloned()
        .collect();

    let extraneous_calls: Vec<String> = invoked
        .iter()
        .filter(|i| {
            !required.iter().any(|r| &r.to_lowercase() == *i)
                && !suggested.iter().any(|s| &s.to_lowercase() == *i)
        })
        .cloned()
        .collect();

    let has_required_skill_calls = missing_skills.is_empty();
    let suggested_retry_prompt = if has_required_skill_calls {
        None
    } else {
        Some(generate_retry_prompt(&missing_skills, 0, 0))
    };

    ComplianceValidation {
        has_required_skill_calls,
        missing_skills,
        extraneous_calls,
        suggested_retry_prompt,
    }
}

/// Retry while non-compliant and strictly under the cap. Reaching the cap
/// stops retries even while still non-compliant — a terminal failure, not
/// a silent pass.
pub fn should_retry(validation: &ComplianceValidation, attempt: u32, max_retries: u32) -> bool {
    !validation.has_required_skill_calls && attempt < max_retries
}

/// Deterministic retry prompt listing every missing skill with the
/// attempt counter. Counters of zero render without the "attempt" line.
pub fn generate_retry_prompt(missing: &[String], attempt: u32, max_retries: u32) -> String {
    let mut out = String::from("COMPLIANCE ERROR: required skill invocations are missing.\n\n");
    out.push_str("You must invoke the following skills before proceeding:\n");
    for skill in missing {
        out.push_str(&format!("  - Skill({skill})\n"));
    }
    if max_retries > 0 {
        out.push_str(&format!("\nAttempt {attempt}/{max_retries}."));
    }
    out
}

// ---------------------------------------------------------------------------
// Feedback loop
// ---------------------------------------------------------------------------

/// One turn of the feedback loop. Performs no retry itself; the caller
/// re-invokes the agent with `retry_prompt` and an incremented
/// `attempt_number`. Exhaustion yields `compliant: false` with no prompt.
pub fn run_feedback_loop(
    text: &str,
    config: &FeedbackLoopConfig,
    attempt_number: u32,
) -> FeedbackLoopResult {
    let validation = validate_response(text, &config.required_skills, &config.suggested_skills);

    let retry_prompt = if should_retry(&validation, attempt_number, config.max_retries) {
        Some(generate_retry_prompt(
            &validation.missing_skills,
            attempt_number,
            config.max_retries,
        ))
    } else {
        None
    };

    FeedbackLoopResult {
        compliant: validation.has_required_skill_calls,
        missing_skills: validation.missing_skills,
        retry_prompt,
        attempt_number,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn required(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_call_forms() {
        let text = "First I'll use Skill(tdd), then skill: security-check.";
        assert_eq!(extract_skill_calls(text), vec!["tdd", "security-check"]);
    }

    #[test]
    fn extraction_dedups_preserving_order() {
        let text = "Skill(tdd) and again Skill(tdd) then Skill(review)";
        assert_eq!(extract_skill_calls(text), vec!["tdd", "review"]);
    }

    #[test]
    fn compliant_when_all_required_invoked() {
        let v = validate_response(
            "Invoking Skill(tdd) before writing code.",
            &required(&["tdd"]),
            &[],
        );
        assert!(v.has_required_skill_calls);
        assert!(v.missing_skills.is_empty());
        assert!(v.suggested_retry_prompt.is_none());
    }

    #[test]
    fn missing_skills_preserve_required_order() {
        let v = validate_response(
            "Skill(review) only.",
            &required(&["tdd", "security", "review"]),
            &[],
        );
        assert!(!v.has_required_skill_calls);
        assert_eq!(v.missing_skills, vec!["tdd", "security"]);
        assert!(v.suggested_retry_prompt.is_some());
    }

    #[test]
    fn extraneous_calls_exclude_suggested() {
        let v = validate_response(
            "Skill(tdd) Skill(review) Skill(rogue)",
            &required(&["tdd"]),
            &required(&["review"]),
        );
        assert!(v.has_required_skill_calls);
        assert_eq!(v.extraneous_calls, vec!["rogue"]);
    }

    // Scenario: non-compliant first attempt produces a retry prompt with
    // the counter; at the cap the loop stops without one.
    #[test]
    fn feedback_loop_scenario() {
        let config = FeedbackLoopConfig {
            required_skills: required(&["tdd"]),
            suggested_skills: vec![],
            max_retries: 3,
        };

        let result = run_feedback_loop("I will implement directly.", &config, 1);
        assert!(!result.compliant);
        assert_eq!(result.missing_skills, vec!["tdd"]);
        assert_eq!(result.attempt_number, 1);
        let prompt = result.retry_prompt.unwrap();
        assert!(prompt.contains("COMPLIANCE ERROR"));
        assert!(prompt.contains("1/3"));

        // at the cap: still non-compliant, but no retry
        let result = run_feedback_loop("I will implement directly.", &config, 3);
        assert!(!result.compliant);
        assert!(result.retry_prompt.is_none());
        assert_eq!(result.attempt_number, 3);
    }

    #[test]
    fn should_retry_is_strict() {
        let v = validate_response("nothing", &required(&["tdd"]), &[]);
        assert!(should_retry(&v, 0, 3));
        assert!(should_retry(&v, 2, 3));
        assert!(!should_retry(&v, 3, 3));
        assert!(!should_retry(&v, 4, 3));

        let compliant = validate_response("Skill(tdd)", &required(&["tdd"]), &[]);
        assert!(!should_retry(&compliant, 0, 3));
    }

    #[test]
    fn compliant_loop_has_no_prompt() {
        let config = FeedbackLoopConfig {
            required_skills: required(&["tdd"]),
            suggested_skills: vec![],
            max_retries: 3,
        };
        let result = run_feedback_loop("Skill(tdd) first.", &config, 1);
        assert!(result.compliant);
        assert!(result.missing_skills.is_empty());
        assert!(result.retry_prompt.is_none());
    }

    #[test]
    fn retry_prompt_lists_every_missing_skill() {
        let prompt = generate_retry_prompt(&required(&["tdd", "security"]), 2, 5);
        assert!(prompt.contains("Skill(tdd)"));
        assert!(prompt.contains("Skill(security)"));
        assert!(prompt.contains("2/5"));
    }

    #[test]
    fn no_required_skills_is_trivially_compliant() {
        let v = validate_response("anything", &[], &[]);
        assert!(v.has_required_skill_calls);
        let config = FeedbackLoopConfig::default();
        assert!(run_feedback_loop("anything", &config, 0).compliant);
    }
}
