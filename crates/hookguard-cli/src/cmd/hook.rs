use crate::output::print_json;
use anyhow::Context;
use hookguard_core::classifier::ToolInvocation;
use hookguard_core::enforcement::EnforcementEngine;
use hookguard_core::session::SessionState;
use hookguard_core::{paths, skill};
use std::io::Read;
use std::path::Path;

/// Hook-protocol entry: read one JSON tool invocation from stdin, render a
/// verdict, persist any session the check created or mutated, and exit 0
/// (advisory on stdout) or 1 (banner on stderr).
pub fn run(root: &Path, no_auto_select: bool, json: bool) -> anyhow::Result<i32> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let invocation: ToolInvocation =
        serde_json::from_str(&input).context("invalid hook payload on stdin")?;

    // Unreadable skill/profile definitions are a config error and surface
    // as one; a missing/corrupt session file fails open inside load().
    let skills = skill::load_skills(&paths::skills_dir(root))
        .context("failed to load skill definitions")?;
    let profiles = skill::load_profiles(&paths::profiles_dir(root))
        .context("failed to load profile definitions")?;
    let session = SessionState::load(root);

    let engine = EnforcementEngine::new(skills, profiles).with_auto_select(!no_auto_select);
    let (outcome, code) = engine.check_with_exit_code(&invocation, session);

    if let Some(session) = &outcome.session {
        session
            .save(root)
            .context("failed to persist session state")?;
    }

    if json {
        print_json(&outcome.verdict)?;
    } else if outcome.verdict.allowed {
        println!("{}", outcome.verdict.message);
    } else {
        eprintln!("{}", outcome.verdict.message);
    }

    Ok(code)
}
