use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use hookguard_core::sandbox::{is_command_allowed, is_write_allowed, SandboxConfig};
use hookguard_core::types::TddPhase;
use hookguard_core::{paths, skill};
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum SandboxSubcommand {
    /// Check a shell command against the active phase policy
    Command {
        command: String,

        /// Skill whose sandbox config to use
        #[arg(long)]
        skill: String,
    },

    /// Check a file write path against the active phase policy
    Write {
        path: String,

        /// Skill whose sandbox config to use
        #[arg(long)]
        skill: String,
    },
}

#[derive(Serialize)]
struct SandboxCheck<'a> {
    allowed: bool,
    phase: TddPhase,
    policy: &'a str,
    subject: &'a str,
}

/// The phase policy in effect: the persisted phase when one exists,
/// otherwise the config's own state.
fn active_phase(root: &Path, config: &SandboxConfig) -> TddPhase {
    std::fs::read_to_string(paths::phase_path(root))
        .ok()
        .and_then(|data| {
            serde_json::from_str::<hookguard_core::phase::TddContext>(&data)
                .ok()
                .map(|ctx| ctx.phase)
        })
        .unwrap_or(config.state)
}

pub fn run(root: &Path, subcommand: SandboxSubcommand, json: bool) -> anyhow::Result<i32> {
    let (skill_name, subject, is_command) = match &subcommand {
        SandboxSubcommand::Command { command, skill } => (skill.clone(), command.clone(), true),
        SandboxSubcommand::Write { path, skill } => (skill.clone(), path.clone(), false),
    };

    let skills = skill::load_skills(&paths::skills_dir(root))
        .context("failed to load skill definitions")?;
    let spec = skill::find_skill(&skills, &skill_name)?;
    let config = spec
        .sandbox
        .as_ref()
        .with_context(|| format!("skill '{skill_name}' declares no sandbox config"))?;

    let phase = active_phase(root, config);
    // No policy declared for the current phase means deny: the skill
    // restricted some phases and said nothing about this one.
    let (allowed, policy_name) = match config.policy_for(phase) {
        Some(policy) => {
            let allowed = if is_command {
                is_command_allowed(&subject, policy)
            } else {
                is_write_allowed(&subject, policy)
            };
            (allowed, policy.name.as_str())
        }
        None => (false, ""),
    };

    let check = SandboxCheck {
        allowed,
        phase,
        policy: policy_name,
        subject: &subject,
    };

    if json {
        print_json(&check)?;
    } else if allowed {
        println!("allowed ({} policy, phase {})", check.policy, check.phase);
    } else {
        eprintln!("denied (phase {})", check.phase);
    }

    Ok(if allowed { 0 } else { 1 })
}
