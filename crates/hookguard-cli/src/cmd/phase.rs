use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use hookguard_core::io::atomic_write;
use hookguard_core::paths;
use hookguard_core::phase::{PhaseEvent, TddContext};
use hookguard_core::types::TddPhase;
use std::path::Path;

#[derive(Subcommand)]
pub enum PhaseSubcommand {
    /// Show the persisted phase context
    Show,

    /// Send an event to the automaton (test-written, test-passed,
    /// refactor-done, new-feature); invalid events are no-ops
    Event { name: String },

    /// Force the phase unconditionally
    Force { phase: String },

    /// Return to blocked and zero the context
    Reset,
}

fn load_context(root: &Path) -> TddContext {
    let path = paths::phase_path(root);
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|data| serde_json::from_str(&data).ok())
        .unwrap_or_default()
}

fn save_context(root: &Path, ctx: &TddContext) -> anyhow::Result<()> {
    let data = serde_json::to_string_pretty(ctx)?;
    atomic_write(&paths::phase_path(root), data.as_bytes())
        .context("failed to persist phase context")?;
    Ok(())
}

fn parse_event(name: &str) -> anyhow::Result<PhaseEvent> {
    match name {
        "test-written" | "test_written" => Ok(PhaseEvent::TestWritten),
        "test-passed" | "test_passed" => Ok(PhaseEvent::TestPassed),
        "refactor-done" | "refactor_done" => Ok(PhaseEvent::RefactorDone),
        "new-feature" | "new_feature" => Ok(PhaseEvent::NewFeature),
        other => anyhow::bail!("unknown event: {other}"),
    }
}

pub fn run(root: &Path, subcommand: PhaseSubcommand, json: bool) -> anyhow::Result<i32> {
    let mut ctx = load_context(root);

    match subcommand {
        PhaseSubcommand::Show => {}
        PhaseSubcommand::Event { name } => {
            let before = ctx.phase;
            let after = ctx.apply(parse_event(&name)?);
            save_context(root, &ctx)?;
            if !json && before == after {
                eprintln!("event '{name}' is a no-op in phase '{before}'");
            }
        }
        PhaseSubcommand::Force { phase } => {
            let target: TddPhase = phase.parse()?;
            ctx.apply(PhaseEvent::ForcePhase { phase: target });
            save_context(root, &ctx)?;
        }
        PhaseSubcommand::Reset => {
            ctx.apply(PhaseEvent::Reset);
            save_context(root, &ctx)?;
        }
    }

    if json {
        print_json(&ctx)?;
    } else {
        println!("Phase:    {}", ctx.phase);
        println!("Attempts: {}", ctx.attempt_count);
        if let Some(ref err) = ctx.last_error {
            println!("Error:    {err}");
        }
        if let Some(ref f) = ctx.test_file {
            println!("Test:     {f}");
        }
        if let Some(ref f) = ctx.impl_file {
            println!("Impl:     {f}");
        }
    }

    Ok(0)
}
