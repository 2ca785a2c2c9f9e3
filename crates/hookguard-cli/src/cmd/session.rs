use crate::output::print_json;
use clap::Subcommand;
use hookguard_core::session::SessionState;
use std::path::Path;

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Show the active session
    Show,

    /// Deactivate the current session
    Clear,
}

pub fn run(root: &Path, subcommand: SessionSubcommand, json: bool) -> anyhow::Result<i32> {
    match subcommand {
        SessionSubcommand::Show => match SessionState::load(root) {
            Some(session) => {
                if json {
                    print_json(&session)?;
                } else {
                    println!("Session:  {}", session.session_id);
                    println!("Profile:  {}", session.profile_id);
                    println!("Chain:    {}", session.chain.join(" -> "));
                    if let Some(skill) = session.current_skill() {
                        println!("Current:  {skill}");
                    }
                    let remaining = session.remaining_capabilities();
                    if remaining.is_empty() {
                        println!("Status:   COMPLETE");
                    } else {
                        println!("Pending:  {}", remaining.join(", "));
                    }
                    if !session.blocked_intents.is_empty() {
                        println!("Blocked:");
                        for (intent, reason) in &session.blocked_intents {
                            println!("  {intent}: {reason}");
                        }
                    }
                }
            }
            None => println!("No active session"),
        },
        SessionSubcommand::Clear => {
            SessionState::clear(root)?;
            if !json {
                println!("Session cleared");
            }
        }
    }
    Ok(0)
}
