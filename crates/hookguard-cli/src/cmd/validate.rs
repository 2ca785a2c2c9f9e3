use crate::output::print_json;
use anyhow::Context;
use hookguard_core::compliance::{run_feedback_loop, FeedbackLoopConfig};
use std::io::Read;

pub fn run(
    required: &[String],
    suggested: &[String],
    max_retries: u32,
    attempt: u32,
    text: Option<String>,
    json: bool,
) -> anyhow::Result<i32> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let config = FeedbackLoopConfig {
        required_skills: required.to_vec(),
        suggested_skills: suggested.to_vec(),
        max_retries,
    };
    let result = run_feedback_loop(&text, &config, attempt);

    if json {
        print_json(&result)?;
    } else if result.compliant {
        println!("compliant");
    } else {
        match &result.retry_prompt {
            Some(prompt) => eprintln!("{prompt}"),
            None => eprintln!(
                "non-compliant after {} attempts; missing: {}",
                result.attempt_number,
                result.missing_skills.join(", ")
            ),
        }
    }

    Ok(if result.compliant { 0 } else { 1 })
}
