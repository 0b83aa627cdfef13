// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt construction for each phase of a feature run.

use automaker_core::Feature;

const SYSTEM_PROMPT: &str = "You are an autonomous coding agent working inside a git worktree. \
Make the minimal, correct change for the described feature, then report your status by \
updating feature_list.json directly.";

pub fn system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// The action-phase prompt: description, ordered steps, and any attached
/// image references.
pub fn action_prompt(feature: &Feature) -> String {
    let mut prompt = String::new();
    prompt.push_str(&feature.description);
    prompt.push('\n');
    if !feature.steps.is_empty() {
        prompt.push_str("\nSteps:\n");
        for (index, step) in feature.steps.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", index + 1, step));
        }
    }
    if !feature.image_paths.is_empty() {
        prompt.push_str("\nAttached images:\n");
        for image in &feature.image_paths {
            prompt.push_str(&format!("- {} ({})\n", image.filename, image.path));
        }
    }
    prompt
}

/// The follow-up prompt is the user's own text, unmodified.
pub fn follow_up_prompt(user_prompt: &str) -> String {
    user_prompt.to_string()
}

pub fn resume_prompt(feature: &Feature) -> String {
    format!("Continue working on: {}", feature.description)
}

/// A dedicated verification prompt, used by verify-only runs.
pub fn verify_prompt(feature: &Feature) -> String {
    format!(
        "Verify that the following feature is fully and correctly implemented, running any \
         relevant tests. Update feature_list.json's status to \"verified\" only if it passes.\n\n{}",
        feature.description
    )
}

/// The prompt used when asking the agent to produce a commit.
pub fn commit_prompt() -> String {
    "Stage and commit the current changes with a concise, descriptive commit message.".to_string()
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
