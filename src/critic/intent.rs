// SPDX-License-Identifier: MIT

//! Keyword routing from a free-form instruction to an ordered task list

use crate::critic::task::TaskName;
use once_cell::sync::Lazy;
use regex::Regex;

/// Whole-word keyword patterns, in scan order
static KEYWORD_PATTERNS: Lazy<Vec<(TaskName, Regex)>> = Lazy::new(|| {
    TaskName::ALL
        .into_iter()
        .filter_map(|task| {
            // Keywords are fixed ASCII words, so the pattern always compiles
            Regex::new(&format!(r"\b{}\b", regex::escape(task.keyword())))
                .ok()
                .map(|re| (task, re))
        })
        .collect()
});

/// Task run when the instruction names none
pub const DEFAULT_TASK: TaskName = TaskName::Feedback;

/// Detect which tasks an instruction asks for.
///
/// Output follows the fixed scan order (roast, appreciation, feedback), not the
/// order the words appear in. Each task appears at most once and the result is
/// never empty: an instruction with no keyword yields `[Feedback]`.
pub fn detect(instruction: &str) -> Vec<TaskName> {
    let lowered = instruction.to_lowercase();
    let tasks: Vec<TaskName> = KEYWORD_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(task, _)| *task)
        .collect();

    if tasks.is_empty() {
        log::info!("No task keyword in instruction, defaulting to {}", DEFAULT_TASK);
        vec![DEFAULT_TASK]
    } else {
        tasks
    }
}
