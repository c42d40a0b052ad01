// SPDX-License-Identifier: MIT

//! Final report assembly

use crate::critic::task::{TaskOutcome, TaskResult};

const SECTION_SEPARATOR: &str = "\n\n";

/// Join task outputs into one report, in the given order.
///
/// Failed tasks show up as an inline `[<task> failed: <reason>]` marker.
pub fn aggregate(results: &[TaskResult]) -> String {
    results
        .iter()
        .map(render_section)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

fn render_section(result: &TaskResult) -> String {
    match &result.outcome {
        TaskOutcome::Completed(text) => text.clone(),
        TaskOutcome::Failed(reason) => format!("[{} failed: {}]", result.task, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critic::task::TaskName;

    #[test]
    fn test_sections_in_order() {
        let report = aggregate(&[
            TaskResult::completed("1", TaskName::Roast, "ROAST TEXT"),
            TaskResult::completed("2", TaskName::Feedback, "FEEDBACK TEXT"),
        ]);
        assert_eq!(report, "ROAST TEXT\n\nFEEDBACK TEXT");
    }

    #[test]
    fn test_failure_marker_inline() {
        let report = aggregate(&[
            TaskResult::completed("1", TaskName::Roast, "r"),
            TaskResult::failed("2", TaskName::Appreciation, "quota exceeded"),
            TaskResult::completed("3", TaskName::Feedback, "f"),
        ]);
        assert_eq!(report, "r\n\n[appreciation failed: quota exceeded]\n\nf");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(aggregate(&[]), "");
    }
}
