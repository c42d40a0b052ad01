// SPDX-License-Identifier: MIT

//! resume-critic: routes a resume through appreciation, roast and feedback
//! passes and aggregates the model output into a single report.

pub mod adk;
pub mod critic;
