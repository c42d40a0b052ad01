// SPDX-License-Identifier: MIT

//! Agent development kit - model providers, tool declarations and errors

pub mod error;
pub mod model;
pub mod tool;
