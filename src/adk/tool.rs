// SPDX-License-Identifier: MIT

use serde_json::Value;

/// A function the model may ask to call.
///
/// Tools here are declarations only: the model sees the name, description and
/// schema, and the caller that declared the tool decides how a requested call
/// gets executed.
///
/// `name()`, `description()` and `schema()` return references; implementations
/// store these values in struct fields or statics.
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within one request)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;
}
