// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::validation::ValidationIssue;
use thiserror::Error;

/// Result type for scene description operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating a scene description
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scene description failed validation ({} issue(s)): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationIssue>),
}

impl Error {
    /// Validation issues carried by this error, empty for other kinds
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Error::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .take(3)
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
