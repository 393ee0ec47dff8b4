// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource identifiers derived from (user, project) path segments

use std::fmt;
use thiserror::Error;

/// Longest accepted segment, in bytes
pub const MAX_SEGMENT_LEN: usize = 128;

/// Errors from identifier derivation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("{segment} segment is empty")]
    Empty { segment: &'static str },
    #[error("{segment} segment exceeds {MAX_SEGMENT_LEN} bytes")]
    TooLong { segment: &'static str },
    #[error("{segment} segment may not start with '.'")]
    LeadingDot { segment: &'static str },
    #[error("{segment} segment contains invalid character {ch:?}")]
    InvalidChar { segment: &'static str, ch: char },
}

/// Normalized key addressing one state document and its lock
///
/// Segments are restricted to `[A-Za-z0-9._-]` and may not start with a dot,
/// so a segment can never be `.`, `..`, a path separator, or collide with the
/// store's temporary files. Joining with `/` keeps derivation injective.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    user: String,
    project: String,
}

impl ResourceId {
    /// Derive an identifier from caller-supplied segments
    pub fn derive(user: &str, project: &str) -> Result<Self, IdError> {
        validate_segment("user", user)?;
        validate_segment("project", project)?;
        Ok(Self {
            user: user.to_string(),
            project: project.to_string(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.project)
    }
}

fn validate_segment(segment: &'static str, value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty { segment });
    }
    if value.len() > MAX_SEGMENT_LEN {
        return Err(IdError::TooLong { segment });
    }
    if value.starts_with('.') {
        return Err(IdError::LeadingDot { segment });
    }
    if let Some(ch) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(IdError::InvalidChar { segment, ch });
    }
    Ok(())
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
