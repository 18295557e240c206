// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! The latest-matching-version rule shared by every artifact resolver.

use std::collections::HashMap;

use semver::{Version, VersionReq};

use crate::{Error, Result};

/// Parse a version constraint. The empty constraint accepts everything;
/// otherwise the `semver` crate's range syntax applies (`>=`, `~`,
/// comma-separated conjunctions; a bare version is a caret range).
pub(crate) fn parse_constraint(constraint: &str) -> Result<VersionReq> {
    if constraint.trim().is_empty() {
        return Ok(VersionReq::STAR);
    }

    VersionReq::parse(constraint)
        .map_err(|e| Error::InvalidVersion(format!("constraint {constraint:?}: {e}")))
}

/// Resolve the highest-versioned entry of `candidates` satisfying
/// `constraint`.
///
/// Every key must parse as a semantic version; the first unparsable key
/// aborts the resolution. Map-key uniqueness rules out ties.
pub fn resolve_latest<'a, T>(
    candidates: &'a HashMap<String, T>,
    constraint: &str,
) -> Result<(Version, &'a T)> {
    let requirement = parse_constraint(constraint)?;

    let mut parsed = Vec::with_capacity(candidates.len());
    for (key, payload) in candidates {
        let version =
            Version::parse(key).map_err(|e| Error::InvalidVersion(format!("{key}: {e}")))?;
        parsed.push((version, payload));
    }

    parsed
        .into_iter()
        .filter(|(version, _)| requirement.matches(version))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .ok_or_else(|| Error::NoMatchingVersion(constraint.to_string()))
}
