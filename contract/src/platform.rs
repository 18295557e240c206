// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Target platform registry and schema selection.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// The confidential-computing platform variant a contract targets.
///
/// The platform selects the contract schema. `hpcc-peerpod` deployments
/// validate against the hpvs schema.
#[derive(
    EnumString, AsRefStr, Display, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum Platform {
    #[default]
    #[strum(serialize = "hpvs")]
    #[serde(rename = "hpvs")]
    Hpvs,

    #[strum(serialize = "hpcr-rhvs")]
    #[serde(rename = "hpcr-rhvs")]
    HpcrRhvs,

    #[strum(serialize = "hpcc-peerpod")]
    #[serde(rename = "hpcc-peerpod")]
    HpccPeerPod,
}

impl Platform {
    /// Resolve a platform identifier. The empty string selects the default
    /// platform; anything else unknown is [`Error::InvalidPlatform`].
    pub fn resolve(identifier: &str) -> Result<Self> {
        if identifier.is_empty() {
            return Ok(Self::default());
        }

        identifier
            .parse()
            .map_err(|_| Error::InvalidPlatform(identifier.to_string()))
    }

    pub(crate) fn contract_schema(&self) -> &'static str {
        match self {
            Platform::Hpvs | Platform::HpccPeerPod => include_str!("../schemas/hpvs.json"),
            Platform::HpcrRhvs => include_str!("../schemas/hpcr-rhvs.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", Platform::Hpvs)]
    #[case("hpvs", Platform::Hpvs)]
    #[case("hpcr-rhvs", Platform::HpcrRhvs)]
    #[case("hpcc-peerpod", Platform::HpccPeerPod)]
    fn resolves_known_identifiers(#[case] identifier: &str, #[case] expected: Platform) {
        assert_eq!(Platform::resolve(identifier).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_identifier() {
        assert!(matches!(
            Platform::resolve("hpvs-classic"),
            Err(Error::InvalidPlatform(_))
        ));
    }

    #[test]
    fn peerpod_shares_the_hpvs_schema() {
        assert_eq!(
            Platform::HpccPeerPod.contract_schema(),
            Platform::Hpvs.contract_schema()
        );
        assert_ne!(
            Platform::HpcrRhvs.contract_schema(),
            Platform::Hpvs.contract_schema()
        );
    }
}
