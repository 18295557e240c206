// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Encryption-certificate retrieval and fleet validation.
//!
//! Certificates are published per platform version under a fixed URL
//! scheme. Download is a plain blocking GET with a HEAD existence probe
//! first; nothing is cached, every call re-fetches.

use std::collections::BTreeMap;

use contract::certificate::{self, CertificateValidity};
use crypto::CryptoProvider;
use log::debug;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{version, Error, Result};

/// Where the platform publishes its per-version encryption certificates.
/// `{major}`, `{minor}` and `{patch}` are substituted from the version.
pub const DEFAULT_CERT_URL_TEMPLATE: &str = "https://hpvsvpcubuntu.s3.us.cloud-object-storage.appdomain.cloud/s390x-{patch}/ibm-hyper-protect-container-runtime-{major}-{minor}-s390x-{patch}-encrypt.crt";

/// One entry of the canonical version-keyed certificate document.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct CertificateEntry {
    pub cert: String,
}

/// Validity report for one version of the certificate fleet.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct CertificateReport {
    pub cert: String,
    #[serde(flatten)]
    pub validity: CertificateValidity,
}

fn render_url(template: &str, version: &Version) -> String {
    template
        .replace("{major}", &version.major.to_string())
        .replace("{minor}", &version.minor.to_string())
        .replace("{patch}", &version.patch.to_string())
}

/// Download the encryption certificates for the given versions.
///
/// Each version is first probed with a HEAD request; a missing artifact
/// aborts the whole download so callers never get a partial fleet.
pub fn download_certificates(
    versions: &[String],
    url_template: Option<&str>,
) -> Result<BTreeMap<String, CertificateEntry>> {
    if versions.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let template = url_template
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CERT_URL_TEMPLATE);
    let client = reqwest::blocking::Client::new();

    let mut fleet = BTreeMap::new();
    for version_str in versions {
        let version = Version::parse(version_str)
            .map_err(|e| Error::InvalidVersion(format!("{version_str}: {e}")))?;
        let url = render_url(template, &version);
        debug!("fetching encryption certificate from {url}");

        let head = client
            .head(&url)
            .send()
            .map_err(|e| Error::Download(format!("HEAD {url}: {e}")))?;
        if !head.status().is_success() {
            return Err(Error::NotFound(url));
        }

        let cert = client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| Error::Download(format!("GET {url}: {e}")))?;

        fleet.insert(version_str.clone(), CertificateEntry { cert });
    }

    Ok(fleet)
}

/// Resolve the certificate for the latest version satisfying `constraint`
/// from a version-keyed JSON document.
pub fn certificate_from_json(json: &str, constraint: &str) -> Result<(String, String)> {
    if json.is_empty() || constraint.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let fleet: std::collections::HashMap<String, CertificateEntry> = serde_json::from_str(json)?;
    let (version, entry) = version::resolve_latest(&fleet, constraint)?;

    Ok((version.to_string(), entry.cert.clone()))
}

/// Classify every certificate of a version-keyed JSON document.
pub fn validate_certificates(
    provider: &dyn CryptoProvider,
    json: &str,
) -> Result<BTreeMap<String, CertificateReport>> {
    let fleet: BTreeMap<String, CertificateEntry> = serde_json::from_str(json)?;
    if fleet.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let mut report = BTreeMap::new();
    for (version, entry) in fleet {
        let validity = certificate::check_validity(provider, &entry.cert)?;
        report.insert(
            version,
            CertificateReport {
                cert: entry.cert,
                validity,
            },
        );
    }

    Ok(report)
}
