// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Encryption-certificate validity checking.
//!
//! Validity is always computed against the supplied evaluation time, never
//! cached. A certificate inside the warning window keeps status `valid`;
//! only the message text carries the warning.

use chrono::{DateTime, Utc};
use crypto::CryptoProvider;
use log::warn;
use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::{Error, Result};

/// Days before expiry at which the checker starts warning.
pub const EXPIRY_WARNING_DAYS: i64 = 180;

const EXPIRY_DATE_FORMAT: &str = "%d-%m-%y %H:%M:%S";

#[derive(AsRefStr, Display, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[strum(serialize = "valid")]
    Valid,
    #[strum(serialize = "expired")]
    Expired,
}

/// Classification of a certificate relative to an evaluation time.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct CertificateValidity {
    pub status: CertificateStatus,
    /// Whole days until `notAfter`; negative once expired.
    #[serde(rename = "expiryDays")]
    pub days_left: i64,
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    /// Warning or expiry text; `None` for a certificate comfortably valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Classify `certificate_pem` relative to `now`.
pub fn check_validity_at(
    provider: &dyn CryptoProvider,
    certificate_pem: &str,
    now: DateTime<Utc>,
) -> Result<CertificateValidity> {
    let not_after = provider
        .certificate_not_after(certificate_pem)
        .map_err(|e| Error::CertificateParseFailed(format!("{e:#}")))?;

    let days_left = (not_after - now).num_days();
    let expiry_date = format!("{} GMT", not_after.format(EXPIRY_DATE_FORMAT));

    let validity = if not_after < now {
        CertificateValidity {
            status: CertificateStatus::Expired,
            days_left,
            message: Some(format!(
                "certificate has already expired on {expiry_date}"
            )),
            expiry_date,
        }
    } else if days_left < EXPIRY_WARNING_DAYS {
        CertificateValidity {
            status: CertificateStatus::Valid,
            days_left,
            message: Some(format!(
                "Warning: certificate will expire in {days_left} days (on {expiry_date})"
            )),
            expiry_date,
        }
    } else {
        CertificateValidity {
            status: CertificateStatus::Valid,
            days_left,
            message: None,
            expiry_date,
        }
    };

    Ok(validity)
}

/// Classify `certificate_pem` relative to the current time.
pub fn check_validity(
    provider: &dyn CryptoProvider,
    certificate_pem: &str,
) -> Result<CertificateValidity> {
    check_validity_at(provider, certificate_pem, Utc::now())
}

/// Gate used before any contract encryption: an expired encryption
/// certificate aborts the pipeline, a soon-to-expire one is logged and the
/// warning text returned.
pub fn ensure_usable_for_encryption(
    provider: &dyn CryptoProvider,
    certificate_pem: &str,
) -> Result<Option<String>> {
    let validity = check_validity(provider, certificate_pem)?;

    match validity.status {
        CertificateStatus::Expired => Err(Error::CertificateExpired(validity.expiry_date)),
        CertificateStatus::Valid => {
            if let Some(message) = &validity.message {
                warn!("{message}");
            }
            Ok(validity.message)
        }
    }
}
