// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the contract pipeline.
///
/// Every variant names the stage that failed; provider errors are folded
/// into the message so operators can tell validation, encryption, signing
/// and resolution failures apart without reading backend output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("required parameter is empty")]
    EmptyParameter,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("password decryption failed: {0}")]
    PasswordDecryptionFailed(String),

    #[error("payload decryption failed: {0}")]
    PayloadDecryptionFailed(String),

    #[error("contract validation failed: {0}")]
    SchemaValidationFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    #[error("certificate has already expired on {0}")]
    CertificateExpired(String),

    #[error("certificate parsing failed: {0}")]
    CertificateParseFailed(String),

    #[error("unknown platform: {0}")]
    InvalidPlatform(String),

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("YAML processing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
