// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Contract assembly: validation, section encryption, signing-credential
//! injection and the detached signature over the encrypted sections.

use base64::{engine::general_purpose::STANDARD, Engine};
use crypto::{CryptoProvider, CsrSubject};
use serde::{Deserialize, Serialize};

use crate::{certificate, envelope::Envelope, schema, Error, Platform, Result};

/// Key injected into the `env` sub-document carrying the signing
/// credential the execution environment verifies the signature with.
pub const SIGNING_KEY: &str = "signingKey";

/// A contract as handed in by the caller. The `workload` and `env`
/// sections stay opaque YAML strings until schema validation has passed.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct UnsignedContract {
    pub workload: String,
    pub env: String,

    #[serde(
        rename = "attestationPublicKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attestation_public_key: Option<String>,

    #[serde(
        rename = "envWorkloadSignature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub env_workload_signature: Option<String>,
}

/// The final signed document. `env_workload_signature` verifies against
/// the exact concatenation of the encrypted `workload` and `env` strings.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct SignedContract {
    pub workload: String,
    pub env: String,

    #[serde(rename = "envWorkloadSignature")]
    pub env_workload_signature: String,

    #[serde(
        rename = "attestationPublicKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attestation_public_key: Option<String>,
}

impl SignedContract {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(document: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(document)?)
    }
}

/// Validate, encrypt and sign a contract for `platform`.
///
/// The signing credential embedded into `env` is the public key derived
/// from `private_key`.
pub fn sign_and_encrypt(
    provider: &dyn CryptoProvider,
    contract: &str,
    platform: Platform,
    encryption_certificate: &str,
    private_key: &str,
) -> Result<SignedContract> {
    if contract.is_empty() || encryption_certificate.is_empty() || private_key.is_empty() {
        return Err(Error::EmptyParameter);
    }

    schema::validate_contract(contract, platform)?;
    certificate::ensure_usable_for_encryption(provider, encryption_certificate)?;

    let credential = provider
        .public_key_from_private(private_key)
        .map_err(|e| Error::SigningFailed(format!("public key derivation: {e:#}")))?;

    encrypt_with_credential(
        provider,
        contract,
        encryption_certificate,
        private_key,
        &credential,
    )
}

/// Validate, encrypt and sign a contract whose signing credential is a
/// CA-issued, time-limited certificate.
///
/// Exactly one of `subject_json` (CSR fields as JSON) and `csr_pem` must
/// be supplied. The relying party can verify the signature and
/// independently check that the certificate has not expired, which bounds
/// the contract's validity window.
#[allow(clippy::too_many_arguments)]
pub fn sign_and_encrypt_with_expiry(
    provider: &dyn CryptoProvider,
    contract: &str,
    platform: Platform,
    encryption_certificate: &str,
    private_key: &str,
    ca_certificate: &str,
    ca_key: &str,
    subject_json: Option<&str>,
    csr_pem: Option<&str>,
    expiry_days: u32,
) -> Result<SignedContract> {
    if contract.is_empty()
        || encryption_certificate.is_empty()
        || private_key.is_empty()
        || ca_certificate.is_empty()
        || ca_key.is_empty()
    {
        return Err(Error::EmptyParameter);
    }

    schema::validate_contract(contract, platform)?;
    certificate::ensure_usable_for_encryption(provider, encryption_certificate)?;

    let credential = create_signing_certificate(
        provider,
        subject_json,
        csr_pem,
        ca_certificate,
        ca_key,
        private_key,
        expiry_days,
    )?;

    encrypt_with_credential(
        provider,
        contract,
        encryption_certificate,
        private_key,
        &credential,
    )
}

/// Derive a time-limited signing certificate from either structured CSR
/// subject fields or a ready-made CSR, signed by the given CA.
///
/// Returns the certificate in PEM form.
pub fn create_signing_certificate(
    provider: &dyn CryptoProvider,
    subject_json: Option<&str>,
    csr_pem: Option<&str>,
    ca_certificate: &str,
    ca_key: &str,
    private_key: &str,
    expiry_days: u32,
) -> Result<String> {
    let subject_json = subject_json.filter(|s| !s.is_empty());
    let csr_pem = csr_pem.filter(|s| !s.is_empty());

    let csr = match (subject_json, csr_pem) {
        (Some(json), None) => {
            let subject: CsrSubject = serde_json::from_str(json)
                .map_err(|e| Error::SigningFailed(format!("parse CSR subject fields: {e}")))?;
            provider
                .build_csr(&subject, private_key)
                .map_err(|e| Error::SigningFailed(format!("CSR construction: {e:#}")))?
        }
        (None, Some(pem)) => pem.to_string(),
        _ => {
            return Err(Error::InvalidInput(
                "exactly one of the CSR subject fields and the CSR PEM must be supplied",
            ))
        }
    };

    provider
        .issue_certificate(&csr, ca_certificate, ca_key, expiry_days)
        .map_err(|e| Error::SigningFailed(format!("certificate issuance: {e:#}")))
}

/// Detached signature over the exact concatenation of the two encrypted
/// sections, base64-encoded.
pub fn sign_sections(
    provider: &dyn CryptoProvider,
    encrypted_workload: &str,
    encrypted_env: &str,
    private_key: &str,
) -> Result<String> {
    let mut combined = String::with_capacity(encrypted_workload.len() + encrypted_env.len());
    combined.push_str(encrypted_workload);
    combined.push_str(encrypted_env);

    let signature = provider
        .sign_sha256(combined.as_bytes(), private_key)
        .map_err(|e| Error::SigningFailed(format!("{e:#}")))?;

    Ok(STANDARD.encode(signature))
}

/// Verify a signature produced by [`sign_sections`] with the signer's
/// public key PEM.
pub fn verify_sections(
    provider: &dyn CryptoProvider,
    encrypted_workload: &str,
    encrypted_env: &str,
    signature_b64: &str,
    public_key: &str,
) -> Result<()> {
    let signature = STANDARD
        .decode(signature_b64)
        .map_err(|e| Error::SignatureVerificationFailed(format!("base64 decode: {e}")))?;

    let mut combined = String::with_capacity(encrypted_workload.len() + encrypted_env.len());
    combined.push_str(encrypted_workload);
    combined.push_str(encrypted_env);

    provider
        .verify_sha256(combined.as_bytes(), &signature, public_key)
        .map_err(|e| Error::SignatureVerificationFailed(format!("{e:#}")))
}

fn encrypt_with_credential(
    provider: &dyn CryptoProvider,
    contract: &str,
    encryption_certificate: &str,
    private_key: &str,
    credential_pem: &str,
) -> Result<SignedContract> {
    let unsigned: UnsignedContract = serde_yaml::from_str(contract)?;

    let encrypted_workload =
        Envelope::seal(provider, &unsigned.workload, encryption_certificate)?.to_string();

    let env_with_credential = inject_key(
        &unsigned.env,
        SIGNING_KEY,
        &STANDARD.encode(credential_pem),
    )?;
    let encrypted_env =
        Envelope::seal(provider, &env_with_credential, encryption_certificate)?.to_string();

    let env_workload_signature =
        sign_sections(provider, &encrypted_workload, &encrypted_env, private_key)?;

    let attestation_public_key = match unsigned
        .attestation_public_key
        .as_deref()
        .filter(|key| !key.is_empty())
    {
        Some(key) => Some(Envelope::seal(provider, key, encryption_certificate)?.to_string()),
        None => None,
    };

    Ok(SignedContract {
        workload: encrypted_workload,
        env: encrypted_env,
        env_workload_signature,
        attestation_public_key,
    })
}

/// Insert (or overwrite) a key in a YAML mapping given as text.
fn inject_key(section_yaml: &str, key: &str, value: &str) -> Result<String> {
    let mut mapping: serde_yaml::Mapping = serde_yaml::from_str(section_yaml)?;
    mapping.insert(key.into(), value.into());

    Ok(serde_yaml::to_string(&mapping)?)
}
