// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Backend-neutral definition of the cryptographic collaborator.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length in bytes of the random password protecting an envelope payload.
pub const ENVELOPE_PASSWORD_LEN: usize = 32;

/// Subject fields for a certificate signing request.
///
/// Deserializable from the caller-supplied JSON form
/// `{"country": "..", "state": "..", "location": "..", "org": "..",
/// "unit": "..", "domain": "..", "mail": ".."}`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CsrSubject {
    pub country: String,
    pub state: String,
    pub location: String,
    pub org: String,
    pub unit: String,
    /// Common name of the requesting party.
    pub domain: String,
    pub mail: String,
}

/// The cryptographic operations the contract pipeline relies on.
///
/// Every method is a blocking, fallible call. Implementations must not
/// retain state across calls; retry and timeout policy belongs to the
/// caller. Failures carry enough context to name the primitive that
/// failed, the layers above classify them into their own error taxonomy.
pub trait CryptoProvider: Send + Sync {
    /// Fill a fresh buffer of `len` cryptographically random bytes.
    fn random_bytes(&self, len: usize) -> Result<Zeroizing<Vec<u8>>>;

    /// Encrypt `data` under the public key carried by `certificate_pem`.
    fn encrypt_with_certificate(&self, data: &[u8], certificate_pem: &str) -> Result<Vec<u8>>;

    /// Recover data encrypted with [`Self::encrypt_with_certificate`] using
    /// the matching private key.
    fn decrypt_with_private_key(
        &self,
        ciphertext: &[u8],
        private_key_pem: &str,
    ) -> Result<Zeroizing<Vec<u8>>>;

    /// Encrypt `plaintext` under a passphrase-derived key, producing the
    /// OpenSSL `Salted__` container (AES-256-CBC, PBKDF2 key derivation).
    fn salted_encrypt(&self, passphrase: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a `Salted__` container produced by [`Self::salted_encrypt`].
    fn salted_decrypt(&self, passphrase: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// SHA-256 detached signature over `data` with an RSA private key.
    fn sign_sha256(&self, data: &[u8], private_key_pem: &str) -> Result<Vec<u8>>;

    /// Verify a detached signature from [`Self::sign_sha256`]. Returns an
    /// error both on primitive failure and on signature mismatch.
    fn verify_sha256(&self, data: &[u8], signature: &[u8], public_key_pem: &str) -> Result<()>;

    /// Derive the PEM public key from a PEM private key.
    fn public_key_from_private(&self, private_key_pem: &str) -> Result<String>;

    /// Extract the PEM public key from an X.509 certificate.
    fn public_key_from_certificate(&self, certificate_pem: &str) -> Result<String>;

    /// Parse an X.509 certificate and return its `notAfter` instant.
    fn certificate_not_after(&self, certificate_pem: &str) -> Result<DateTime<Utc>>;

    /// Build a PEM CSR from structured subject fields and a private key.
    fn build_csr(&self, subject: &CsrSubject, private_key_pem: &str) -> Result<String>;

    /// Sign a CSR with a CA certificate and key, yielding a PEM X.509
    /// certificate valid for `expiry_days` days from now.
    fn issue_certificate(
        &self,
        csr_pem: &str,
        ca_certificate_pem: &str,
        ca_key_pem: &str,
        expiry_days: u32,
    ) -> Result<String>;

    /// Generate a fresh RSA private key in PEM form.
    fn generate_rsa_private_key(&self, bits: u32) -> Result<Zeroizing<String>>;

    /// Create a self-signed CA certificate over `private_key_pem`.
    fn self_signed_certificate(
        &self,
        subject: &CsrSubject,
        private_key_pem: &str,
        expiry_days: u32,
    ) -> Result<String>;
}
