// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! OpenSSL-backed implementation of the [`CryptoProvider`] trait.

mod rsa;
mod salted;
mod x509;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::provider::{CryptoProvider, CsrSubject};

/// The production cryptographic backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpensslProvider;

impl OpensslProvider {
    pub fn new() -> Self {
        OpensslProvider
    }
}

impl CryptoProvider for OpensslProvider {
    fn random_bytes(&self, len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(vec![0u8; len]);
        openssl::rand::rand_bytes(&mut buf).context("random byte generation failed")?;
        Ok(buf)
    }

    fn encrypt_with_certificate(&self, data: &[u8], certificate_pem: &str) -> Result<Vec<u8>> {
        rsa::encrypt_with_certificate(data, certificate_pem)
    }

    fn decrypt_with_private_key(
        &self,
        ciphertext: &[u8],
        private_key_pem: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        rsa::decrypt_with_private_key(ciphertext, private_key_pem)
    }

    fn salted_encrypt(&self, passphrase: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        salted::encrypt(passphrase, plaintext)
    }

    fn salted_decrypt(&self, passphrase: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        salted::decrypt(passphrase, ciphertext)
    }

    fn sign_sha256(&self, data: &[u8], private_key_pem: &str) -> Result<Vec<u8>> {
        rsa::sign_sha256(data, private_key_pem)
    }

    fn verify_sha256(&self, data: &[u8], signature: &[u8], public_key_pem: &str) -> Result<()> {
        rsa::verify_sha256(data, signature, public_key_pem)
    }

    fn public_key_from_private(&self, private_key_pem: &str) -> Result<String> {
        rsa::public_key_from_private(private_key_pem)
    }

    fn public_key_from_certificate(&self, certificate_pem: &str) -> Result<String> {
        x509::public_key_from_certificate(certificate_pem)
    }

    fn certificate_not_after(&self, certificate_pem: &str) -> Result<DateTime<Utc>> {
        x509::certificate_not_after(certificate_pem)
    }

    fn build_csr(&self, subject: &CsrSubject, private_key_pem: &str) -> Result<String> {
        x509::build_csr(subject, private_key_pem)
    }

    fn issue_certificate(
        &self,
        csr_pem: &str,
        ca_certificate_pem: &str,
        ca_key_pem: &str,
        expiry_days: u32,
    ) -> Result<String> {
        x509::issue_certificate(csr_pem, ca_certificate_pem, ca_key_pem, expiry_days)
    }

    fn generate_rsa_private_key(&self, bits: u32) -> Result<Zeroizing<String>> {
        rsa::generate_private_key(bits)
    }

    fn self_signed_certificate(
        &self,
        subject: &CsrSubject,
        private_key_pem: &str,
        expiry_days: u32,
    ) -> Result<String> {
        x509::self_signed_certificate(subject, private_key_pem, expiry_days)
    }
}
