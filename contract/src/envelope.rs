// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! The hybrid-encryption envelope.
//!
//! An envelope is the three-part wire string
//!
//! ```text
//! hyper-protect-basic.<b64(rsa(password))>.<b64(aes(payload))>
//! ```
//!
//! where `password` is a fresh random 32-byte value encrypted under the
//! recipient certificate, and the payload is encrypted under that password
//! in the provider's salted AES-256-CBC container. Sealing twice never
//! reuses a password; an envelope is immutable once produced.

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine};
use crypto::{CryptoProvider, ENVELOPE_PASSWORD_LEN};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Fixed literal prefix of the envelope wire format.
pub const ENCRYPT_PREFIX: &str = "hyper-protect-basic";

/// A sealed envelope, both fields base64-encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Envelope {
    pub encrypted_password: String,
    pub encrypted_payload: String,
}

impl Envelope {
    /// Hybrid-encrypt `plaintext` under `certificate_pem`.
    pub fn seal(
        provider: &dyn CryptoProvider,
        plaintext: &str,
        certificate_pem: &str,
    ) -> Result<Self> {
        if plaintext.is_empty() || certificate_pem.is_empty() {
            return Err(Error::EmptyParameter);
        }

        let password = provider
            .random_bytes(ENVELOPE_PASSWORD_LEN)
            .map_err(|e| Error::EncryptionFailed(format!("password generation: {e:#}")))?;
        let encrypted_password = provider
            .encrypt_with_certificate(&password, certificate_pem)
            .map_err(|e| Error::EncryptionFailed(format!("password encryption: {e:#}")))?;
        let encrypted_payload = provider
            .salted_encrypt(&password, plaintext.as_bytes())
            .map_err(|e| Error::EncryptionFailed(format!("payload encryption: {e:#}")))?;

        Ok(Envelope {
            encrypted_password: STANDARD.encode(encrypted_password),
            encrypted_payload: STANDARD.encode(encrypted_payload),
        })
    }

    /// Recover the envelope password with the recipient's private key.
    ///
    /// Exposed separately from [`Envelope::unseal`] because attestation
    /// consumers decrypt several payloads sharing one encrypted-password
    /// prefix.
    pub fn decrypt_password(
        &self,
        provider: &dyn CryptoProvider,
        private_key_pem: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let ciphertext = STANDARD
            .decode(&self.encrypted_password)
            .map_err(|e| Error::PasswordDecryptionFailed(format!("base64 decode: {e}")))?;

        provider
            .decrypt_with_private_key(&ciphertext, private_key_pem)
            .map_err(|e| Error::PasswordDecryptionFailed(format!("{e:#}")))
    }

    /// Decrypt the payload with an already-recovered password.
    pub fn decrypt_payload_with(
        &self,
        provider: &dyn CryptoProvider,
        password: &[u8],
    ) -> Result<String> {
        let ciphertext = STANDARD
            .decode(&self.encrypted_payload)
            .map_err(|e| Error::PayloadDecryptionFailed(format!("base64 decode: {e}")))?;
        let plaintext = provider
            .salted_decrypt(password, &ciphertext)
            .map_err(|e| Error::PayloadDecryptionFailed(format!("{e:#}")))?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::PayloadDecryptionFailed("payload is not valid UTF-8".to_string()))
    }

    /// Full decryption path: recover the password, then the payload.
    pub fn unseal(&self, provider: &dyn CryptoProvider, private_key_pem: &str) -> Result<String> {
        let password = self.decrypt_password(provider, private_key_pem)?;
        self.decrypt_payload_with(provider, &password)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ENCRYPT_PREFIX}.{}.{}",
            self.encrypted_password, self.encrypted_payload
        )
    }
}

impl FromStr for Envelope {
    type Err = Error;

    fn from_str(wire: &str) -> Result<Self> {
        let fields: Vec<&str> = wire.split('.').collect();
        if fields.len() != 3 {
            return Err(Error::MalformedEnvelope(
                "expected three dot-separated fields",
            ));
        }
        if fields[0] != ENCRYPT_PREFIX {
            return Err(Error::MalformedEnvelope("unexpected prefix"));
        }
        if fields[1].is_empty() || fields[2].is_empty() {
            return Err(Error::MalformedEnvelope("empty cipher field"));
        }

        Ok(Envelope {
            encrypted_password: fields[1].to_string(),
            encrypted_payload: fields[2].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use crypto::{CryptoProvider, CsrSubject, OpensslProvider};
    use rstest::rstest;

    use super::*;

    fn test_recipient() -> (String, String) {
        let provider = OpensslProvider::new();
        let key = provider.generate_rsa_private_key(2048).unwrap();
        let subject = CsrSubject {
            country: "US".into(),
            state: "New York".into(),
            location: "Armonk".into(),
            org: "Example".into(),
            unit: "Runtime".into(),
            domain: "example.com".into(),
            mail: "ops@example.com".into(),
        };
        let cert = provider.self_signed_certificate(&subject, &key, 365).unwrap();
        (cert, key.to_string())
    }

    #[test]
    fn seal_produces_the_wire_literal() {
        let provider = OpensslProvider::new();
        let (cert, _) = test_recipient();

        let wire = Envelope::seal(&provider, "hello-world", &cert)
            .unwrap()
            .to_string();

        let fields: Vec<&str> = wire.split('.').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], ENCRYPT_PREFIX);
        assert!(STANDARD.decode(fields[1]).is_ok());
        assert!(STANDARD.decode(fields[2]).is_ok());
    }

    #[test]
    fn round_trip() {
        let provider = OpensslProvider::new();
        let (cert, key) = test_recipient();

        let envelope = Envelope::seal(&provider, "type: workload", &cert).unwrap();
        let plaintext = envelope.unseal(&provider, &key).unwrap();

        assert_eq!(plaintext, "type: workload");
    }

    #[test]
    fn sealing_twice_never_reuses_the_password() {
        let provider = OpensslProvider::new();
        let (cert, _) = test_recipient();

        let first = Envelope::seal(&provider, "payload", &cert).unwrap();
        let second = Envelope::seal(&provider, "payload", &cert).unwrap();

        assert_ne!(first.encrypted_password, second.encrypted_password);
        assert_ne!(first.encrypted_payload, second.encrypted_payload);
    }

    #[test]
    fn empty_plaintext_is_rejected() {
        let provider = OpensslProvider::new();
        let (cert, _) = test_recipient();

        assert!(matches!(
            Envelope::seal(&provider, "", &cert),
            Err(Error::EmptyParameter)
        ));
    }

    #[test]
    fn bad_certificate_is_an_encryption_failure() {
        let provider = OpensslProvider::new();

        assert!(matches!(
            Envelope::seal(&provider, "payload", "not a certificate"),
            Err(Error::EncryptionFailed(_))
        ));
    }

    #[rstest]
    #[case("hyper-protect-basic.onlyone")]
    #[case("hyper-protect-basic.a.b.c")]
    #[case("some-other-prefix.YWJj.YWJj")]
    #[case("hyper-protect-basic..YWJj")]
    fn malformed_wire_strings_are_rejected(#[case] wire: &str) {
        assert!(matches!(
            wire.parse::<Envelope>(),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn wire_string_round_trip() {
        let provider = OpensslProvider::new();
        let (cert, key) = test_recipient();

        let wire = Envelope::seal(&provider, "records", &cert).unwrap().to_string();
        let reparsed: Envelope = wire.parse().unwrap();

        assert_eq!(reparsed.unseal(&provider, &key).unwrap(), "records");
    }

    #[test]
    fn wrong_key_fails_at_the_password_stage() {
        let provider = OpensslProvider::new();
        let (cert, _) = test_recipient();
        let (_, other_key) = test_recipient();

        let envelope = Envelope::seal(&provider, "payload", &cert).unwrap();

        assert!(matches!(
            envelope.unseal(&provider, &other_key),
            Err(Error::PasswordDecryptionFailed(_))
        ));
    }

    #[test]
    fn tampered_payload_fails_at_the_payload_stage() {
        let provider = OpensslProvider::new();
        let (cert, key) = test_recipient();

        let mut envelope = Envelope::seal(&provider, "payload", &cert).unwrap();

        // Corrupt the payload ciphertext while keeping the base64 valid:
        // drop one 4-char group, which truncates the cipher block stream.
        let shortened = envelope.encrypted_payload[4..].to_string();
        envelope.encrypted_payload = shortened;

        assert!(matches!(
            envelope.unseal(&provider, &key),
            Err(Error::PayloadDecryptionFailed(_))
        ));
    }

    #[test]
    fn known_password_decrypts_the_payload_alone() {
        let provider = OpensslProvider::new();
        let (cert, key) = test_recipient();

        let envelope = Envelope::seal(&provider, "records", &cert).unwrap();
        let password = envelope.decrypt_password(&provider, &key).unwrap();

        assert_eq!(
            envelope.decrypt_payload_with(&provider, &password).unwrap(),
            "records"
        );
    }
}
