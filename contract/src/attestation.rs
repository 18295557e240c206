// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Decryption of attestation records produced by the execution
//! environment. The records arrive in the same envelope wire format the
//! contract sections use.

use crypto::CryptoProvider;
use zeroize::Zeroizing;

use crate::{envelope::Envelope, Error, Result};

/// Recover the plaintext attestation records from a sealed envelope.
pub fn attestation_records(
    provider: &dyn CryptoProvider,
    sealed: &str,
    private_key: &str,
) -> Result<String> {
    if sealed.is_empty() || private_key.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let envelope: Envelope = sealed.trim().parse()?;
    let password = envelope.decrypt_password(provider, private_key)?;

    envelope.decrypt_payload_with(provider, &password)
}

/// Recover only the envelope password, for consumers that decrypt several
/// payload fields sharing one encrypted-password prefix.
pub fn attestation_password(
    provider: &dyn CryptoProvider,
    sealed: &str,
    private_key: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.is_empty() || private_key.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let envelope: Envelope = sealed.trim().parse()?;

    envelope.decrypt_password(provider, private_key)
}

#[cfg(test)]
mod tests {
    use crypto::{CryptoProvider, CsrSubject, OpensslProvider};

    use super::*;

    fn recipient() -> (String, String) {
        let provider = OpensslProvider::new();
        let key = provider.generate_rsa_private_key(2048).unwrap();
        let subject = CsrSubject {
            country: "US".into(),
            state: "New York".into(),
            location: "Armonk".into(),
            org: "Example".into(),
            unit: "Attestation".into(),
            domain: "example.com".into(),
            mail: "ops@example.com".into(),
        };
        let cert = provider.self_signed_certificate(&subject, &key, 365).unwrap();
        (cert, key.to_string())
    }

    #[test]
    fn records_round_trip() {
        let provider = OpensslProvider::new();
        let (cert, key) = recipient();
        let records = "se-checksums.txt.enc: value\nbaseimage: value\n";

        let sealed = Envelope::seal(&provider, records, &cert).unwrap().to_string();

        assert_eq!(
            attestation_records(&provider, &sealed, &key).unwrap(),
            records
        );
    }

    #[test]
    fn shared_password_decrypts_several_fields() {
        let provider = OpensslProvider::new();
        let (cert, key) = recipient();

        let sealed = Envelope::seal(&provider, "first-record", &cert)
            .unwrap()
            .to_string();
        let password = attestation_password(&provider, &sealed, &key).unwrap();

        let envelope: Envelope = sealed.parse().unwrap();
        assert_eq!(
            envelope.decrypt_payload_with(&provider, &password).unwrap(),
            "first-record"
        );
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let provider = OpensslProvider::new();
        let (_, key) = recipient();

        assert!(matches!(
            attestation_records(&provider, "", &key),
            Err(Error::EmptyParameter)
        ));
        assert!(matches!(
            attestation_records(&provider, "hyper-protect-basic.a.b", ""),
            Err(Error::EmptyParameter)
        ));
    }

    #[test]
    fn malformed_input_is_rejected() {
        let provider = OpensslProvider::new();
        let (_, key) = recipient();

        assert!(matches!(
            attestation_records(&provider, "not-an-envelope", &key),
            Err(Error::MalformedEnvelope(_))
        ));
    }
}
