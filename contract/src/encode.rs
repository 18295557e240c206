// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Convenience encoders for contract building blocks: base64 wrapping,
//! envelope encryption of text/JSON snippets, workload directory bundling
//! and the peer-pod initdata rendering. Every helper reports SHA-256
//! checksums of its input and output so callers can track what went into a
//! contract.

use std::{io::Write, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine};
use crypto::CryptoProvider;
use flate2::{write::GzEncoder, Compression};
use sha2::{Digest, Sha256};

use crate::{envelope::Envelope, Error, Result};

/// An encoded or encrypted artifact plus integrity checksums.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EncodedArtifact {
    pub value: String,
    pub input_sha256: String,
    pub output_sha256: String,
}

impl EncodedArtifact {
    fn new(input: &str, value: String) -> Self {
        EncodedArtifact {
            input_sha256: sha256_hex(input),
            output_sha256: sha256_hex(&value),
            value,
        }
    }
}

/// Hex SHA-256 digest of a string.
pub fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// Base64-encode plain text.
pub fn encoded_text(text: &str) -> Result<EncodedArtifact> {
    if text.is_empty() {
        return Err(Error::EmptyParameter);
    }

    Ok(EncodedArtifact::new(text, STANDARD.encode(text)))
}

/// Base64-encode a JSON snippet, rejecting input that is not valid JSON.
pub fn encoded_json(json: &str) -> Result<EncodedArtifact> {
    if serde_json::from_str::<serde_json::Value>(json).is_err() {
        return Err(Error::InvalidInput("input is not valid JSON"));
    }

    Ok(EncodedArtifact::new(json, STANDARD.encode(json)))
}

/// Envelope-encrypt plain text under an encryption certificate.
pub fn encrypted_text(
    provider: &dyn CryptoProvider,
    text: &str,
    encryption_certificate: &str,
) -> Result<EncodedArtifact> {
    let sealed = Envelope::seal(provider, text, encryption_certificate)?.to_string();

    Ok(EncodedArtifact::new(text, sealed))
}

/// Envelope-encrypt a JSON snippet under an encryption certificate.
pub fn encrypted_json(
    provider: &dyn CryptoProvider,
    json: &str,
    encryption_certificate: &str,
) -> Result<EncodedArtifact> {
    if serde_json::from_str::<serde_json::Value>(json).is_err() {
        return Err(Error::InvalidInput("input is not valid JSON"));
    }

    encrypted_text(provider, json, encryption_certificate)
}

/// Decrypt an envelope wire string with the recipient's private key.
pub fn decrypted_text(
    provider: &dyn CryptoProvider,
    sealed: &str,
    private_key: &str,
) -> Result<EncodedArtifact> {
    if sealed.is_empty() || private_key.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let envelope: Envelope = sealed.trim().parse()?;
    let plaintext = envelope.unseal(provider, private_key)?;

    Ok(EncodedArtifact {
        input_sha256: sha256_hex(sealed),
        output_sha256: sha256_hex(&plaintext),
        value: plaintext,
    })
}

/// Bundle a compose/play directory into a base64 tar.gz archive.
///
/// Entries are archived relative to `folder`, so the receiving runtime
/// unpacks `docker-compose.yaml` (or `pods.yaml`) at the archive root.
pub fn workload_tgz(folder: &Path) -> Result<EncodedArtifact> {
    if !folder.is_dir() {
        return Err(Error::InvalidInput("workload folder does not exist"));
    }

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if path.is_dir() {
            archive.append_dir_all(&name, &path)?;
        } else {
            archive.append_path_with_name(&path, &name)?;
        }
    }

    let bytes = archive.into_inner()?.finish()?;

    Ok(EncodedArtifact::new(
        &folder.display().to_string(),
        STANDARD.encode(bytes),
    ))
}

/// Bundle a workload directory and envelope-encrypt the archive.
pub fn workload_tgz_encrypted(
    provider: &dyn CryptoProvider,
    folder: &Path,
    encryption_certificate: &str,
) -> Result<EncodedArtifact> {
    let bundle = workload_tgz(folder)?;
    let sealed = Envelope::seal(provider, &bundle.value, encryption_certificate)?.to_string();

    Ok(EncodedArtifact {
        input_sha256: bundle.input_sha256,
        output_sha256: sha256_hex(&sealed),
        value: sealed,
    })
}

/// Render the initdata document wrapping a signed contract for peer-pod
/// boot, gzip it and base64-encode the result.
pub fn initdata(contract: &str) -> Result<EncodedArtifact> {
    if contract.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let document = format!(
        "\nalgorithm = \"sha384\"\nversion = \"0.1.0\"\n\n[data]\n\"contract.yaml\" = '''{contract}'''\n"
    );

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document.as_bytes())?;
    let compressed = encoder.finish()?;

    Ok(EncodedArtifact::new(contract, STANDARD.encode(compressed)))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use crypto::{CryptoProvider, CsrSubject, OpensslProvider};

    use super::*;

    const SAMPLE_TEXT: &str = "hello-contract";
    const SAMPLE_TEXT_B64: &str = "aGVsbG8tY29udHJhY3Q=";
    const SAMPLE_TEXT_INPUT_SHA: &str =
        "b2e8c9bb33b11d8aeadfc1930826fd70720f7e6fd13e60fe50c827e3378a6c75";
    const SAMPLE_TEXT_OUTPUT_SHA: &str =
        "35116038203f3b9699235bd54bcd3aed94683d327b0f89b981214adc782c2dce";

    const SAMPLE_JSON: &str = r#"{"type": "env"}"#;
    const SAMPLE_JSON_B64: &str = "eyJ0eXBlIjogImVudiJ9";

    fn recipient() -> (String, String) {
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
    fn text_encoding_and_checksums() {
        let artifact = encoded_text(SAMPLE_TEXT).unwrap();

        assert_eq!(artifact.value, SAMPLE_TEXT_B64);
        assert_eq!(artifact.input_sha256, SAMPLE_TEXT_INPUT_SHA);
        assert_eq!(artifact.output_sha256, SAMPLE_TEXT_OUTPUT_SHA);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(encoded_text(""), Err(Error::EmptyParameter)));
    }

    #[test]
    fn json_encoding_validates_input() {
        assert_eq!(encoded_json(SAMPLE_JSON).unwrap().value, SAMPLE_JSON_B64);
        assert!(matches!(
            encoded_json("type: env"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn encrypted_text_round_trips() {
        let provider = OpensslProvider::new();
        let (cert, key) = recipient();

        let sealed = encrypted_text(&provider, SAMPLE_TEXT, &cert).unwrap();
        assert_eq!(sealed.input_sha256, SAMPLE_TEXT_INPUT_SHA);
        assert!(sealed.value.starts_with("hyper-protect-basic."));

        let opened = decrypted_text(&provider, &sealed.value, &key).unwrap();
        assert_eq!(opened.value, SAMPLE_TEXT);
        assert_eq!(opened.output_sha256, SAMPLE_TEXT_INPUT_SHA);
    }

    #[test]
    fn encrypted_json_rejects_non_json() {
        let provider = OpensslProvider::new();
        let (cert, _) = recipient();

        assert!(matches!(
            encrypted_json(&provider, "not json", &cert),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn workload_bundle_contains_the_compose_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yaml"), "services: {}\n").unwrap();
        std::fs::create_dir(dir.path().join("nginx")).unwrap();
        std::fs::write(dir.path().join("nginx").join("nginx.conf"), "events {}\n").unwrap();

        let artifact = workload_tgz(dir.path()).unwrap();

        let bytes = STANDARD.decode(&artifact.value).unwrap();
        let decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut names: Vec<String> = tar::Archive::new(decoder)
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();
        names.sort();

        assert!(names.contains(&"docker-compose.yaml".to_string()));
        assert!(names.iter().any(|n| n.starts_with("nginx")));
    }

    #[test]
    fn missing_workload_folder_is_rejected() {
        assert!(matches!(
            workload_tgz(Path::new("/definitely/not/here")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn initdata_wraps_the_contract() {
        let artifact = initdata("workload: encrypted\n").unwrap();

        let bytes = STANDARD.decode(&artifact.value).unwrap();
        let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut document = String::new();
        decoder.read_to_string(&mut document).unwrap();

        assert!(document.contains("algorithm = \"sha384\""));
        assert!(document.contains("'''workload: encrypted\n'''"));
    }

    #[test]
    fn initdata_rejects_empty_contracts() {
        assert!(matches!(initdata(""), Err(Error::EmptyParameter)));
    }
}
