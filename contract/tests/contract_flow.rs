// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! End-to-end flow: assemble and sign a contract, then play the consuming
//! side — verify the signature, open the sections and read attestation
//! records sealed with the same envelope format.

use base64::{engine::general_purpose::STANDARD, Engine};
use contract::{
    assemble::{self, SignedContract, SIGNING_KEY},
    attestation, encode,
    envelope::Envelope,
    Platform,
};
use crypto::{CryptoProvider, CsrSubject, OpensslProvider};

const CONTRACT: &str = r#"workload: |
  type: workload
  compose:
    archive: UEsDBBQ=
env: |
  type: env
  logging:
    logRouter:
      hostname: logs.example.test
"#;

fn subject() -> CsrSubject {
    CsrSubject {
        country: "US".into(),
        state: "New York".into(),
        location: "Armonk".into(),
        org: "Example".into(),
        unit: "Runtime".into(),
        domain: "example.com".into(),
        mail: "ops@example.com".into(),
    }
}

#[test]
fn deploy_and_consume_round_trip() {
    let provider = OpensslProvider::new();

    // Platform side key material.
    let platform_key = provider.generate_rsa_private_key(2048).unwrap();
    let platform_cert = provider
        .self_signed_certificate(&subject(), &platform_key, 400)
        .unwrap();

    // Workload owner signing key.
    let signer_key = provider.generate_rsa_private_key(2048).unwrap();

    let signed = assemble::sign_and_encrypt(
        &provider,
        CONTRACT,
        Platform::Hpvs,
        &platform_cert,
        &signer_key,
    )
    .unwrap();

    // The document serializes with exactly the expected keys.
    let yaml = signed.to_yaml().unwrap();
    assert!(yaml.contains("workload: hyper-protect-basic."));
    assert!(yaml.contains("env: hyper-protect-basic."));
    assert!(yaml.contains("envWorkloadSignature:"));
    let reparsed = SignedContract::from_yaml(&yaml).unwrap();

    // The TEE opens the env section and finds the signing credential.
    let env_envelope: Envelope = reparsed.env.parse().unwrap();
    let env = env_envelope.unseal(&provider, &platform_key).unwrap();
    let env_value: serde_yaml::Value = serde_yaml::from_str(&env).unwrap();

    let credential = env_value[SIGNING_KEY].as_str().unwrap();
    let credential_pem = String::from_utf8(STANDARD.decode(credential).unwrap()).unwrap();

    // It then authenticates the document with that credential.
    assemble::verify_sections(
        &provider,
        &reparsed.workload,
        &reparsed.env,
        &reparsed.env_workload_signature,
        &credential_pem,
    )
    .unwrap();

    // The workload section is intact.
    let workload_envelope: Envelope = reparsed.workload.parse().unwrap();
    let workload = workload_envelope.unseal(&provider, &platform_key).unwrap();
    assert!(workload.contains("type: workload"));

    // The signed document can be wrapped into peer-pod initdata.
    let initdata = encode::initdata(&yaml).unwrap();
    assert!(!initdata.value.is_empty());
}

#[test]
fn attestation_records_round_trip_with_the_deploy_keys() {
    let provider = OpensslProvider::new();

    let attestation_key = provider.generate_rsa_private_key(2048).unwrap();
    let attestation_cert = provider
        .self_signed_certificate(&subject(), &attestation_key, 365)
        .unwrap();

    let records = "se-checksums.txt.enc: 70c7...\nbaseimage: 9a8b...\n";
    let sealed = Envelope::seal(&provider, records, &attestation_cert)
        .unwrap()
        .to_string();

    let recovered = attestation::attestation_records(&provider, &sealed, &attestation_key).unwrap();

    assert_eq!(recovered, records);
}

#[test]
fn expiry_signed_contract_verifies_with_the_issued_certificate() {
    let provider = OpensslProvider::new();

    let platform_key = provider.generate_rsa_private_key(2048).unwrap();
    let platform_cert = provider
        .self_signed_certificate(&subject(), &platform_key, 400)
        .unwrap();
    let signer_key = provider.generate_rsa_private_key(2048).unwrap();
    let ca_key = provider.generate_rsa_private_key(2048).unwrap();
    let ca_cert = provider
        .self_signed_certificate(&subject(), &ca_key, 3650)
        .unwrap();

    let subject_json = serde_json::to_string(&subject()).unwrap();

    let signed = assemble::sign_and_encrypt_with_expiry(
        &provider,
        CONTRACT,
        Platform::Hpvs,
        &platform_cert,
        &signer_key,
        &ca_cert,
        &ca_key,
        Some(&subject_json),
        None,
        180,
    )
    .unwrap();

    let env_envelope: Envelope = signed.env.parse().unwrap();
    let env = env_envelope.unseal(&provider, &platform_key).unwrap();
    let env_value: serde_yaml::Value = serde_yaml::from_str(&env).unwrap();
    let credential_pem = String::from_utf8(
        STANDARD
            .decode(env_value[SIGNING_KEY].as_str().unwrap())
            .unwrap(),
    )
    .unwrap();

    let signer_public = provider.public_key_from_certificate(&credential_pem).unwrap();
    assemble::verify_sections(
        &provider,
        &signed.workload,
        &signed.env,
        &signed.env_workload_signature,
        &signer_public,
    )
    .unwrap();
}
