// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! X.509 handling: certificate parsing, CSR construction and CA-signed
//! certificate issuance.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use openssl::{
    asn1::{Asn1Integer, Asn1Time},
    bn::{BigNum, MsbOption},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    x509::{
        extension::BasicConstraints, X509Builder, X509Name, X509NameBuilder, X509Req,
        X509ReqBuilder, X509,
    },
};

use crate::provider::CsrSubject;

const SERIAL_BITS: i32 = 159;

pub fn public_key_from_certificate(certificate_pem: &str) -> Result<String> {
    let cert = X509::from_pem(certificate_pem.as_bytes()).context("parse certificate failed")?;
    let pem = cert
        .public_key()
        .context("extract public key from certificate failed")?
        .public_key_to_pem()?;

    String::from_utf8(pem).context("public key is not valid UTF-8")
}

pub fn certificate_not_after(certificate_pem: &str) -> Result<DateTime<Utc>> {
    let cert = X509::from_pem(certificate_pem.as_bytes()).context("parse certificate failed")?;

    // Asn1Time has no direct epoch accessor, so measure it as a diff
    // against the epoch itself.
    let epoch = Asn1Time::from_unix(0).context("epoch conversion failed")?;
    let diff = epoch
        .diff(cert.not_after())
        .context("certificate expiry diff failed")?;
    let timestamp = i64::from(diff.days) * 86_400 + i64::from(diff.secs);

    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .context("certificate expiry is out of representable range")
}

fn subject_name(subject: &CsrSubject) -> Result<X509Name> {
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_nid(Nid::COUNTRYNAME, &subject.country)?;
    name.append_entry_by_nid(Nid::STATEORPROVINCENAME, &subject.state)?;
    name.append_entry_by_nid(Nid::LOCALITYNAME, &subject.location)?;
    name.append_entry_by_nid(Nid::ORGANIZATIONNAME, &subject.org)?;
    name.append_entry_by_nid(Nid::ORGANIZATIONALUNITNAME, &subject.unit)?;
    name.append_entry_by_nid(Nid::COMMONNAME, &subject.domain)?;
    name.append_entry_by_nid(Nid::PKCS9_EMAILADDRESS, &subject.mail)?;

    Ok(name.build())
}

fn random_serial() -> Result<Asn1Integer> {
    let mut serial = BigNum::new()?;
    serial.rand(SERIAL_BITS, MsbOption::MAYBE_ZERO, false)?;

    serial.to_asn1_integer().context("serial conversion failed")
}

pub fn build_csr(subject: &CsrSubject, private_key_pem: &str) -> Result<String> {
    let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
        .context("parse private key failed")?;

    let mut builder = X509ReqBuilder::new()?;
    builder.set_pubkey(&key)?;
    builder.set_subject_name(&*subject_name(subject)?)?;
    builder
        .sign(&key, MessageDigest::sha256())
        .context("CSR signing failed")?;

    let pem = builder.build().to_pem()?;
    String::from_utf8(pem).context("CSR is not valid UTF-8")
}

pub fn issue_certificate(
    csr_pem: &str,
    ca_certificate_pem: &str,
    ca_key_pem: &str,
    expiry_days: u32,
) -> Result<String> {
    let req = X509Req::from_pem(csr_pem.as_bytes()).context("parse CSR failed")?;
    let ca_cert =
        X509::from_pem(ca_certificate_pem.as_bytes()).context("parse CA certificate failed")?;
    let ca_key =
        PKey::private_key_from_pem(ca_key_pem.as_bytes()).context("parse CA key failed")?;

    let req_key = req.public_key().context("extract CSR public key failed")?;
    if !req.verify(&req_key).context("CSR verification failed")? {
        bail!("CSR signature does not match its public key");
    }

    let mut builder = X509Builder::new()?;
    builder.set_version(2)?;
    builder.set_serial_number(&*random_serial()?)?;
    builder.set_subject_name(req.subject_name())?;
    builder.set_issuer_name(ca_cert.subject_name())?;
    builder.set_pubkey(&req_key)?;
    builder.set_not_before(&*Asn1Time::days_from_now(0)?)?;
    builder.set_not_after(&*Asn1Time::days_from_now(expiry_days)?)?;
    builder
        .sign(&ca_key, MessageDigest::sha256())
        .context("certificate signing failed")?;

    let pem = builder.build().to_pem()?;
    String::from_utf8(pem).context("certificate is not valid UTF-8")
}

pub fn self_signed_certificate(
    subject: &CsrSubject,
    private_key_pem: &str,
    expiry_days: u32,
) -> Result<String> {
    let key: PKey<Private> = PKey::private_key_from_pem(private_key_pem.as_bytes())
        .context("parse private key failed")?;
    let name = subject_name(subject)?;

    let mut builder = X509Builder::new()?;
    builder.set_version(2)?;
    builder.set_serial_number(&*random_serial()?)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    builder.set_pubkey(&key)?;
    builder.set_not_before(&*Asn1Time::days_from_now(0)?)?;
    builder.set_not_after(&*Asn1Time::days_from_now(expiry_days)?)?;
    builder.append_extension(BasicConstraints::new().critical().ca().build()?)?;
    builder
        .sign(&key, MessageDigest::sha256())
        .context("certificate signing failed")?;

    let pem = builder.build().to_pem()?;
    String::from_utf8(pem).context("certificate is not valid UTF-8")
}
