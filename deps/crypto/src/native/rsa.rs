// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! RSA primitives: key transport, detached signatures, key derivation.

use anyhow::{bail, Context, Result};
use openssl::{
    encrypt::{Decrypter, Encrypter},
    hash::MessageDigest,
    pkey::PKey,
    rsa::{Padding, Rsa},
    sign::{Signer, Verifier},
    x509::X509,
};
use zeroize::Zeroizing;

/// Encrypt `data` under the public key of an X.509 certificate.
///
/// PKCS#1 v1.5 padding, matching what the receiving execution environment
/// expects for the envelope password field.
pub fn encrypt_with_certificate(data: &[u8], certificate_pem: &str) -> Result<Vec<u8>> {
    let cert = X509::from_pem(certificate_pem.as_bytes())
        .context("parse encryption certificate failed")?;
    let pubkey = cert
        .public_key()
        .context("extract public key from certificate failed")?;

    let mut encrypter = Encrypter::new(&pubkey)?;
    encrypter.set_rsa_padding(Padding::PKCS1)?;

    let mut ciphertext = vec![0; encrypter.encrypt_len(data)?];
    let len = encrypter
        .encrypt(data, &mut ciphertext)
        .context("RSA encrypt failed")?;
    ciphertext.truncate(len);

    Ok(ciphertext)
}

pub fn decrypt_with_private_key(
    ciphertext: &[u8],
    private_key_pem: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
        .context("parse private key failed")?;

    let mut decrypter = Decrypter::new(&key)?;
    decrypter.set_rsa_padding(Padding::PKCS1)?;

    let mut plaintext = Zeroizing::new(vec![0; decrypter.decrypt_len(ciphertext)?]);
    let len = decrypter
        .decrypt(ciphertext, &mut plaintext)
        .context("RSA decrypt failed")?;
    plaintext.truncate(len);

    Ok(plaintext)
}

pub fn sign_sha256(data: &[u8], private_key_pem: &str) -> Result<Vec<u8>> {
    let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
        .context("parse signing key failed")?;

    let mut signer = Signer::new(MessageDigest::sha256(), &key)?;
    signer.update(data)?;
    signer.sign_to_vec().context("SHA-256 signing failed")
}

pub fn verify_sha256(data: &[u8], signature: &[u8], public_key_pem: &str) -> Result<()> {
    let key =
        PKey::public_key_from_pem(public_key_pem.as_bytes()).context("parse public key failed")?;

    let mut verifier = Verifier::new(MessageDigest::sha256(), &key)?;
    verifier.update(data)?;
    if !verifier.verify(signature)? {
        bail!("signature does not match data");
    }

    Ok(())
}

pub fn public_key_from_private(private_key_pem: &str) -> Result<String> {
    let key = PKey::private_key_from_pem(private_key_pem.as_bytes())
        .context("parse private key failed")?;
    let pem = key.public_key_to_pem()?;

    String::from_utf8(pem).context("public key is not valid UTF-8")
}

pub fn generate_private_key(bits: u32) -> Result<Zeroizing<String>> {
    let rsa = Rsa::generate(bits).context("RSA key generation failed")?;
    let pem = String::from_utf8(rsa.private_key_to_pem()?)
        .context("private key is not valid UTF-8")?;

    Ok(Zeroizing::new(pem))
}
