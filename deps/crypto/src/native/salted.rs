// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Passphrase-based symmetric encryption in the OpenSSL `Salted__`
//! container format: an 8-byte magic, an 8-byte random salt and the
//! AES-256-CBC ciphertext. Key and IV are derived from the passphrase with
//! PBKDF2-HMAC-SHA256, compatible with `openssl enc -aes-256-cbc -pbkdf2`.

use anyhow::{bail, Context, Result};
use openssl::{hash::MessageDigest, pkcs5::pbkdf2_hmac, symm::Cipher};
use zeroize::Zeroizing;

const SALTED_MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Iteration count used by `openssl enc -pbkdf2` when none is given.
const PBKDF2_ROUNDS: usize = 10_000;

fn derive_key_iv(passphrase: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN + IV_LEN]>> {
    let mut key_iv = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    pbkdf2_hmac(
        passphrase,
        salt,
        PBKDF2_ROUNDS,
        MessageDigest::sha256(),
        &mut key_iv[..],
    )
    .context("PBKDF2 key derivation failed")?;

    Ok(key_iv)
}

pub fn encrypt(passphrase: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    openssl::rand::rand_bytes(&mut salt).context("salt generation failed")?;

    let key_iv = derive_key_iv(passphrase, &salt)?;
    let ciphertext = openssl::symm::encrypt(
        Cipher::aes_256_cbc(),
        &key_iv[..KEY_LEN],
        Some(&key_iv[KEY_LEN..]),
        plaintext,
    )
    .context("AES-256-CBC encryption failed")?;

    let mut out = Vec::with_capacity(SALTED_MAGIC.len() + SALT_LEN + ciphertext.len());
    out.extend_from_slice(SALTED_MAGIC);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&ciphertext);

    Ok(out)
}

pub fn decrypt(passphrase: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < SALTED_MAGIC.len() + SALT_LEN
        || &ciphertext[..SALTED_MAGIC.len()] != SALTED_MAGIC
    {
        bail!("input is not a salted cipher container");
    }

    let salt = &ciphertext[SALTED_MAGIC.len()..SALTED_MAGIC.len() + SALT_LEN];
    let body = &ciphertext[SALTED_MAGIC.len() + SALT_LEN..];

    let key_iv = derive_key_iv(passphrase, salt)?;
    openssl::symm::decrypt(
        Cipher::aes_256_cbc(),
        &key_iv[..KEY_LEN],
        Some(&key_iv[KEY_LEN..]),
        body,
    )
    .context("AES-256-CBC decryption failed")
}
