// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Crypto
//!
//! This crate encapsulates the cryptographic operations behind the contract
//! tooling: asymmetric encryption under an X.509 certificate, passphrase
//! based symmetric encryption in the OpenSSL `Salted__` container format,
//! SHA-256 detached signatures, CSR construction and CA-signed certificate
//! issuance.
//!
//! All operations are reachable through the [`CryptoProvider`] trait so the
//! protocol layers never depend on a concrete backend. The production
//! implementation is [`OpensslProvider`], backed by the `openssl` crate.

mod native;
pub use native::OpensslProvider;

mod provider;
pub use provider::*;
