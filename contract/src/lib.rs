// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Contract
//!
//! Assembly, validation, encryption and signing of deployment contracts for
//! confidential-computing platforms.
//!
//! A contract is a YAML document with a `workload` section and an `env`
//! section. This crate validates the document against the schema of the
//! target [`Platform`], hybrid-encrypts both sections into
//! [`envelope::Envelope`] wire strings, injects the signing credential into
//! `env` and signs the encrypted sections, producing a
//! [`assemble::SignedContract`] the receiving trusted execution environment
//! can authenticate. The decrypt side recovers attestation records from the
//! same envelope format.
//!
//! All cryptographic primitives are delegated to a
//! [`crypto::CryptoProvider`].

pub mod assemble;
pub mod attestation;
pub mod certificate;
pub mod encode;
pub mod envelope;
pub mod platform;
pub mod schema;

mod error;
pub use error::{Error, Result};

pub use platform::Platform;
