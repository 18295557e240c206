// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("required parameter is empty")]
    EmptyParameter,

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("no version matching the constraint: {0}")]
    NoMatchingVersion(String),

    #[error("invalid inventory data: {0}")]
    InvalidFormat(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("no artifact published at {0}")]
    NotFound(String),

    #[error("certificate check failed: {0}")]
    Certificate(#[from] contract::Error),

    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),
}
