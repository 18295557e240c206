// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Base-image selection from a cloud inventory listing.
//!
//! The three inventory shapes in the wild (terraform data source, CLI
//! export, raw API) differ in where they carry the checksum and the
//! operating-system attributes; normalization folds them into one form
//! before the candidate predicate runs.

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{version, Error, Result};

fn os_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^hyper-protect-[\w-]+-s390x-hpcr$").unwrap())
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^ibm-hyper-protect-container-runtime-(\d+)-(\d+)-s390x-(\d+)$").unwrap()
    })
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Image {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub file: Option<FileInfo>,
    #[serde(default, rename = "operating_system")]
    pub operating_system: Option<OsInfo>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FileInfo {
    pub checksums: Checksums,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Checksums {
    #[serde(default)]
    pub sha256: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OperatingSystem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub architecture: String,
}

/// The API shape nests the OS attributes in an object, the terraform data
/// source in a single-element list.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum OsInfo {
    One(OperatingSystem),
    Many(Vec<OperatingSystem>),
}

impl Image {
    /// Fold the shape-specific attribute locations into the flat fields.
    fn normalize(mut self) -> Self {
        if let Some(os_info) = &self.operating_system {
            let os = match os_info {
                OsInfo::One(os) => Some(os),
                OsInfo::Many(list) => list.first(),
            };
            if let Some(os) = os {
                if self.architecture.is_empty() {
                    self.architecture = os.architecture.clone();
                }
                if self.os.is_empty() {
                    self.os = os.name.clone();
                }
            }
        }

        if self.checksum.is_empty() {
            if let Some(file) = &self.file {
                self.checksum = file.checksums.sha256.clone();
            }
        }

        self
    }
}

/// An eligible image with the version derived from its name.
#[derive(Clone, Debug)]
pub struct ImageVersion {
    pub id: String,
    pub name: String,
    pub checksum: String,
    pub version: Version,
}

/// The resolved artifact.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct SelectedImage {
    pub id: String,
    pub name: String,
    pub checksum: String,
    pub version: String,
}

/// The eligibility predicate: s390x, available, public, and both the OS
/// and name match the fixed runtime patterns.
pub fn is_candidate(image: &Image) -> bool {
    image.architecture == "s390x"
        && image.status == "available"
        && image.visibility == "public"
        && os_pattern().is_match(&image.os)
        && name_pattern().is_match(&image.name)
}

/// Select the latest eligible image from an inventory JSON listing.
pub fn select_image(inventory_json: &str, constraint: &str) -> Result<SelectedImage> {
    if inventory_json.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let images: Vec<Image> = serde_json::from_str(inventory_json)
        .map_err(|e| Error::InvalidFormat(format!("parse image inventory: {e}")))?;

    let candidates: Vec<ImageVersion> = images
        .into_iter()
        .map(Image::normalize)
        .filter(is_candidate)
        .filter_map(|image| {
            let triplet = name_pattern().captures(&image.name)?;
            let version = Version::new(
                triplet[1].parse().ok()?,
                triplet[2].parse().ok()?,
                triplet[3].parse().ok()?,
            );

            Some(ImageVersion {
                id: image.id,
                checksum: image.checksum,
                version,
                name: image.name,
            })
        })
        .collect();

    pick_latest(candidates, constraint)
}

/// Pick the highest-versioned image satisfying `constraint`.
pub fn pick_latest(images: Vec<ImageVersion>, constraint: &str) -> Result<SelectedImage> {
    if images.is_empty() {
        return Err(Error::EmptyParameter);
    }

    let by_version: HashMap<String, ImageVersion> = images
        .into_iter()
        .map(|image| (image.version.to_string(), image))
        .collect();

    let (version, image) = version::resolve_latest(&by_version, constraint)?;

    Ok(SelectedImage {
        id: image.id.clone(),
        name: image.name.clone(),
        checksum: image.checksum.clone(),
        version: version.to_string(),
    })
}
