// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

//! JSON-Schema validation of contracts and network configurations.

use jsonschema::JSONSchema;
use serde_json::{Map, Value};

use crate::{assemble::UnsignedContract, Error, Platform, Result};

const NETWORK_SCHEMA: &str = include_str!("../schemas/network.json");

/// Validate a contract document against the schema of `platform`.
///
/// The `workload` and `env` sections arrive as embedded YAML strings; they
/// are parsed into sub-documents before validation so the schema sees the
/// structured form.
pub fn validate_contract(contract: &str, platform: Platform) -> Result<()> {
    let document = contract_document(contract)?;

    validate(&document, platform.contract_schema())
}

/// Validate an on-premise network configuration.
pub fn validate_network_config(config: &str) -> Result<()> {
    // The configuration is required to be YAML proper; JSON input is a
    // caller mistake this check has always rejected.
    if serde_json::from_str::<Value>(config).is_ok() {
        return Err(Error::InvalidInput(
            "network configuration must be YAML, not JSON",
        ));
    }

    let document: Value = yaml_to_json(
        serde_yaml::from_str(config)
            .map_err(|e| Error::SchemaValidationFailed(format!("parse network config: {e}")))?,
    )?;

    validate(&document, NETWORK_SCHEMA)
}

fn contract_document(contract: &str) -> Result<Value> {
    let unsigned: UnsignedContract = serde_yaml::from_str(contract)
        .map_err(|e| Error::SchemaValidationFailed(format!("parse contract: {e}")))?;

    let workload: serde_yaml::Value = serde_yaml::from_str(&unsigned.workload)
        .map_err(|e| Error::SchemaValidationFailed(format!("parse workload section: {e}")))?;
    let env: serde_yaml::Value = serde_yaml::from_str(&unsigned.env)
        .map_err(|e| Error::SchemaValidationFailed(format!("parse env section: {e}")))?;

    let mut document = Map::new();
    document.insert("workload".to_string(), yaml_to_json(workload)?);
    document.insert("env".to_string(), yaml_to_json(env)?);
    if let Some(signature) = unsigned.env_workload_signature {
        document.insert("envWorkloadSignature".to_string(), Value::String(signature));
    }

    Ok(Value::Object(document))
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::SchemaValidationFailed(format!("section is not JSON-representable: {e}")))
}

fn validate(document: &Value, schema: &str) -> Result<()> {
    let schema: Value = serde_json::from_str(schema)?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| Error::SchemaValidationFailed(format!("schema compile: {e}")))?;

    if let Err(violations) = compiled.validate(document) {
        let joined = violations
            .map(|violation| format!("{}: {violation}", violation.instance_path))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::SchemaValidationFailed(joined));
    }

    Ok(())
}
