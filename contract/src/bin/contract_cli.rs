// Copyright (c) 2025 IBM Corp.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser};
use contract::{assemble, attestation, certificate, encode, schema, Platform};
use crypto::OpensslProvider;

#[derive(Parser)]
#[command(name = "contract")]
#[command(bin_name = "contract")]
#[command(author, version, about, long_about = None)]
enum Cli {
    /// Validate a contract against the platform schema
    Validate(ValidateArgs),

    /// Sign and encrypt a contract for deployment
    Encrypt(EncryptArgs),

    /// Decrypt an envelope-encrypted text blob
    Decrypt(DecryptArgs),

    /// Decrypt attestation records
    Attestation(AttestationArgs),

    /// Report the validity of an encryption certificate
    CertValidity(CertValidityArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// path of the contract YAML file
    #[arg(short, long)]
    contract: PathBuf,

    /// target platform: hpvs, hpcr-rhvs or hpcc-peerpod
    #[arg(short, long, default_value = "hpvs")]
    platform: String,
}

#[derive(Args)]
struct EncryptArgs {
    /// path of the contract YAML file
    #[arg(short, long)]
    contract: PathBuf,

    /// target platform: hpvs, hpcr-rhvs or hpcc-peerpod
    #[arg(short, long, default_value = "hpvs")]
    platform: String,

    /// path of the encryption certificate (PEM)
    #[arg(short = 'e', long)]
    encryption_certificate: PathBuf,

    /// path of the signing private key (PEM)
    #[arg(short = 'k', long)]
    private_key: PathBuf,

    /// path of the CA certificate, enables certificate-expiry signing
    #[arg(long, requires = "ca_key")]
    ca_certificate: Option<PathBuf>,

    /// path of the CA private key
    #[arg(long, requires = "ca_certificate")]
    ca_key: Option<PathBuf>,

    /// path of a JSON file with CSR subject fields
    #[arg(long)]
    csr_subject: Option<PathBuf>,

    /// path of a ready-made CSR (PEM)
    #[arg(long)]
    csr_pem: Option<PathBuf>,

    /// signing-certificate lifetime in days
    #[arg(long, default_value_t = 365)]
    expiry_days: u32,
}

#[derive(Args)]
struct DecryptArgs {
    /// path of the encrypted input
    #[arg(short, long)]
    input: PathBuf,

    /// path of the recipient private key (PEM)
    #[arg(short = 'k', long)]
    private_key: PathBuf,
}

#[derive(Args)]
struct AttestationArgs {
    /// path of the sealed attestation records
    #[arg(short, long)]
    input: PathBuf,

    /// path of the attestation private key (PEM)
    #[arg(short = 'k', long)]
    private_key: PathBuf,
}

#[derive(Args)]
struct CertValidityArgs {
    /// path of the certificate (PEM)
    #[arg(short, long)]
    certificate: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let provider = OpensslProvider::new();

    match Cli::parse() {
        Cli::Validate(args) => {
            let contract = fs::read_to_string(&args.contract).context("read contract")?;
            let platform = Platform::resolve(&args.platform)?;
            schema::validate_contract(&contract, platform)?;
            println!("contract is valid for {platform}");
        }
        Cli::Encrypt(args) => {
            let contract = fs::read_to_string(&args.contract).context("read contract")?;
            let platform = Platform::resolve(&args.platform)?;
            let encryption_certificate = fs::read_to_string(&args.encryption_certificate)
                .context("read encryption certificate")?;
            let private_key =
                fs::read_to_string(&args.private_key).context("read private key")?;

            let signed = match (&args.ca_certificate, &args.ca_key) {
                (Some(ca_certificate), Some(ca_key)) => {
                    let ca_certificate =
                        fs::read_to_string(ca_certificate).context("read CA certificate")?;
                    let ca_key = fs::read_to_string(ca_key).context("read CA key")?;
                    let csr_subject = args
                        .csr_subject
                        .as_ref()
                        .map(fs::read_to_string)
                        .transpose()
                        .context("read CSR subject fields")?;
                    let csr_pem = args
                        .csr_pem
                        .as_ref()
                        .map(fs::read_to_string)
                        .transpose()
                        .context("read CSR PEM")?;

                    assemble::sign_and_encrypt_with_expiry(
                        &provider,
                        &contract,
                        platform,
                        &encryption_certificate,
                        &private_key,
                        &ca_certificate,
                        &ca_key,
                        csr_subject.as_deref(),
                        csr_pem.as_deref(),
                        args.expiry_days,
                    )?
                }
                _ => assemble::sign_and_encrypt(
                    &provider,
                    &contract,
                    platform,
                    &encryption_certificate,
                    &private_key,
                )?,
            };

            print!("{}", signed.to_yaml()?);
        }
        Cli::Decrypt(args) => {
            let sealed = fs::read_to_string(&args.input).context("read input")?;
            let private_key =
                fs::read_to_string(&args.private_key).context("read private key")?;

            let artifact = encode::decrypted_text(&provider, &sealed, &private_key)?;
            print!("{}", artifact.value);
        }
        Cli::Attestation(args) => {
            let sealed = fs::read_to_string(&args.input).context("read input")?;
            let private_key =
                fs::read_to_string(&args.private_key).context("read private key")?;

            let records = attestation::attestation_records(&provider, &sealed, &private_key)?;
            print!("{records}");
        }
        Cli::CertValidity(args) => {
            let certificate =
                fs::read_to_string(&args.certificate).context("read certificate")?;

            let validity = certificate::check_validity(&provider, &certificate)?;
            println!("{}", serde_json::to_string_pretty(&validity)?);
        }
    }

    Ok(())
}
