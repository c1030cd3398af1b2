//! ec2tf cli interface

use clap::{Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

/// Convert an EC2 instance description into Terraform configuration
///
/// Examples:
///
///   ec2tf --region us-east-1 --instance-id i-1234567890abcdef0 --input instance.json
///
///   ec2tf --region us-east-1 --instance-id i-1234567890abcdef0 -i instance.json -o instance.tf --json raw.json
///
///   describe-instance ... | ec2tf --region eu-west-1 --instance-id i-0987654321fedcba
#[derive(Parser, Debug)]
#[command(author, version, about, long_about, verbatim_doc_comment)]
pub struct Cli {
    /// AWS region (e.g., us-east-1, us-west-2)
    #[clap(long)]
    pub region: String,

    /// EC2 instance ID (e.g., i-1234567890abcdef0)
    #[clap(long = "instance-id")]
    pub instance_id: String,

    /// AWS CLI profile the description was fetched with
    #[clap(long)]
    pub profile: Option<String>,

    #[clap(flatten)]
    pub input: InputArgs,

    /// Output Terraform file path (default: print to stdout)
    #[clap(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Also export raw instance details to a JSON file
    #[clap(long = "json")]
    pub json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load the instance description from a file
    ///
    /// Reads from stdin when omitted
    #[clap(short = 'i', long = "input")]
    pub file: Option<PathBuf>,

    #[arg(short = 'F', long = "input-format", default_value_t)]
    pub format: InputFormat,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum InputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Json => f.write_str("json"),
            InputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl From<InputFormat> for ec2tf::description::Format {
    fn from(value: InputFormat) -> Self {
        match value {
            InputFormat::Json => ec2tf::description::Format::Json,
            InputFormat::Yaml => ec2tf::description::Format::Yaml,
        }
    }
}
