//! In-memory description of an instance and its attachments
//!
//! A [ResourceDescription] is produced once by whatever fetched the instance (API client, fixture file, ...) and
//! is only ever read afterwards. Every field that the upstream API may omit is an [Option] (or an empty
//! collection); emitters gate on presence and never on key existence.
use crate::tags::Tags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The primary compute resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDescription {
    pub instance_id: String,
    pub image_id: String,
    pub instance_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    pub placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    /// instance level groups, only consulted when there is no interface data
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub security_groups: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile_arn: Option<String>,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub source_dest_check: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub monitoring: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub ebs_optimized: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_api_termination: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_specification: Option<CreditSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_options: Option<MetadataOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclave_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_reservation: Option<CapacityReservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hibernation_configured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_device_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_devices: Vec<BlockDeviceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network_interfaces: Vec<NetworkInterfaceRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floating_addresses: Vec<FloatingAddress>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl Default for ResourceDescription {
    fn default() -> Self {
        Self {
            instance_id: Default::default(),
            image_id: Default::default(),
            instance_type: Default::default(),
            state: None,
            vpc_id: None,
            key_name: None,
            placement: Default::default(),
            subnet_id: None,
            private_ip_address: None,
            security_groups: Default::default(),
            iam_instance_profile_arn: None,
            source_dest_check: true,
            monitoring: false,
            ebs_optimized: false,
            disable_api_termination: false,
            credit_specification: None,
            metadata_options: None,
            enclave_enabled: None,
            capacity_reservation: None,
            hibernation_configured: None,
            user_data: None,
            root_device_name: None,
            block_devices: Default::default(),
            network_interfaces: Default::default(),
            floating_addresses: Default::default(),
            tags: Default::default(),
        }
    }
}

impl ResourceDescription {
    /// Minimal description: only the mandatory fields are set
    pub fn new(
        instance_id: impl Into<String>,
        image_id: impl Into<String>,
        instance_type: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            ..Default::default()
        }
    }

    /// Human label of the instance: the `Name` tag, or the instance id when untagged or the tag is empty
    pub fn label(&self) -> &str {
        self.tags
            .get("Name")
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.instance_id)
    }

    /// The interface with the lowest attachment index
    pub fn primary_interface(&self) -> Option<&NetworkInterfaceRef> {
        self.network_interfaces
            .iter()
            .min_by_key(|interface| interface.device_index)
    }

    /// The block device whose name equals the root device name
    pub fn root_device(&self) -> Option<&BlockDeviceRef> {
        let root_device_name = self.root_device_name.as_deref()?;
        self.block_devices
            .iter()
            .find(|device| device.device_name == root_device_name)
    }

    /// Classify a block device of this description
    pub fn device_kind<'a>(&self, device: &'a BlockDeviceRef) -> DeviceKind<'a> {
        match (&device.volume, &device.virtual_name) {
            (Some(volume), _) if self.root_device_name.as_deref() == Some(device.device_name.as_str()) => {
                DeviceKind::Root(volume)
            }
            (Some(volume), _) => DeviceKind::Additional(volume),
            (None, Some(virtual_name)) => DeviceKind::Ephemeral(virtual_name),
            (None, None) => DeviceKind::Unmapped,
        }
    }

    /// Name of the credential profile: last path segment of the profile reference
    pub fn instance_profile_name(&self) -> Option<&str> {
        self.iam_instance_profile_arn
            .as_deref()
            .and_then(|arn| arn.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// How a [BlockDeviceRef] is rendered
#[derive(Debug, PartialEq)]
pub enum DeviceKind<'a> {
    Root(&'a Volume),
    Additional(&'a Volume),
    Ephemeral(&'a str),
    /// neither volume nor virtual device; nothing to render
    Unmapped,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

impl Placement {
    /// Tenancy, unless it is the implicit `default`
    pub fn non_default_tenancy(&self) -> Option<&str> {
        self.tenancy
            .as_deref()
            .filter(|tenancy| !tenancy.is_empty() && *tenancy != "default")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_credits: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_tokens: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_put_response_hop_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_metadata_tags: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityReservation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
}

/// User data exactly as the API returns it (base64 text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
#[serde(transparent)]
pub struct UserData {
    pub encoded: String,
}

impl UserData {
    pub fn encode(raw: impl AsRef<[u8]>) -> Self {
        use base64::Engine;
        Self::new(base64::engine::general_purpose::STANDARD.encode(raw))
    }

    /// Decoded payload, if it is valid base64 holding utf-8 text
    pub fn decode_text(&self) -> Option<String> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.encoded.trim())
            .ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct BlockDeviceRef {
    pub device_name: String,
    /// absent for instance store devices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_name: Option<String>,
    #[new(value = "true")]
    #[serde(default = "default_true")]
    pub delete_on_termination: bool,
}

impl BlockDeviceRef {
    pub fn ephemeral(device_name: impl Into<String>, virtual_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            volume: None,
            virtual_name: Some(virtual_name.into()),
            delete_on_termination: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_new::new)]
#[serde(default)]
pub struct Volume {
    pub volume_id: String,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iops: Option<u64>,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<u64>,
    #[new(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub encrypted: bool,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[new(default)]
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct NetworkInterfaceRef {
    pub interface_id: String,
    pub device_index: u32,
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[new(default)]
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub security_groups: BTreeSet<String>,
    #[new(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_addresses: Vec<String>,
    #[new(value = "true")]
    #[serde(default = "default_true")]
    pub source_dest_check: bool,
    #[new(default)]
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_new::new)]
#[serde(default)]
pub struct FloatingAddress {
    pub allocation_id: String,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    #[new(default)]
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

/// Supported encodings of a serialized [ResourceDescription]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl ResourceDescription {
    pub fn from_reader(reader: impl Read, format: Format) -> Result<Self, LoadError> {
        let description = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(description)
    }

    pub fn load_file(path: &std::path::Path, format: Format) -> Result<Self, LoadError> {
        tracing::info!(path=%path.display(), "loading description");
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), format)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse json description")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Unable to parse yaml description")]
    YamlParseFailed(#[from] serde_yaml::Error),
}
