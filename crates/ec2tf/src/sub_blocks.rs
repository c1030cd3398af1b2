//! nested blocks inside the instance resource
//!
//! Every emitter builds one nested construct laid out at the given indent and returns `None` when there is
//! nothing to emit. Sub-fields are only listed when they are set on the source; the only invented values are
//! the volume type and size defaults of storage blocks.
use crate::description::{
    BlockDeviceRef, CapacityReservation, CreditSpecification, MetadataOptions, Volume,
};
use crate::syntax::{BlockWriter, BodyWriter};
use crate::tags::tags_attribute;
use hcl_edit::structure::{Attribute, Block};
use hcl_edit::Ident;

pub const DEFAULT_VOLUME_TYPE: &str = "gp2";
pub const DEFAULT_VOLUME_SIZE: u64 = 8;

/// `root_block_device { ... }`
pub fn root_block_device(device: &BlockDeviceRef, volume: &Volume, indent: usize) -> Block {
    let mut block = BlockWriter::nested("root_block_device", indent);
    storage_body(&mut block.body, device, volume, indent + 2);
    block.finish()
}

/// `ebs_block_device { ... }` for a non-root volume
pub fn ebs_block_device(device: &BlockDeviceRef, volume: &Volume, indent: usize) -> Block {
    let mut block = BlockWriter::nested("ebs_block_device", indent);
    block.body.attribute("device_name", device.device_name.as_str());
    storage_body(&mut block.body, device, volume, indent + 2);
    block.finish()
}

fn storage_body(
    body: &mut BodyWriter,
    device: &BlockDeviceRef,
    volume: &Volume,
    inner_indent: usize,
) {
    body.attribute(
        "volume_type",
        volume
            .volume_type
            .as_deref()
            .unwrap_or(DEFAULT_VOLUME_TYPE),
    )
    .attribute("volume_size", volume.size.unwrap_or(DEFAULT_VOLUME_SIZE));

    if let Some(iops) = volume.iops {
        body.attribute("iops", iops);
    }
    if let Some(throughput) = volume.throughput {
        body.attribute("throughput", throughput);
    }
    if volume.encrypted {
        body.attribute("encrypted", true);
    }
    if let Some(kms_key_id) = &volume.kms_key_id {
        body.attribute("kms_key_id", kms_key_id.as_str());
    }
    body.attribute("delete_on_termination", device.delete_on_termination);

    if !volume.tags.is_empty() {
        body.section()
            .structure(tags_attribute(&volume.tags, inner_indent));
    }
}

/// `ephemeral_block_device { ... }` for an instance store device
pub fn ephemeral_block_device(device: &BlockDeviceRef, indent: usize) -> Option<Block> {
    let virtual_name = device.virtual_name.as_ref()?;

    let mut block = BlockWriter::nested("ephemeral_block_device", indent);
    block
        .body
        .attribute("device_name", device.device_name.as_str())
        .attribute("virtual_name", virtual_name.as_str());
    Some(block.finish())
}

pub fn credit_specification(credit: Option<&CreditSpecification>, indent: usize) -> Option<Block> {
    let cpu_credits = credit.and_then(|credit| credit.cpu_credits.as_deref())?;

    let mut block = BlockWriter::nested("credit_specification", indent);
    block.body.attribute("cpu_credits", cpu_credits);
    Some(block.finish())
}

pub fn metadata_options(metadata: Option<&MetadataOptions>, indent: usize) -> Option<Block> {
    let metadata = metadata?;

    let mut block = BlockWriter::nested("metadata_options", indent);
    if let Some(http_endpoint) = &metadata.http_endpoint {
        block.body.attribute("http_endpoint", http_endpoint.as_str());
    }
    if let Some(http_tokens) = &metadata.http_tokens {
        block.body.attribute("http_tokens", http_tokens.as_str());
    }
    if let Some(hop_limit) = metadata.http_put_response_hop_limit {
        block.body.attribute("http_put_response_hop_limit", hop_limit);
    }
    if let Some(metadata_tags) = &metadata.instance_metadata_tags {
        block
            .body
            .attribute("instance_metadata_tags", metadata_tags.as_str());
    }

    if block.body.is_empty() {
        return None;
    }
    Some(block.finish())
}

pub fn enclave_options(enabled: Option<bool>, indent: usize) -> Option<Block> {
    if enabled != Some(true) {
        return None;
    }

    let mut block = BlockWriter::nested("enclave_options", indent);
    block.body.attribute("enabled", true);
    Some(block.finish())
}

pub fn capacity_reservation_specification(
    reservation: Option<&CapacityReservation>,
    indent: usize,
) -> Option<Block> {
    let preference = reservation.and_then(|reservation| reservation.preference.as_deref())?;

    let mut block = BlockWriter::nested("capacity_reservation_specification", indent);
    block
        .body
        .attribute("capacity_reservation_preference", preference);
    Some(block.finish())
}

/// `hibernation = true`; a flag, not a block
pub fn hibernation(configured: Option<bool>) -> Option<Attribute> {
    (configured == Some(true)).then(|| Attribute::new(Ident::new("hibernation"), true))
}
