//! resources that live next to the instance
//!
//! Elastic IPs and secondary network interfaces are rendered as standalone resources plus an association /
//! attachment resource pointing back at the instance.
use crate::description::ResourceDescription;
use crate::instance::{primary_symbol, RESOURCE_TYPE as INSTANCE};
use crate::syntax::{self, BlockWriter, BodyWriter};
use crate::tags::tags_attribute;
use hcl::Identifier;

/// Symbol of the n-th (zero based) elastic ip
pub fn floating_address_symbol(primary: &Identifier, index: usize) -> Identifier {
    match index {
        0 => Identifier::unchecked(format!("{primary}_eip")),
        n => Identifier::unchecked(format!("{primary}_eip_{n}")),
    }
}

/// Symbol of the interface attached at `device_index`
pub fn interface_symbol(primary: &Identifier, device_index: u32) -> Identifier {
    Identifier::unchecked(format!("{primary}_eni_{device_index}"))
}

/// One fragment per elastic ip, in input order
pub fn emit_floating_addresses(description: &ResourceDescription) -> Vec<String> {
    let primary = primary_symbol(description);

    description
        .floating_addresses
        .iter()
        .enumerate()
        .map(|(index, address)| {
            let symbol = floating_address_symbol(&primary, index);
            tracing::debug!(allocation_id = %address.allocation_id, %symbol, "elastic ip");

            tracing::trace!(public_ip = ?address.public_ip);

            let mut eip = BlockWriter::resource("aws_eip", &symbol);
            eip.body.attribute("domain", "vpc");
            if !address.tags.is_empty() {
                eip.body.section().structure(tags_attribute(&address.tags, 2));
            }

            let assoc_symbol = Identifier::unchecked(format!("{symbol}_assoc"));
            let mut association = BlockWriter::resource("aws_eip_association", &assoc_symbol);
            association
                .body
                .attribute("instance_id", syntax::reference(INSTANCE, &primary, "id"))
                .attribute("allocation_id", syntax::reference("aws_eip", &symbol, "id"));

            let mut fragment = BodyWriter::new(0);
            fragment
                .comment(&format!("Elastic IP for {}", description.label()))
                .structure(eip.finish())
                .section()
                .structure(association.finish());
            fragment.render()
        })
        .collect()
}

/// One fragment per secondary interface, by ascending device index
///
/// Every interface sharing the lowest device index is the primary interface; it is represented by the instance
/// resource itself and never rendered here.
pub fn emit_network_interfaces(description: &ResourceDescription) -> Vec<String> {
    let Some(primary_index) = description
        .primary_interface()
        .map(|interface| interface.device_index)
    else {
        return vec![];
    };
    let primary = primary_symbol(description);

    let mut secondary: Vec<_> = description
        .network_interfaces
        .iter()
        .filter(|interface| interface.device_index > primary_index)
        .collect();
    secondary.sort_by_key(|interface| interface.device_index);

    secondary
        .into_iter()
        .map(|interface| {
            let symbol = interface_symbol(&primary, interface.device_index);
            tracing::debug!(interface_id = %interface.interface_id, %symbol, "secondary interface");

            let mut eni = BlockWriter::resource("aws_network_interface", &symbol);
            if let Some(subnet_id) = &interface.subnet_id {
                eni.body.attribute("subnet_id", subnet_id.as_str());
            }
            if !interface.security_groups.is_empty() {
                eni.body.attribute(
                    "security_groups",
                    syntax::string_list(&interface.security_groups),
                );
            }
            if !interface.private_addresses.is_empty() {
                eni.body.attribute(
                    "private_ips",
                    syntax::string_list(&interface.private_addresses),
                );
            }
            if !interface.source_dest_check {
                eni.body.attribute("source_dest_check", false);
            }
            if !interface.tags.is_empty() {
                eni.body
                    .section()
                    .structure(tags_attribute(&interface.tags, 2));
            }

            let attach_symbol = Identifier::unchecked(format!("{symbol}_attach"));
            let mut attachment =
                BlockWriter::resource("aws_network_interface_attachment", &attach_symbol);
            attachment
                .body
                .attribute("instance_id", syntax::reference(INSTANCE, &primary, "id"))
                .attribute(
                    "network_interface_id",
                    syntax::reference("aws_network_interface", &symbol, "id"),
                )
                .attribute("device_index", interface.device_index);

            let mut fragment = BodyWriter::new(0);
            fragment
                .comment(&format!(
                    "Additional network interface (device index {})",
                    interface.device_index
                ))
                .structure(eni.finish())
                .section()
                .structure(attachment.finish());
            fragment.render()
        })
        .collect()
}
