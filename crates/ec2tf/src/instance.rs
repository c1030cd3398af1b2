//! the `aws_instance` resource block
use crate::description::{DeviceKind, ResourceDescription};
use crate::identifier::sanitize;
use crate::sub_blocks;
use crate::syntax::{self, BlockWriter, BodyWriter};
use crate::tags::tags_attribute;
use hcl_edit::structure::Structure;

pub const RESOURCE_TYPE: &str = "aws_instance";

/// Decoded user data is only shown as a comment below this many characters
pub const USER_DATA_COMMENT_LIMIT: usize = 500;

/// Symbol of the instance resource, derived from its `Name` tag or id
pub fn primary_symbol(description: &ResourceDescription) -> hcl::Identifier {
    sanitize(description.label())
}

/// Render the `resource "aws_instance"` block
///
/// Statement order is fixed: mandatory scalars, optional scalars, optional nested blocks, user data, storage
/// (root, additional, ephemeral), tags and finally the advisory lifecycle placeholder. Nothing is emitted for a
/// field the description does not carry.
#[tracing::instrument(level = "debug", skip_all, fields(instance_id = %description.instance_id))]
pub fn emit_primary(description: &ResourceDescription) -> String {
    const INNER: usize = 2;

    let symbol = primary_symbol(description);
    let mut block = BlockWriter::resource(RESOURCE_TYPE, &symbol);
    let body = &mut block.body;

    body.attribute("ami", description.image_id.as_str())
        .attribute("instance_type", description.instance_type.as_str());
    scalars(body, description);

    let nested: [Option<Structure>; 5] = [
        sub_blocks::credit_specification(description.credit_specification.as_ref(), INNER)
            .map(Structure::from),
        sub_blocks::metadata_options(description.metadata_options.as_ref(), INNER)
            .map(Structure::from),
        sub_blocks::enclave_options(description.enclave_enabled, INNER).map(Structure::from),
        sub_blocks::capacity_reservation_specification(
            description.capacity_reservation.as_ref(),
            INNER,
        )
        .map(Structure::from),
        sub_blocks::hibernation(description.hibernation_configured).map(Structure::from),
    ];
    for structure in nested.into_iter().flatten() {
        body.section().structure(structure);
    }

    user_data(body, description);
    storage(body, description, INNER);

    if !description.tags.is_empty() {
        body.section()
            .structure(tags_attribute(&description.tags, INNER));
    }

    advisory(body);

    block.render()
}

fn scalars(body: &mut BodyWriter, description: &ResourceDescription) {
    let placement = &description.placement;

    if let Some(key_name) = &description.key_name {
        body.attribute("key_name", key_name.as_str());
    }
    if let Some(availability_zone) = &placement.availability_zone {
        body.attribute("availability_zone", availability_zone.as_str());
    }
    if let Some(subnet_id) = &description.subnet_id {
        body.attribute("subnet_id", subnet_id.as_str());
    }

    // groups live on the primary interface; the instance level list is only a fallback without interface data
    let security_groups = match description.primary_interface() {
        Some(interface) => &interface.security_groups,
        None => &description.security_groups,
    };
    if !security_groups.is_empty() {
        body.attribute("vpc_security_group_ids", syntax::string_list(security_groups));
    }

    if let Some(private_ip) = &description.private_ip_address {
        body.attribute("private_ip", private_ip.as_str());
    }
    if let Some(profile_name) = description.instance_profile_name() {
        body.attribute("iam_instance_profile", profile_name);
    }
    if !description.source_dest_check {
        body.attribute("source_dest_check", false);
    }
    if description.monitoring {
        body.attribute("monitoring", true);
    }
    if description.ebs_optimized {
        body.attribute("ebs_optimized", true);
    }
    if description.disable_api_termination {
        body.attribute("disable_api_termination", true);
    }
    if let Some(tenancy) = placement.non_default_tenancy() {
        body.attribute("tenancy", tenancy);
    }
    if let Some(group_name) = &placement.group_name {
        body.attribute("placement_group", group_name.as_str());
    }
    if let Some(host_id) = &placement.host_id {
        body.attribute("host_id", host_id.as_str());
    }
}

fn user_data(body: &mut BodyWriter, description: &ResourceDescription) {
    let Some(user_data) = &description.user_data else {
        return;
    };

    body.section()
        .comment("User data (base64 encoded)")
        .attribute("user_data_base64", user_data.encoded.as_str());

    match user_data.decode_text() {
        Some(decoded) if decoded.chars().count() < USER_DATA_COMMENT_LIMIT => {
            body.comment("Decoded user data:");
            for line in decoded.lines() {
                body.comment(line);
            }
        }
        Some(decoded) => {
            tracing::debug!(
                length = decoded.chars().count(),
                "decoded user data too long for a comment"
            );
        }
        None => tracing::debug!("user data is not base64 encoded text"),
    }
}

fn storage(body: &mut BodyWriter, description: &ResourceDescription, indent: usize) {
    if description.root_device().is_none() {
        tracing::warn!(
            root_device_name = ?description.root_device_name,
            "root device not found among block devices"
        );
    }

    let mut root = vec![];
    let mut additional = vec![];
    let mut ephemeral = vec![];

    for device in &description.block_devices {
        match description.device_kind(device) {
            DeviceKind::Root(volume) => {
                root.push(sub_blocks::root_block_device(device, volume, indent))
            }
            DeviceKind::Additional(volume) => {
                additional.push(sub_blocks::ebs_block_device(device, volume, indent))
            }
            DeviceKind::Ephemeral(_) => {
                ephemeral.extend(sub_blocks::ephemeral_block_device(device, indent))
            }
            DeviceKind::Unmapped => {
                tracing::debug!(device_name = %device.device_name, "skipping unmapped block device")
            }
        }
    }

    tracing::debug!(
        root = root.len(),
        additional = additional.len(),
        ephemeral = ephemeral.len(),
        "classified block devices"
    );

    // a repeated root device name must not produce a second root block
    root.truncate(1);

    for block in root.into_iter().chain(additional).chain(ephemeral) {
        body.section().structure(block);
    }
}

fn advisory(body: &mut BodyWriter) {
    body.section()
        .comment("Set volume_tags if you want different tags for volumes")
        .comment("volume_tags = {}");

    let mut lifecycle = BlockWriter::nested("lifecycle", 2);
    lifecycle
        .body
        .comment("Prevent accidental instance replacement")
        .comment("ignore_changes = [ami, user_data]");
    body.section().structure(lifecycle.finish());
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::description::{
        BlockDeviceRef, CreditSpecification, MetadataOptions, NetworkInterfaceRef, UserData,
        Volume,
    };
    use crate::tags::Tags;
    use pretty_assertions::assert_eq;

    fn minimal() -> ResourceDescription {
        let mut description = ResourceDescription::new("i-0abc", "ami-123", "t3.micro");
        description.root_device_name = Some("/dev/xvda".into());
        description.block_devices = vec![BlockDeviceRef::new(
            "/dev/xvda".into(),
            Some(Volume::new("vol-root".into())),
        )];
        description
    }

    #[test]
    fn minimal_description() {
        let expected = r#"resource "aws_instance" "i_0abc" {
  ami           = "ami-123"
  instance_type = "t3.micro"

  root_block_device {
    volume_type           = "gp2"
    volume_size           = 8
    delete_on_termination = true
  }

  # Set volume_tags if you want different tags for volumes
  # volume_tags = {}

  lifecycle {
    # Prevent accidental instance replacement
    # ignore_changes = [ami, user_data]
  }
}"#;
        assert_eq!(emit_primary(&minimal()), expected);
    }

    #[test]
    fn minimal_has_no_optional_fields() {
        let rendered = emit_primary(&minimal());
        for absent in [
            "key_name",
            "availability_zone",
            "subnet_id",
            "vpc_security_group_ids",
            "private_ip",
            "iam_instance_profile",
            "source_dest_check",
            "monitoring",
            "ebs_optimized",
            "disable_api_termination",
            "tenancy",
            "placement_group",
            "host_id",
            "credit_specification",
            "metadata_options",
            "enclave_options",
            "capacity_reservation_specification",
            "hibernation",
            "user_data_base64",
            "ebs_block_device",
            "ephemeral_block_device",
            "\n  tags = {",
        ] {
            assert!(!rendered.contains(absent), "unexpected {absent} in\n{rendered}");
        }
        assert_eq!(rendered.matches("root_block_device {").count(), 1);
    }

    #[test]
    fn scalars_in_order() {
        let mut description = minimal();
        description.key_name = Some("deploy".into());
        description.placement.availability_zone = Some("us-east-1a".into());
        description.placement.tenancy = Some("dedicated".into());
        description.placement.group_name = Some("cluster-a".into());
        description.placement.host_id = Some("h-123".into());
        description.subnet_id = Some("subnet-1".into());
        description.private_ip_address = Some("10.0.0.10".into());
        description.iam_instance_profile_arn =
            Some("arn:aws:iam::1:instance-profile/web-profile".into());
        description.source_dest_check = false;
        description.monitoring = true;
        description.ebs_optimized = true;
        description.disable_api_termination = true;
        description.security_groups = ["sg-2".to_string(), "sg-1".to_string()].into();

        let rendered = emit_primary(&description);
        let expected_head = r#"resource "aws_instance" "i_0abc" {
  ami                     = "ami-123"
  instance_type           = "t3.micro"
  key_name                = "deploy"
  availability_zone       = "us-east-1a"
  subnet_id               = "subnet-1"
  vpc_security_group_ids  = ["sg-1", "sg-2"]
  private_ip              = "10.0.0.10"
  iam_instance_profile    = "web-profile"
  source_dest_check       = false
  monitoring              = true
  ebs_optimized           = true
  disable_api_termination = true
  tenancy                 = "dedicated"
  placement_group         = "cluster-a"
  host_id                 = "h-123"

  root_block_device {"#;
        assert!(
            rendered.starts_with(expected_head),
            "unexpected head:\n{rendered}"
        );
    }

    #[test]
    fn default_tenancy_is_omitted() {
        let mut description = minimal();
        description.placement.tenancy = Some("default".into());
        assert!(!emit_primary(&description).contains("tenancy"));
    }

    #[test]
    fn security_groups_prefer_primary_interface() {
        let mut description = minimal();
        description.security_groups = ["sg-instance".to_string()].into();

        let mut primary = NetworkInterfaceRef::new("eni-0".into(), 0);
        primary.security_groups = ["sg-primary".to_string()].into();
        let mut secondary = NetworkInterfaceRef::new("eni-1".into(), 1);
        secondary.security_groups = ["sg-secondary".to_string()].into();
        description.network_interfaces = vec![secondary, primary];

        let rendered = emit_primary(&description);
        assert!(rendered.contains(r#"vpc_security_group_ids = ["sg-primary"]"#));
        assert!(!rendered.contains("sg-instance"));
        assert!(!rendered.contains("sg-secondary"));
    }

    #[test]
    fn security_groups_fall_back_to_instance_list() {
        let mut description = minimal();
        description.security_groups = ["sg-instance".to_string()].into();
        assert!(emit_primary(&description).contains(r#"vpc_security_group_ids = ["sg-instance"]"#));
    }

    #[test]
    fn nested_blocks_in_order() {
        let mut description = minimal();
        description.hibernation_configured = Some(true);
        description.enclave_enabled = Some(true);
        description.metadata_options = Some(MetadataOptions {
            http_endpoint: Some("enabled".into()),
            ..Default::default()
        });
        description.credit_specification = Some(CreditSpecification {
            cpu_credits: Some("standard".into()),
        });
        description.capacity_reservation = Some(crate::description::CapacityReservation {
            preference: Some("none".into()),
        });

        let rendered = emit_primary(&description);
        let positions: Vec<usize> = [
            "credit_specification {",
            "metadata_options {",
            "enclave_options {",
            "capacity_reservation_specification {",
            "hibernation = true",
            "root_block_device {",
        ]
        .iter()
        .map(|needle| rendered.find(needle).expect(needle))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{rendered}");
    }

    #[test]
    fn root_and_additional_volumes_are_not_duplicated() {
        let mut description = ResourceDescription::new("i-1", "ami-1", "m5.large");
        description.root_device_name = Some("/dev/sda1".into());
        description.block_devices = vec![
            BlockDeviceRef::new("/dev/sda1".into(), Some(Volume::new("vol-1".into()))),
            BlockDeviceRef::new("/dev/sdb".into(), Some(Volume::new("vol-2".into()))),
        ];

        let rendered = emit_primary(&description);
        assert_eq!(rendered.matches("root_block_device {").count(), 1);
        assert_eq!(rendered.matches("ebs_block_device {").count(), 1);
        assert_eq!(rendered.matches(r#"device_name           = "/dev/sdb""#).count(), 1);
        assert!(!rendered.contains(r#""/dev/sda1""#));
    }

    #[test]
    fn storage_order() {
        let mut description = minimal();
        description.block_devices = vec![
            BlockDeviceRef::ephemeral("/dev/sdc", "ephemeral0"),
            BlockDeviceRef::new("/dev/sdf".into(), Some(Volume::new("vol-f".into()))),
            BlockDeviceRef::new("/dev/xvda".into(), Some(Volume::new("vol-root".into()))),
            BlockDeviceRef::new("/dev/sdg".into(), Some(Volume::new("vol-g".into()))),
            BlockDeviceRef::ephemeral("/dev/sdd", "ephemeral1"),
        ];

        let rendered = emit_primary(&description);
        let positions: Vec<usize> = [
            "root_block_device {",
            r#""/dev/sdf""#,
            r#""/dev/sdg""#,
            r#""ephemeral0""#,
            r#""ephemeral1""#,
        ]
        .iter()
        .map(|needle| rendered.find(needle).expect(needle))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{rendered}");
    }

    #[test]
    fn missing_root_device_renders_no_root_block() {
        let mut description = minimal();
        description.root_device_name = Some("/dev/sda1".into());

        let rendered = emit_primary(&description);
        assert!(!rendered.contains("root_block_device"));
        assert!(rendered.contains("ebs_block_device {"));
    }

    fn with_user_data(text: &str) -> String {
        let mut description = minimal();
        description.user_data = Some(UserData::encode(text));
        emit_primary(&description)
    }

    #[test]
    fn short_user_data_is_decoded() {
        let script = format!("#!/bin/bash\n{}", "x".repeat(388));
        assert_eq!(script.chars().count(), 400);

        let rendered = with_user_data(&script);
        assert!(rendered.contains("user_data_base64 = \""));
        assert!(rendered.contains("  # Decoded user data:\n  # #!/bin/bash\n  # xxx"));
    }

    #[test]
    fn long_user_data_is_not_decoded() {
        let rendered = with_user_data(&"y".repeat(600));
        assert!(rendered.contains("user_data_base64 = \""));
        assert!(!rendered.contains("Decoded user data"));
    }

    #[test]
    fn undecodable_user_data_is_kept_encoded() {
        let mut description = minimal();
        description.user_data = Some(UserData::new("%%%not-base64%%%".into()));

        let rendered = emit_primary(&description);
        assert!(rendered.contains(r#"user_data_base64 = "%%%not-base64%%%""#));
        assert!(!rendered.contains("Decoded user data"));
    }

    #[test]
    fn tags_block() {
        let mut description = minimal();
        description.tags = Tags::from_iter([("Name", "web-1"), ("Env", "prod")]);

        let rendered = emit_primary(&description);
        assert!(rendered.starts_with(r#"resource "aws_instance" "web_1" {"#));
        assert!(rendered.contains("  tags = {\n    Env  = \"prod\"\n    Name = \"web-1\"\n  }"));
    }

    #[test]
    fn empty_name_tag_uses_instance_id() {
        let mut description = minimal();
        description.tags = Tags::from_iter([("Name", ""), ("Env", "prod")]);

        let rendered = emit_primary(&description);
        assert!(rendered.starts_with(r#"resource "aws_instance" "i_0abc" {"#));
        assert!(rendered.contains("    Name = \"\"\n"));
    }

    #[test]
    fn user_data_comments_stay_literal() {
        let rendered = with_user_data("echo \"${HOME}\"\n\ndone");
        assert!(rendered.contains("  # echo \"${HOME}\"\n  #\n  # done\n"));
        hcl_edit::parser::parse_body(&rendered).expect("rendered block parses");
    }
}
