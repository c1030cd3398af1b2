//! assemble the full configuration document
use crate::description::ResourceDescription;
use crate::{instance, satellites};
use chrono::{DateTime, SecondsFormat, Utc};

const RECOMMENDATIONS: &str = "\
# Recommendations:
# 1. Consider parameterizing values like AMI ID, instance type, etc. using variables
# 2. Use data sources to look up existing resources (VPCs, subnets, security groups)
# 3. Review all settings and adjust for your specific requirements
# 4. Test this configuration in a non-production environment first
# 5. Consider using remote state and proper state management
#
# Example variables you might want to create:
# - var.instance_type
# - var.ami_id
# - var.key_name
# - var.subnet_id
# - var.security_group_ids";

/// Generates documents; the only inputs besides the description are the timestamp and the region for the header
#[derive(Debug, Clone, derive_new::new)]
pub struct Generator {
    generated_at: DateTime<Utc>,
    region: Option<String>,
}

impl Generator {
    /// Generator stamped with the current time
    pub fn now(region: Option<String>) -> Self {
        Self::new(Utc::now(), region)
    }

    /// Render the complete document
    ///
    /// Sections in order, separated by exactly one blank line: header, instance, standalone volumes (none at the
    /// moment; all volumes are inline in the instance), elastic ips, secondary interfaces, recommendations.
    /// The document ends with a single newline.
    pub fn generate(&self, description: &ResourceDescription) -> String {
        tracing::info!(instance_id = %description.instance_id, "generating terraform configuration");

        let mut sections = vec![self.header(description), instance::emit_primary(description)];
        sections.extend(standalone_volumes(description));
        sections.extend(satellites::emit_floating_addresses(description));
        sections.extend(satellites::emit_network_interfaces(description));
        sections.push(RECOMMENDATIONS.to_string());

        let mut document = sections.join("\n\n");
        document.push('\n');
        document
    }

    fn header(&self, description: &ResourceDescription) -> String {
        let mut lines = vec![
            "# Terraform configuration generated from EC2 instance".to_string(),
            format!(
                "# Generated: {}",
                self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            format!("# Source Instance: {}", description.instance_id),
            format!("# Instance Name: {}", description.label()),
        ];
        if let Some(region) = &self.region {
            lines.push(format!("# Region: {region}"));
        }
        lines.extend(
            [
                "#",
                "# NOTE: This is a generated configuration. Review and customize as needed.",
                "# Some values may need to be parameterized or adjusted for your use case.",
            ]
            .map(String::from),
        );

        lines.join("\n")
    }
}

/// Volumes managed outside the instance resource
///
/// Every volume of a description is attached at launch and rendered inline, so this is empty. It keeps its slot
/// in the section order for `aws_ebs_volume` / `aws_volume_attachment` resources.
fn standalone_volumes(_description: &ResourceDescription) -> Vec<String> {
    vec![]
}
