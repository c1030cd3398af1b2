//! raw description export
use crate::description::ResourceDescription;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Metadata<'a> {
    pub export_date: DateTime<Utc>,
    pub instance_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
}

/// The description as it was handed to the generator, plus where and when it came from
#[derive(Debug, Serialize)]
pub struct RawExport<'a> {
    pub metadata: Metadata<'a>,
    pub instance: &'a ResourceDescription,
}

impl<'a> RawExport<'a> {
    pub fn new(
        description: &'a ResourceDescription,
        region: Option<&'a str>,
        export_date: DateTime<Utc>,
    ) -> Self {
        Self {
            metadata: Metadata {
                export_date,
                instance_id: &description.instance_id,
                region,
            },
            instance: description,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
