//! Commercial-partition AWS regions offered in connection forms.
//!
//! China (`cn-*`), GovCloud (`us-gov-*`) and sovereign (`eusc-*`) partitions
//! are left out.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: &'static str,
    pub description: &'static str,
}

impl Region {
    const fn new(id: &'static str, description: &'static str) -> Self {
        Self { id, description }
    }
}

static REGIONS: &[Region] = &[
    Region::new("us-east-1", "US East (N. Virginia)"),
    Region::new("us-east-2", "US East (Ohio)"),
    Region::new("us-west-1", "US West (N. California)"),
    Region::new("us-west-2", "US West (Oregon)"),
    Region::new("ca-central-1", "Canada (Central)"),
    Region::new("ca-west-1", "Canada West (Calgary)"),
    Region::new("mx-central-1", "Mexico (Central)"),
    Region::new("eu-west-1", "Europe (Ireland)"),
    Region::new("eu-west-2", "Europe (London)"),
    Region::new("eu-west-3", "Europe (Paris)"),
    Region::new("eu-central-1", "Europe (Frankfurt)"),
    Region::new("eu-central-2", "Europe (Zurich)"),
    Region::new("eu-north-1", "Europe (Stockholm)"),
    Region::new("eu-south-1", "Europe (Milan)"),
    Region::new("eu-south-2", "Europe (Spain)"),
    Region::new("ap-east-1", "Asia Pacific (Hong Kong)"),
    Region::new("ap-east-2", "Asia Pacific (Taipei)"),
    Region::new("ap-northeast-1", "Asia Pacific (Tokyo)"),
    Region::new("ap-northeast-2", "Asia Pacific (Seoul)"),
    Region::new("ap-northeast-3", "Asia Pacific (Osaka)"),
    Region::new("ap-south-1", "Asia Pacific (Mumbai)"),
    Region::new("ap-south-2", "Asia Pacific (Hyderabad)"),
    Region::new("ap-southeast-1", "Asia Pacific (Singapore)"),
    Region::new("ap-southeast-2", "Asia Pacific (Sydney)"),
    Region::new("ap-southeast-3", "Asia Pacific (Jakarta)"),
    Region::new("ap-southeast-4", "Asia Pacific (Melbourne)"),
    Region::new("ap-southeast-5", "Asia Pacific (Malaysia)"),
    Region::new("ap-southeast-6", "Asia Pacific (New Zealand)"),
    Region::new("ap-southeast-7", "Asia Pacific (Thailand)"),
    Region::new("sa-east-1", "South America (São Paulo)"),
    Region::new("me-south-1", "Middle East (Bahrain)"),
    Region::new("me-central-1", "Middle East (UAE)"),
    Region::new("af-south-1", "Africa (Cape Town)"),
    Region::new("il-central-1", "Israel (Tel Aviv)"),
];

/// All known regions, grouped by geography.
pub fn regions() -> &'static [Region] {
    REGIONS
}

pub fn is_known_region(id: &str) -> bool {
    REGIONS.iter().any(|r| r.id == id)
}
