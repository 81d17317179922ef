//! Hierarchical Azure resource identifiers
//!
//! `/subscriptions/{id}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`

use std::fmt;

use crate::error::{AzResolveError, Result};

const SUBSCRIPTIONS_SEGMENT: usize = 0;
const SUBSCRIPTION_ID_SEGMENT: usize = 1;
const RESOURCE_GROUPS_SEGMENT: usize = 2;
const RESOURCE_GROUP_SEGMENT: usize = 3;
const MIN_SEGMENTS: usize = RESOURCE_GROUP_SEGMENT + 1;

/// A parsed resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    raw: String,
    segments: Vec<String>,
}

impl ResourceId {
    /// Parse `id`, requiring at least the subscription and resource group
    /// segments. Empty segments (leading, trailing or doubled slashes) are
    /// ignored.
    pub fn parse(id: &str) -> Result<Self> {
        let segments: Vec<String> = id
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.len() < MIN_SEGMENTS {
            return Err(AzResolveError::malformed_identifier(id));
        }

        let keyword_matches = |index: usize, keyword: &str| {
            segments
                .get(index)
                .is_some_and(|segment| segment.eq_ignore_ascii_case(keyword))
        };

        if !keyword_matches(SUBSCRIPTIONS_SEGMENT, "subscriptions")
            || !keyword_matches(RESOURCE_GROUPS_SEGMENT, "resourceGroups")
        {
            return Err(AzResolveError::malformed_identifier(id));
        }

        Ok(Self {
            raw: id.to_string(),
            segments,
        })
    }

    pub fn subscription_id(&self) -> &str {
        self.segment(SUBSCRIPTION_ID_SEGMENT)
    }

    pub fn resource_group(&self) -> &str {
        self.segment(RESOURCE_GROUP_SEGMENT)
    }

    /// Last path segment: the resource name, or the resource group name for
    /// a bare resource group identifier
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    fn segment(&self, index: usize) -> &str {
        self.segments
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Extract the resource group from a resource identifier
pub fn resource_group_from_id(id: &str) -> Result<String> {
    ResourceId::parse(id).map(|parsed| parsed.resource_group().to_string())
}
