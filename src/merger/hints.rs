//! Overlay relation policy.

use std::collections::HashSet;

use crate::config::Config;

/// Decides whether an agency's records overlay common content, and where to
/// look for that content.
pub trait RelationHints: Send + Sync {
    /// Whether records of `agency_id` are enrichments of a common record.
    fn uses_common_agency(&self, agency_id: i32) -> bool;

    /// Agencies to try, in order, when resolving a bibliographic id for
    /// `agency_id`. Always starts with `agency_id` itself.
    fn agency_priority(&self, agency_id: i32) -> Vec<i32>;
}

/// Relation hints from a fixed agency configuration.
#[derive(Debug, Clone)]
pub struct StaticRelationHints {
    common_agencies: Vec<i32>,
    stand_alone_agencies: HashSet<i32>,
}

impl StaticRelationHints {
    pub fn new(common_agencies: Vec<i32>, stand_alone_agencies: impl IntoIterator<Item = i32>) -> Self {
        StaticRelationHints {
            common_agencies,
            stand_alone_agencies: stand_alone_agencies.into_iter().collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.common_agencies.clone(),
            config.stand_alone_agencies.iter().copied(),
        )
    }
}

impl RelationHints for StaticRelationHints {
    fn uses_common_agency(&self, agency_id: i32) -> bool {
        !self.common_agencies.contains(&agency_id) && !self.stand_alone_agencies.contains(&agency_id)
    }

    fn agency_priority(&self, agency_id: i32) -> Vec<i32> {
        let mut priority = vec![agency_id];
        if self.uses_common_agency(agency_id) {
            priority.extend(self.common_agencies.iter().copied());
        }
        priority
    }
}
