//! Overlay merge engines and their pools.
//!
//! This module provides:
//! - `MarcMerger`, a stateful merge engine (one caller at a time)
//! - `MergerPool`/`MergerLease`, bounded pools with scoped checkout
//! - `MergerPools`, the two process-lifetime pools keyed by `MergerFlavor`
//! - `RelationHints`, the policy deciding which agencies overlay common content

mod hints;
mod pool;

use std::collections::HashSet;

use strum_macros::Display;

use crate::marc::{Field, MarcRecord};

pub use hints::{RelationHints, StaticRelationHints};
pub use pool::{MergerLease, MergerPool, MergerPools};

/// Which overlay rule set a merger applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MergerFlavor {
    /// Local agencies overlaying common content.
    Default,
    /// A parent agency overlaying on behalf of its member agencies; only the
    /// record identity is protected.
    ParentAgency,
}

impl MergerFlavor {
    pub fn from_parent_overlay(use_parent_overlay: bool) -> Self {
        if use_parent_overlay {
            MergerFlavor::ParentAgency
        } else {
            MergerFlavor::Default
        }
    }

    pub fn rules(&self) -> FieldRules {
        match self {
            MergerFlavor::Default => {
                FieldRules::immutable(&["001", "004", "005", "008", "009", "245"])
            }
            MergerFlavor::ParentAgency => FieldRules::immutable(&["001"]),
        }
    }
}

/// Per-tag overlay rules.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    immutable: HashSet<String>,
}

impl FieldRules {
    pub fn immutable(tags: &[&str]) -> Self {
        FieldRules {
            immutable: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Immutable tags keep the common record's fields even when the local
    /// record supplies the same tag.
    pub fn is_immutable(&self, tag: &str) -> bool {
        self.immutable.contains(tag)
    }
}

/// A reusable overlay merge engine.
///
/// Merging borrows the engine mutably: it keeps scratch tag sets between
/// calls, so one instance must never serve two callers at once. Pools hand
/// out exclusive leases.
#[derive(Debug)]
pub struct MarcMerger {
    instance_id: usize,
    flavor: MergerFlavor,
    rules: FieldRules,
    common_tags: HashSet<String>,
    local_tags: HashSet<String>,
    merges: u64,
}

impl MarcMerger {
    pub fn new(instance_id: usize, flavor: MergerFlavor) -> Self {
        MarcMerger {
            instance_id,
            flavor,
            rules: flavor.rules(),
            common_tags: HashSet::new(),
            local_tags: HashSet::new(),
            merges: 0,
        }
    }

    pub fn instance_id(&self) -> usize {
        self.instance_id
    }

    pub fn flavor(&self) -> MergerFlavor {
        self.flavor
    }

    /// Number of merges this instance has performed.
    pub fn merges(&self) -> u64 {
        self.merges
    }

    /// Overlays `local` onto `common`.
    ///
    /// Every common field whose tag the local record also carries is replaced
    /// by the local fields of that tag, except for immutable tags, where the
    /// common fields win. Immutable local fields are only taken when the
    /// common record lacks the tag. The result keeps the common leader and is
    /// ordered by tag; fields sharing a tag keep their relative order.
    pub fn merge(&mut self, common: &MarcRecord, local: &MarcRecord) -> MarcRecord {
        self.common_tags.clear();
        self.local_tags.clear();
        self.common_tags
            .extend(common.fields.iter().map(|f| f.tag().to_string()));
        self.local_tags
            .extend(local.fields.iter().map(|f| f.tag().to_string()));

        let mut fields: Vec<Field> = common
            .fields
            .iter()
            .filter(|f| self.rules.is_immutable(f.tag()) || !self.local_tags.contains(f.tag()))
            .cloned()
            .collect();

        fields.extend(
            local
                .fields
                .iter()
                .filter(|f| {
                    !(self.rules.is_immutable(f.tag()) && self.common_tags.contains(f.tag()))
                })
                .cloned(),
        );
        fields.sort_by(|a, b| a.tag().cmp(b.tag()));

        self.merges += 1;
        MarcRecord {
            leader: common.leader.clone(),
            fields,
        }
    }
}
