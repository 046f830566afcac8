//! Overlay resolution and collection assembly on top of the raw queries.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};

use crate::error_handling::StoreError;
use crate::merger::MarcMerger;
use crate::models::{Record, RecordId};
use crate::storage::RecordCollection;

use super::SqliteDao;

impl SqliteDao {
    /// The first agency in priority order holding a record for the bibliographic id.
    async fn effective_id(
        &mut self,
        id: &RecordId,
        allow_deleted: bool,
    ) -> Result<Option<RecordId>, StoreError> {
        for agency in self.hints.agency_priority(id.agency_id) {
            let candidate = RecordId::new(id.bibliographic_record_id.clone(), agency);
            if self.exists(&candidate, allow_deleted).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Records from `start` down to its base record, following sibling relations.
    async fn overlay_chain(
        &mut self,
        start: RecordId,
        allow_deleted: bool,
    ) -> Result<Vec<Record>, StoreError> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = start;

        loop {
            if !visited.insert(current.clone()) {
                return Err(StoreError::Backend(format!(
                    "sibling relations of {current} form a cycle"
                )));
            }
            let record = self.fetch(&current).await?;
            let include_deleted = allow_deleted && record.deleted;
            chain.push(record);

            let mut siblings: Vec<RecordId> = self
                .outgoing(&current, Some(true))
                .await?
                .into_iter()
                .collect();
            if siblings.is_empty() {
                return Ok(chain);
            }
            siblings.sort();

            let mut next = None;
            for sibling in siblings {
                if self.exists(&sibling, include_deleted).await? {
                    next = Some(sibling);
                    break;
                }
            }
            current = next.ok_or_else(|| {
                StoreError::Backend(format!(
                    "record {} overlays a record that does not exist",
                    chain[chain.len() - 1].id
                ))
            })?;
        }
    }

    pub(super) async fn merged(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        allow_deleted: bool,
    ) -> Result<Record, StoreError> {
        let Some(start) = self.effective_id(id, allow_deleted).await? else {
            return Ok(Record::empty(id.clone()));
        };
        let chain = self.overlay_chain(start, allow_deleted).await?;

        // chain is local first, base last
        let Some((local, _)) = chain.split_first() else {
            return Ok(Record::empty(id.clone()));
        };
        let mut result = local.clone();
        if chain.len() == 1 {
            return Ok(result);
        }

        let base = &chain[chain.len() - 1];
        let mut merged = None;
        for layer in chain.iter().rev().filter(|r| r.has_content()) {
            let decoded = self.decode(layer)?;
            merged = Some(match merged {
                None => decoded,
                Some(common) => merger.merge(&common, &decoded),
            });
        }
        if let Some(merged) = merged {
            result.content = self.encode(&result.id, &merged)?;
        }

        result.mime_type = base.mime_type.clone();
        result.modified = chain.iter().map(|r| r.modified).max().unwrap_or(result.modified);
        result.enrichment_trail = chain
            .iter()
            .rev()
            .map(|r| r.id.agency_id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        debug!(
            "Merged {} through {} layers ({})",
            result.id,
            chain.len(),
            result.enrichment_trail
        );
        Ok(result)
    }

    /// The record and the closure of its parents.
    ///
    /// Parents in the authority agency are only followed when `include_authority`;
    /// all other parents are resolved under the requested agency, or under the
    /// agency the relation points at when the requester has no view of them.
    pub(super) async fn collection(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        expand: Option<bool>,
        include_authority: bool,
    ) -> Result<RecordCollection, StoreError> {
        let mut collection = RecordCollection::new();
        // (slot to resolve, agency the relation points at)
        let mut pending = VecDeque::from([(id.clone(), id.agency_id)]);

        while let Some((requested, stored_agency)) = pending.pop_front() {
            if collection.contains_key(&requested.bibliographic_record_id) {
                continue;
            }
            let mut next = requested;
            let mut record = self.merged(&next, merger, false).await?;
            if !record.has_content() && next.agency_id != stored_agency {
                next = RecordId::new(next.bibliographic_record_id, stored_agency);
                record = self.merged(&next, merger, false).await?;
            }
            if !record.has_content() {
                if next == *id {
                    // root missing: caller decides what an empty collection means
                    return Ok(RecordCollection::new());
                }
                warn!("Skipping parent {next} of {id}: no live content");
                continue;
            }
            if let Some(keep_authority_fields) = expand {
                self.expand(&mut record, keep_authority_fields).await?;
            }

            // enrichments carry no parent relations of their own; ask every overlay layer
            let mut parents = HashSet::new();
            for agency in self.hints.agency_priority(next.agency_id) {
                let layer = RecordId::new(next.bibliographic_record_id.clone(), agency);
                parents.extend(self.outgoing(&layer, Some(false)).await?);
            }
            let mut parents: Vec<RecordId> = parents.into_iter().collect();
            parents.sort();
            for parent in parents {
                if parent.agency_id == self.authority_agency {
                    if include_authority {
                        pending.push_back((parent.clone(), parent.agency_id));
                    }
                } else {
                    // prefer the requester's view; fall back to where the parent lives
                    let view = RecordId::new(parent.bibliographic_record_id, id.agency_id);
                    pending.push_back((view, parent.agency_id));
                }
            }
            collection.insert(next.bibliographic_record_id.clone(), record);
        }

        Ok(collection)
    }
}
