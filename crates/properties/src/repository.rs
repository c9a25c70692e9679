//! In-memory property repository.
//!
//! A single `RwLock` guards the table: listings and lookups share the read
//! guard, while id generation, append, in-place update and removal each run
//! under one write guard. Updates resolve existence and ownership before the
//! patch is parsed, so nothing is written unless every check passes.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use rentaldesk_auth::{authorize, IdentityClaim, Operation};
use rentaldesk_core::{id::sequence_number, DomainError, DomainResult, PropertyId};

use crate::{ListQuery, NewProperty, Page, PageRequest, PropertyPatch, PropertyRecord};

#[derive(Debug, Default)]
struct PropertyTable {
    /// Insertion order is the default listing order.
    records: Vec<PropertyRecord>,
    last_id: u64,
}

impl PropertyTable {
    fn position(&self, id: &PropertyId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}

#[derive(Debug, Default)]
pub struct PropertyRepository {
    inner: RwLock<PropertyTable>,
}

impl PropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built record (demo seed). A record with the same id is
    /// replaced in place.
    pub fn seed(&self, record: PropertyRecord) {
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(n) = sequence_number(record.id.as_str()) {
            table.last_id = table.last_id.max(n);
        }
        match table.position(&record.id) {
            Some(idx) => table.records[idx] = record,
            None => table.records.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filtered, paginated view over a consistent snapshot.
    pub fn list(&self, query: &ListQuery, paging: PageRequest) -> Page<PropertyRecord> {
        let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        query.apply(&table.records, paging)
    }

    pub fn get(&self, id: &PropertyId) -> DomainResult<PropertyRecord> {
        let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        table
            .position(id)
            .map(|idx| table.records[idx].clone())
            .ok_or(DomainError::NotFound)
    }

    pub fn create(&self, claim: Option<&IdentityClaim>, new: NewProperty) -> DomainResult<PropertyRecord> {
        self.create_at(claim, new, Utc::now())
    }

    pub fn create_at(
        &self,
        claim: Option<&IdentityClaim>,
        new: NewProperty,
        now: DateTime<Utc>,
    ) -> DomainResult<PropertyRecord> {
        let claim = claim.ok_or(DomainError::Unauthorized)?;

        let record = {
            let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            table.last_id += 1;
            let record = new.into_record(PropertyId::from_sequence(table.last_id), claim.subject_id.clone(), now);
            table.records.push(record.clone());
            record
        };

        tracing::info!(property_id = %record.id, owner_id = %record.owner_id, "property created");
        Ok(record)
    }

    pub fn update(
        &self,
        claim: Option<&IdentityClaim>,
        id: &PropertyId,
        fields: &Map<String, Value>,
    ) -> DomainResult<PropertyRecord> {
        self.update_at(claim, id, fields, Utc::now())
    }

    pub fn update_at(
        &self,
        claim: Option<&IdentityClaim>,
        id: &PropertyId,
        fields: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> DomainResult<PropertyRecord> {
        self.update_with(claim, id, now, || PropertyPatch::from_json(fields))
    }

    /// Apply the patch produced by `build_patch` if the caller owns the
    /// listing (or is an admin).
    ///
    /// Failures surface in order: missing claim, unknown id, ownership, then
    /// whatever `build_patch` rejects. `build_patch` runs under the write
    /// guard, only once the first three checks pass. `updated_at` is refreshed
    /// even when the patch is empty.
    pub fn update_with<E>(
        &self,
        claim: Option<&IdentityClaim>,
        id: &PropertyId,
        now: DateTime<Utc>,
        build_patch: impl FnOnce() -> Result<PropertyPatch, E>,
    ) -> Result<PropertyRecord, E>
    where
        E: From<DomainError>,
    {
        let claim = claim.ok_or(DomainError::Unauthorized)?;

        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let idx = table.position(id).ok_or(DomainError::NotFound)?;
        let record = &mut table.records[idx];

        let decision = authorize(Some(claim), &record.owner_id, Operation::Update);
        if !decision.is_allowed() {
            tracing::warn!(property_id = %id, subject_id = %claim.subject_id, "update denied");
            return Err(DomainError::forbidden("only the owner or an admin may edit this property").into());
        }

        let patch = build_patch()?;
        record.apply(patch, now);
        tracing::info!(property_id = %id, subject_id = %claim.subject_id, ?decision, "property updated");
        Ok(record.clone())
    }

    /// Permanently remove the listing. Returns the removed record.
    pub fn delete(&self, claim: Option<&IdentityClaim>, id: &PropertyId) -> DomainResult<PropertyRecord> {
        let claim = claim.ok_or(DomainError::Unauthorized)?;

        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let idx = table.position(id).ok_or(DomainError::NotFound)?;

        let decision = authorize(Some(claim), &table.records[idx].owner_id, Operation::Delete);
        if !decision.is_allowed() {
            tracing::warn!(property_id = %id, subject_id = %claim.subject_id, "delete denied");
            return Err(DomainError::forbidden("only the owner or an admin may delete this property"));
        }

        let removed = table.records.remove(idx);
        tracing::info!(property_id = %id, subject_id = %claim.subject_id, ?decision, "property deleted");
        Ok(removed)
    }
}
