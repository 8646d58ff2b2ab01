//! In-memory repositories.
//!
//! Intended for tests and development. Each store guards its rows with a
//! `RwLock`, which gives the atomic single-row write the contracts assume.
//! Guards are never held across an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pipecrm_activity::{ActivityRecord, ActivityStore};
use pipecrm_auth::{CredentialPatch, CredentialStore, UserRecord};
use pipecrm_core::{DealId, LeadId, StoreError, UserId};
use pipecrm_deals::{Deal, DealPatch, DealStore};
use pipecrm_leads::{Lead, LeadPatch, LeadQuery, LeadStore};

/// User accounts keyed by unique email.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().unwrap().get(email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, email: &str, patch: CredentialPatch) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(email).ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            user.name = Some(name);
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut leads: Vec<Lead>) -> Vec<Lead> {
        leads.sort_by(|a, b| b.created.cmp(&a.created));
        leads
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert(&self, lead: Lead) -> Result<Lead, StoreError> {
        self.leads.write().unwrap().push(lead.clone());
        Ok(lead)
    }

    async fn insert_many(&self, leads: Vec<Lead>) -> Result<usize, StoreError> {
        let count = leads.len();
        self.leads.write().unwrap().extend(leads);
        Ok(count)
    }

    async fn list(&self, owner_email: &str, query: &LeadQuery) -> Result<Vec<Lead>, StoreError> {
        let leads: Vec<Lead> = self
            .leads
            .read()
            .unwrap()
            .iter()
            .filter(|l| l.owner_email == owner_email && query.matches(l))
            .cloned()
            .collect();
        Ok(query.page.slice(Self::sorted_desc(leads)))
    }

    async fn list_all(&self, owner_email: &str) -> Result<Vec<Lead>, StoreError> {
        let leads: Vec<Lead> = self
            .leads
            .read()
            .unwrap()
            .iter()
            .filter(|l| l.owner_email == owner_email)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(leads))
    }

    async fn update(
        &self,
        id: LeadId,
        owner_email: &str,
        patch: &LeadPatch,
    ) -> Result<Lead, StoreError> {
        let mut leads = self.leads.write().unwrap();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id && l.owner_email == owner_email)
            .ok_or(StoreError::NotFound)?;
        lead.apply(patch);
        Ok(lead.clone())
    }

    async fn count_all(&self) -> Result<usize, StoreError> {
        Ok(self.leads.read().unwrap().len())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDealStore {
    deals: RwLock<Vec<Deal>>,
}

impl InMemoryDealStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut deals: Vec<Deal>) -> Vec<Deal> {
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }
}

#[async_trait]
impl DealStore for InMemoryDealStore {
    async fn insert(&self, deal: Deal) -> Result<Deal, StoreError> {
        self.deals.write().unwrap().push(deal.clone());
        Ok(deal)
    }

    async fn get(&self, id: DealId, owner: UserId) -> Result<Option<Deal>, StoreError> {
        Ok(self
            .deals
            .read()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.owner_id == owner)
            .cloned())
    }

    async fn list(&self, owner: UserId) -> Result<Vec<Deal>, StoreError> {
        let deals: Vec<Deal> = self
            .deals
            .read()
            .unwrap()
            .iter()
            .filter(|d| d.owner_id == owner)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(deals))
    }

    async fn list_all(&self) -> Result<Vec<Deal>, StoreError> {
        Ok(Self::sorted_desc(self.deals.read().unwrap().clone()))
    }

    async fn update(
        &self,
        id: DealId,
        owner: UserId,
        patch: &DealPatch,
    ) -> Result<Deal, StoreError> {
        let mut deals = self.deals.write().unwrap();
        let deal = deals
            .iter_mut()
            .find(|d| d.id == id && d.owner_id == owner)
            .ok_or(StoreError::NotFound)?;
        deal.apply(patch);
        Ok(deal.clone())
    }

    async fn delete(&self, id: DealId, owner: UserId) -> Result<(), StoreError> {
        let mut deals = self.deals.write().unwrap();
        let before = deals.len();
        deals.retain(|d| !(d.id == id && d.owner_id == owner));
        if deals.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Append-only activity log.
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    records: RwLock<Vec<ActivityRecord>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn append(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.records.write().unwrap().push(record);
        Ok(())
    }

    async fn recent(
        &self,
        user_email: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut records: Vec<ActivityRecord> = self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.user_email == user_email)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}
