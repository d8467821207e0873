//! Ordered collection of service records and the operations the dashboard
//! performs on it. The clock is passed in so callers and tests control it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Service, ServiceDraft};
use crate::shared::{DomainError, DomainResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceInventory {
    services: Vec<Service>,
}

impl ServiceInventory {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Append a new record built from `draft`.
    pub fn add(&mut self, draft: ServiceDraft, now: DateTime<Utc>) -> DomainResult<&Service> {
        draft.validate()?;
        self.services.push(Service::from_draft(draft, now));
        Ok(&self.services[self.services.len() - 1])
    }

    /// Replace the record with the same id, keeping its position.
    pub fn edit(&mut self, updated: Service) -> DomainResult<()> {
        updated.draft().validate()?;
        let slot = self.find_mut(&updated.id)?;
        *slot = updated;
        Ok(())
    }

    /// Flip the active flag of one record and restamp its check time.
    pub fn toggle_check(&mut self, id: &str, now: DateTime<Utc>) -> DomainResult<&Service> {
        let service = self.find_mut(id)?;
        service.is_active = !service.is_active;
        service.last_check = now;
        Ok(service)
    }

    /// Restamp every record without touching any active flag.
    pub fn check_all(&mut self, now: DateTime<Utc>) {
        for service in &mut self.services {
            service.last_check = now;
        }
    }

    pub fn total_monthly_cost(&self) -> f64 {
        self.services.iter().map(|s| s.monthly_cost).sum()
    }

    pub fn active_count(&self) -> usize {
        self.services.iter().filter(|s| s.is_active).count()
    }

    fn find_mut(&mut self, id: &str) -> DomainResult<&mut Service> {
        self.services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "Service",
                field: "id",
                value: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::inventory::sample_services;

    fn inventory_at(now: DateTime<Utc>) -> ServiceInventory {
        ServiceInventory::new(sample_services(now))
    }

    #[test]
    fn toggle_check_flips_flag_and_restamps() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);
        let mut inv = inventory_at(t0);

        let service = inv.toggle_check("1", t1).unwrap();
        assert!(!service.is_active);
        assert_eq!(service.last_check, t1);

        // The other record is untouched
        let other = inv.get("2").unwrap();
        assert!(other.is_active);
        assert_eq!(other.last_check, t0);

        let t2 = t1 + Duration::minutes(1);
        assert!(inv.toggle_check("1", t2).unwrap().is_active);
    }

    #[test]
    fn check_all_restamps_without_touching_flags() {
        let t0 = Utc::now();
        let mut inv = inventory_at(t0);
        inv.toggle_check("2", t0).unwrap();

        let t1 = t0 + Duration::hours(1);
        inv.check_all(t1);

        assert!(inv.services().iter().all(|s| s.last_check == t1));
        assert!(inv.get("1").unwrap().is_active);
        assert!(!inv.get("2").unwrap().is_active);
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let mut inv = inventory_at(Utc::now());
        let err = inv.toggle_check("missing", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn add_appends_active_record() {
        let now = Utc::now();
        let mut inv = inventory_at(now);
        let draft = ServiceDraft {
            name: "Cache".into(),
            monthly_cost: 5.0,
            ..Default::default()
        };
        let id = inv.add(draft, now).unwrap().id.clone();

        assert_eq!(inv.len(), 3);
        assert_eq!(inv.services()[2].id, id);
        assert!(inv.get(&id).unwrap().is_active);
        assert_ne!(id, "1");
    }

    #[test]
    fn add_rejects_invalid_draft() {
        let mut inv = ServiceInventory::default();
        let draft = ServiceDraft {
            name: "Bad".into(),
            monthly_cost: -3.0,
            ..Default::default()
        };
        assert!(inv.add(draft, Utc::now()).is_err());
        assert!(inv.is_empty());
    }

    #[test]
    fn edit_replaces_in_place() {
        let now = Utc::now();
        let mut inv = inventory_at(now);
        let mut updated = inv.get("1").unwrap().clone();
        updated.name = "Public API".into();
        updated.monthly_cost = 120.0;

        inv.edit(updated.clone()).unwrap();
        assert_eq!(inv.services()[0], updated);
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let mut inv = inventory_at(Utc::now());
        let mut ghost = inv.get("1").unwrap().clone();
        ghost.id = "nope".into();
        assert!(matches!(inv.edit(ghost), Err(DomainError::NotFound { .. })));
    }

    #[test]
    fn aggregates() {
        let inv = inventory_at(Utc::now());
        assert!((inv.total_monthly_cost() - 299.98).abs() < 1e-9);
        assert_eq!(inv.active_count(), 2);
    }

    #[test]
    fn serializes_as_plain_array() {
        let inv = inventory_at(Utc::now());
        let value = serde_json::to_value(&inv).unwrap();
        assert!(value.is_array());
        let back: ServiceInventory = serde_json::from_value(value).unwrap();
        assert_eq!(back, inv);
    }
}
