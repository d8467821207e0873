//! Service record domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, DomainResult};

/// Cloud provider labels offered by the service form. The field itself stays
/// free text, so records may carry values outside this list.
pub const CLOUD_PROVIDERS: &[&str] = &[
    "AWS",
    "Google Cloud",
    "Azure",
    "DigitalOcean",
    "Heroku",
    "UpCloud",
    "Netuy.net",
    "Other",
];

pub const DEFAULT_CLOUD_PROVIDER: &str = "AWS";

/// A user-entered description of a monitored infrastructure endpoint.
///
/// Serialized in camelCase to stay compatible with dashboards that already
/// hold a `services` entry in their local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub project_name: String,
    pub url: String,
    pub ip: String,
    pub description: String,
    pub cloud_provider: String,
    /// Monthly cost, never negative
    pub monthly_cost: f64,
    /// Team responsible for the service
    pub supported_by: String,
    pub last_check: DateTime<Utc>,
    pub is_active: bool,
}

impl Service {
    /// Create a fresh record from a validated draft: new id, stamped now, active.
    pub fn from_draft(draft: ServiceDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            project_name: draft.project_name,
            url: draft.url,
            ip: draft.ip,
            description: draft.description,
            cloud_provider: draft.cloud_provider,
            monthly_cost: draft.monthly_cost,
            supported_by: draft.supported_by,
            last_check: now,
            is_active: true,
        }
    }

    /// Overwrite the editable fields, keeping id, check time and status.
    pub fn apply_draft(&mut self, draft: ServiceDraft) {
        self.name = draft.name;
        self.project_name = draft.project_name;
        self.url = draft.url;
        self.ip = draft.ip;
        self.description = draft.description;
        self.cloud_provider = draft.cloud_provider;
        self.monthly_cost = draft.monthly_cost;
        self.supported_by = draft.supported_by;
    }

    /// The editable part of this record.
    pub fn draft(&self) -> ServiceDraft {
        ServiceDraft {
            name: self.name.clone(),
            project_name: self.project_name.clone(),
            url: self.url.clone(),
            ip: self.ip.clone(),
            description: self.description.clone(),
            cloud_provider: self.cloud_provider.clone(),
            monthly_cost: self.monthly_cost,
            supported_by: self.supported_by.clone(),
        }
    }
}

/// Form payload: every [`Service`] field except `id`, `last_check` and `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    pub name: String,
    pub project_name: String,
    pub url: String,
    pub ip: String,
    pub description: String,
    pub cloud_provider: String,
    pub monthly_cost: f64,
    pub supported_by: String,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_name: String::new(),
            url: String::new(),
            ip: String::new(),
            description: String::new(),
            cloud_provider: DEFAULT_CLOUD_PROVIDER.to_string(),
            monthly_cost: 0.0,
            supported_by: String::new(),
        }
    }
}

impl ServiceDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Service name is required".into()));
        }
        if !self.monthly_cost.is_finite() || self.monthly_cost < 0.0 {
            return Err(DomainError::Validation(
                "Monthly cost must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

/// The two entries shown on a dashboard that has never stored anything.
pub fn sample_services(now: DateTime<Utc>) -> Vec<Service> {
    vec![
        Service {
            id: "1".to_string(),
            name: "Main API Server".to_string(),
            project_name: "E-commerce Platform".to_string(),
            url: "https://api.example.com".to_string(),
            ip: "10.0.0.1".to_string(),
            description: "Primary API server handling all e-commerce transactions".to_string(),
            cloud_provider: "UpCloud".to_string(),
            monthly_cost: 99.99,
            supported_by: "DevOps Team".to_string(),
            last_check: now,
            is_active: true,
        },
        Service {
            id: "2".to_string(),
            name: "Database Cluster".to_string(),
            project_name: "E-commerce Platform".to_string(),
            url: "https://db.example.com".to_string(),
            ip: "10.0.0.2".to_string(),
            description: "PostgreSQL database cluster for e-commerce data".to_string(),
            cloud_provider: "Netuy.net".to_string(),
            monthly_cost: 199.99,
            supported_by: "Database Team".to_string(),
            last_check: now,
            is_active: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_validation() {
        let mut draft = ServiceDraft {
            name: "Edge proxy".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.monthly_cost = -1.0;
        assert!(draft.validate().is_err());

        draft.monthly_cost = f64::NAN;
        assert!(draft.validate().is_err());

        draft.monthly_cost = 10.0;
        draft.name = "   ".into();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn serializes_in_camel_case() {
        let now = Utc::now();
        let value = serde_json::to_value(&sample_services(now)[0]).unwrap();
        assert_eq!(value["projectName"], "E-commerce Platform");
        assert_eq!(value["monthlyCost"], 99.99);
        assert_eq!(value["isActive"], true);
        assert!(value.get("lastCheck").is_some());
    }

    #[test]
    fn from_draft_stamps_and_activates() {
        let now = Utc::now();
        let draft = ServiceDraft {
            name: "Queue".into(),
            monthly_cost: 12.5,
            ..Default::default()
        };
        let service = Service::from_draft(draft.clone(), now);

        assert!(service.is_active);
        assert_eq!(service.last_check, now);
        assert_eq!(service.cloud_provider, DEFAULT_CLOUD_PROVIDER);
        assert_eq!(service.draft(), draft);

        let mut edited = service.clone();
        edited.apply_draft(ServiceDraft {
            name: "Queue v2".into(),
            ..draft
        });
        assert_eq!(edited.id, service.id);
        assert_eq!(edited.name, "Queue v2");
        assert_eq!(edited.last_check, now);
        assert!(uuid::Uuid::parse_str(&service.id).is_ok());
    }
}
