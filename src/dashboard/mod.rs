//! Dashboard client state
//!
//! Mirrors what the browser dashboard keeps in local storage: the session,
//! the service inventory and the theme preference. Every change is written
//! to the [`KeyValueStorage`] immediately, under the same keys the browser
//! uses, so state survives restarts.

pub mod client;
pub mod error;
pub mod session;
pub mod theme;
pub mod time_ago;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::inventory::sample_services;
use crate::domain::{Service, ServiceDraft, ServiceInventory, UserRole};
use crate::infrastructure::storage::KeyValueStorage;

pub use client::{AuthApi, HttpAuthClient, DEFAULT_SERVER_URL};
pub use error::{DashboardError, DashboardResult};
pub use session::Session;
pub use theme::{Theme, ThemePreference};
pub use time_ago::time_ago;

pub const KEY_SERVICES: &str = "services";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_TOKEN: &str = "token";
pub const KEY_USER_ROLE: &str = "userRole";

pub struct Dashboard<S: KeyValueStorage, A: AuthApi> {
    store: S,
    api: A,
    session: Option<Session>,
    inventory: ServiceInventory,
    theme: Theme,
}

impl<S: KeyValueStorage, A: AuthApi> Dashboard<S, A> {
    /// Restore state from `store`. An empty store gets the two sample
    /// services, which are written back straight away.
    pub fn load(store: S, api: A, os_dark: bool, now: DateTime<Utc>) -> DashboardResult<Self> {
        let session = Session::restore(store.get(KEY_TOKEN)?, store.get(KEY_USER_ROLE)?);

        let inventory = match store.get(KEY_SERVICES)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                DashboardError::CorruptEntry {
                    key: KEY_SERVICES,
                    source,
                }
            })?,
            None => {
                let inventory = ServiceInventory::new(sample_services(now));
                store.set(KEY_SERVICES, encode_inventory(&inventory)?)?;
                inventory
            }
        };

        let preference = match store.get(KEY_DARK_MODE)? {
            Some(raw) => ThemePreference(Some(serde_json::from_str(&raw).map_err(|source| {
                DashboardError::CorruptEntry {
                    key: KEY_DARK_MODE,
                    source,
                }
            })?)),
            None => ThemePreference(None),
        };

        debug!(
            logged_in = session.is_some(),
            services = inventory.len(),
            "Dashboard state restored"
        );

        Ok(Self {
            store,
            api,
            session,
            inventory,
            theme: Theme::new(preference, os_dark),
        })
    }

    // ── Session ─────────────────────────────────────────────────

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_admin)
    }

    pub fn require_session(&self) -> DashboardResult<&Session> {
        self.session.as_ref().ok_or(DashboardError::NotLoggedIn)
    }

    fn require_admin(&self) -> DashboardResult<&Session> {
        let session = self.require_session()?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(DashboardError::AdminRequired)
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> DashboardResult<&Session> {
        let session = self.api.login(username, password).await?;
        self.store.set(KEY_TOKEN, session.token.clone())?;
        self.store.set(KEY_USER_ROLE, session.role.to_string())?;
        info!(username, role = %session.role, "Logged in");
        let session = self.session.insert(session);
        Ok(&*session)
    }

    /// Forget the token and role. Services and theme stay.
    pub fn logout(&mut self) -> DashboardResult<()> {
        self.store.remove(KEY_TOKEN)?;
        self.store.remove(KEY_USER_ROLE)?;
        self.session = None;
        Ok(())
    }

    /// Create a user on the server with the stored admin token.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> DashboardResult<String> {
        let session = self.require_admin()?;
        self.api
            .create_user(&session.token, username, password, role)
            .await
    }

    // ── Inventory ───────────────────────────────────────────────

    pub fn services(&self) -> &[Service] {
        self.inventory.services()
    }

    pub fn inventory(&self) -> &ServiceInventory {
        &self.inventory
    }

    pub fn add_service(&mut self, draft: ServiceDraft, now: DateTime<Utc>) -> DashboardResult<Service> {
        self.require_admin()?;
        let mut next = self.inventory.clone();
        let service = next.add(draft, now)?.clone();
        self.commit_services(next)?;
        Ok(service)
    }

    pub fn edit_service(&mut self, service: Service) -> DashboardResult<()> {
        self.require_admin()?;
        let mut next = self.inventory.clone();
        next.edit(service)?;
        self.commit_services(next)
    }

    /// Manual "Check Now": flips the active flag and restamps the record.
    pub fn check_service(&mut self, id: &str, now: DateTime<Utc>) -> DashboardResult<Service> {
        self.require_admin()?;
        let mut next = self.inventory.clone();
        let service = next.toggle_check(id, now)?.clone();
        self.commit_services(next)?;
        Ok(service)
    }

    /// Restamp every record; no active flags change.
    pub fn check_all(&mut self, now: DateTime<Utc>) -> DashboardResult<()> {
        self.require_session()?;
        let mut next = self.inventory.clone();
        next.check_all(now);
        self.commit_services(next)
    }

    /// Write `next` to the store, then make it the live inventory.
    fn commit_services(&mut self, next: ServiceInventory) -> DashboardResult<()> {
        self.store.set(KEY_SERVICES, encode_inventory(&next)?)?;
        self.inventory = next;
        Ok(())
    }

    // ── Theme ───────────────────────────────────────────────────

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn toggle_theme(&mut self) -> DashboardResult<bool> {
        let mut next = self.theme;
        let dark = next.toggle();
        self.store.set(KEY_DARK_MODE, dark.to_string())?;
        self.theme = next;
        Ok(dark)
    }

    pub fn on_os_theme_change(&mut self, os_dark: bool) -> bool {
        self.theme.on_os_change(os_dark)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn encode_inventory(inventory: &ServiceInventory) -> DashboardResult<String> {
    serde_json::to_string(inventory).map_err(|source| DashboardError::CorruptEntry {
        key: KEY_SERVICES,
        source,
    })
}
