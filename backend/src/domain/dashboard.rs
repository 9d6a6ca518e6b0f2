//! Role-capability descriptors driving the single parameterised dashboard.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{Error, Role};

/// An action a dashboard may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// List every account across roles.
    ListUsers,
    /// Edit another account's details.
    EditUsers,
    /// Delete another account.
    DeleteUsers,
    /// Reset another account's password.
    ResetPasswords,
    /// List the patients assigned to the signed-in caregiver.
    ViewAssignedPatients,
    /// Read alert and outage history of assigned patients.
    ViewPatientEvents,
    /// Read the signed-in patient's own record.
    ViewOwnRecord,
    /// Read the caregiver assigned to the signed-in patient.
    ViewOwnCaregiver,
    /// Read the signed-in patient's own alert and outage history.
    ViewOwnEvents,
    /// Edit the signed-in account's profile and password.
    EditOwnProfile,
}

/// What one role's dashboard shows and allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDescriptor {
    pub role: Role,
    pub title: &'static str,
    pub route: &'static str,
    pub capabilities: BTreeSet<Capability>,
}

impl DashboardDescriptor {
    /// Descriptor for `role`.
    ///
    /// # Examples
    /// ```
    /// use guardian_vision::domain::{Capability, DashboardDescriptor, Role};
    ///
    /// let admin = DashboardDescriptor::for_role(Role::Admin);
    /// assert!(admin.allows(Capability::DeleteUsers));
    /// assert!(!DashboardDescriptor::for_role(Role::Patient).allows(Capability::ListUsers));
    /// ```
    pub fn for_role(role: Role) -> Self {
        use Capability::*;
        let (title, granted): (&'static str, &[Capability]) = match role {
            Role::Admin => (
                "Administrator dashboard",
                &[ListUsers, EditUsers, DeleteUsers, ResetPasswords],
            ),
            Role::Caregiver => (
                "Caregiver dashboard",
                &[ViewAssignedPatients, ViewPatientEvents],
            ),
            Role::Patient => (
                "Patient dashboard",
                &[ViewOwnRecord, ViewOwnCaregiver, ViewOwnEvents],
            ),
        };
        let capabilities = granted
            .iter()
            .copied()
            .chain(std::iter::once(EditOwnProfile))
            .collect();
        Self {
            role,
            title,
            route: role.dashboard_route(),
            capabilities,
        }
    }

    /// Whether the dashboard grants `capability`.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with `forbidden` unless `capability` is granted.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "{} accounts cannot perform this action",
                self.role
            )))
        }
    }
}
