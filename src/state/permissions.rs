/// Runtime permission flow
///
/// The camera needs a runtime permission. The flow checks it at startup,
/// asks for whatever is missing, explains and asks again while the platform
/// allows it, and ends in `Unavailable` once the user has refused for good.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::PermissionPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Camera,
}

impl Permission {
    pub fn label(&self) -> &'static str {
        match self {
            Permission::Camera => "camera",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the gallery needs before it can capture
pub const REQUIRED_PERMISSIONS: &[Permission] = &[Permission::Camera];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionState {
    Unchecked,
    /// A platform request for these permissions is in flight
    Requesting(Vec<Permission>),
    /// Explanation shown; acknowledging it asks again for these permissions
    Rationale(Vec<Permission>),
    Granted,
    /// Terminal: the camera feature stays off for this session
    Unavailable(Vec<Permission>),
}

/// What the caller has to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStep {
    Granted,
    Request(Vec<Permission>),
    ShowRationale(Vec<Permission>),
    Unavailable(Vec<Permission>),
    /// Nothing to do in the current state
    Idle,
}

#[derive(Debug, Clone)]
pub struct PermissionFlow {
    required: Vec<Permission>,
    state: PermissionState,
    rationale_prompts: u32,
    max_rationale_prompts: u32,
}

impl PermissionFlow {
    pub fn new(required: &[Permission], max_rationale_prompts: u32) -> Self {
        PermissionFlow {
            required: required.to_vec(),
            state: PermissionState::Unchecked,
            rationale_prompts: 0,
            max_rationale_prompts,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    /// The permissions the rationale dialog is currently explaining
    pub fn rationale(&self) -> Option<&[Permission]> {
        match &self.state {
            PermissionState::Rationale(permissions) => Some(permissions),
            _ => None,
        }
    }

    /// Startup check: request whatever is not granted yet.
    pub fn check(&mut self, port: &dyn PermissionPort) -> PermissionStep {
        let missing: Vec<Permission> = self
            .required
            .iter()
            .copied()
            .filter(|permission| !port.is_granted(*permission))
            .collect();

        if missing.is_empty() {
            self.state = PermissionState::Granted;
            return PermissionStep::Granted;
        }

        tracing::info!(?missing, "requesting permissions");
        self.state = PermissionState::Requesting(missing.clone());
        PermissionStep::Request(missing)
    }

    /// Handle the platform's answer to a request for `requested`.
    ///
    /// An empty `requested` stands for the request in flight. `Unavailable`
    /// is never left again.
    pub fn on_result(&mut self, requested: &[Permission], port: &dyn PermissionPort) -> PermissionStep {
        if let PermissionState::Unavailable(refused) = &self.state {
            return PermissionStep::Unavailable(refused.clone());
        }

        let requested = match (&self.state, requested.is_empty()) {
            (PermissionState::Requesting(in_flight), true) => in_flight.clone(),
            (_, true) => self.required.clone(),
            (_, false) => requested.to_vec(),
        };

        let rejected: Vec<Permission> = requested
            .iter()
            .copied()
            .filter(|permission| !port.is_granted(*permission))
            .collect();

        if rejected.is_empty() {
            // A partial request may have left other required permissions out
            return self.check(port);
        }

        let permanently_denied = rejected
            .iter()
            .any(|permission| !port.should_show_rationale(*permission));

        if permanently_denied || self.rationale_prompts >= self.max_rationale_prompts {
            tracing::warn!(?rejected, "permissions refused, camera disabled");
            self.state = PermissionState::Unavailable(rejected.clone());
            return PermissionStep::Unavailable(rejected);
        }

        self.rationale_prompts += 1;
        self.state = PermissionState::Rationale(rejected.clone());
        PermissionStep::ShowRationale(rejected)
    }

    /// The user acknowledged the rationale: ask again for exactly those permissions.
    pub fn acknowledge_rationale(&mut self) -> PermissionStep {
        match std::mem::replace(&mut self.state, PermissionState::Unchecked) {
            PermissionState::Rationale(permissions) => {
                self.state = PermissionState::Requesting(permissions.clone());
                PermissionStep::Request(permissions)
            }
            other => {
                self.state = other;
                PermissionStep::Idle
            }
        }
    }
}
