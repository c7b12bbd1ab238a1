#![allow(missing_docs)]

//! Embedded player port.
//!
//! The controller issues a [`LoadRequest`] per load attempt and expects
//! exactly one [`LoadOutcome`] back through
//! [`CatalogController::complete_load`](crate::controller::CatalogController::complete_load).
//! Outcomes carrying a ticket other than the current one are discarded.

use std::{fmt, time::Duration};

/// Identifier of one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability granted to hosted game content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxPermission {
    Scripts,
    SameOrigin,
    Forms,
    Popups,
    Modals,
    PointerLock,
    TopNavigation,
}

impl SandboxPermission {
    /// Token as used in an iframe `sandbox` attribute.
    pub fn token(&self) -> &'static str {
        match self {
            SandboxPermission::Scripts => "allow-scripts",
            SandboxPermission::SameOrigin => "allow-same-origin",
            SandboxPermission::Forms => "allow-forms",
            SandboxPermission::Popups => "allow-popups",
            SandboxPermission::Modals => "allow-modals",
            SandboxPermission::PointerLock => "allow-pointer-lock",
            SandboxPermission::TopNavigation => "allow-top-navigation",
        }
    }
}

/// Set of capabilities granted to hosted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    permissions: &'static [SandboxPermission],
}

impl SandboxPolicy {
    /// Policy applied to every game. Hosted games may never navigate the
    /// top-level portal.
    pub const RESTRICTED: SandboxPolicy = SandboxPolicy {
        permissions: &[
            SandboxPermission::Scripts,
            SandboxPermission::SameOrigin,
            SandboxPermission::Forms,
            SandboxPermission::Popups,
            SandboxPermission::Modals,
            SandboxPermission::PointerLock,
        ],
    };

    /// Granted permissions.
    pub fn permissions(&self) -> &'static [SandboxPermission] {
        self.permissions
    }

    /// Whether `permission` is granted.
    pub fn allows(&self, permission: SandboxPermission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Space-separated attribute value.
    pub fn attribute(&self) -> String {
        self.permissions
            .iter()
            .map(SandboxPermission::token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Instruction to load one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    /// Resolved game address.
    pub url: String,
    pub sandbox: SandboxPolicy,
    /// Pause before the content source is assigned.
    pub delay: Duration,
}

/// Completion signal of a load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Content confirmed loaded.
    Succeeded,
    /// Content failed to load.
    Failed(String),
}

/// State of the overlay covering the player until content is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerGate {
    /// First load in progress.
    Loading,
    /// Reload of the same game in progress.
    Refreshing,
    /// Content revealed, gate hidden.
    Ready,
    /// Load failed; retry and open-externally are offered.
    Failed { reason: String },
}

impl PlayerGate {
    /// Whether a load is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, PlayerGate::Loading | PlayerGate::Refreshing)
    }
}

/// Single shared frame hosting the active game.
pub trait EmbeddedPlayer {
    /// Start loading content. Any previous content is already cleared.
    fn load(&mut self, request: LoadRequest);
    /// Drop the active content.
    fn clear(&mut self);
    /// Open `url` outside the player.
    fn open_external(&mut self, url: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_policy_denies_top_navigation() {
        let policy = SandboxPolicy::RESTRICTED;
        assert!(!policy.allows(SandboxPermission::TopNavigation));
        assert!(policy.allows(SandboxPermission::PointerLock));
        assert_eq!(
            policy.attribute(),
            "allow-scripts allow-same-origin allow-forms allow-popups allow-modals allow-pointer-lock"
        );
    }
}
