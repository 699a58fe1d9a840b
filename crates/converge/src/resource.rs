//! Resource trait for idempotent provisioning
//!
//! A Resource is one unit of desired host state. It can probe whether
//! that state already holds, and establish it when it does not.

use crate::context::ApplyContext;
use crate::types::Satisfaction;
use anyhow::Result;
use std::fmt;

/// Core trait for provisionable resources
///
/// Every resource implements this trait, which provides:
/// - Identity (id, description, type)
/// - A side-effect-free probe of current state
/// - An idempotent-intent apply that establishes the desired state
/// - A best-effort flag controlling fail-fast behavior
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// Stable within its type. Examples:
    /// - "postgres" for a package set
    /// - "/srv/app/.env" for a rendered file
    /// - "nginx" for a service
    fn id(&self) -> String;

    /// Human-readable description of what this resource ensures
    fn description(&self) -> String;

    /// Resource type category
    ///
    /// Used for grouping and `--target` filtering. Examples:
    /// - "package_set", "config_file", "service", "pg_role"
    fn resource_type(&self) -> &'static str;

    /// Whether a failure of this resource is tolerated
    ///
    /// Required resources (the default) abort the rest of the plan on
    /// failure. Best-effort resources log the failure and the walk
    /// continues - e.g. starting an app service before any application
    /// code has been deployed.
    fn best_effort(&self) -> bool {
        false
    }

    /// Probe the current state of this resource
    ///
    /// Must be side-effect-free and must not assume the resource exists:
    /// absence is `Missing`, not an error. Return `Unknown` when the
    /// check itself cannot run; the reconciler treats that as `Missing`
    /// and records a warning.
    fn probe(&self) -> Result<Satisfaction>;

    /// Establish the desired state
    ///
    /// Called only after the probe reported `Missing` or `Unknown`, so
    /// the action may assume a clean-slate precondition. It must still be
    /// safe to invoke over a partially-applied previous attempt (e.g.
    /// file writes replace the full content). External exit codes must be
    /// surfaced verbatim in the error chain.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<()>;
}

/// A boxed resource for type-erased storage in a plan
pub type BoxedResource = Box<dyn Resource>;
