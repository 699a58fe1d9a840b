//! # Converge
//!
//! A minimal engine for idempotent host reconciliation.
//!
//! This crate provides the core abstractions for describing desired host
//! state as an ordered plan of resources, probing what already holds, and
//! applying only the missing steps.
//!
//! ## Core Concepts
//!
//! - **Resource**: one unit of desired state (a package set, a file, a
//!   service, a database role) that knows how to probe itself and how to
//!   establish itself
//! - **Satisfaction**: the result of a read-only probe
//! - **Plan**: the ordered list of resources to reconcile; list order is
//!   execution order
//! - **Reconciler**: walks the plan sequentially, skips what is satisfied,
//!   applies what is missing, and re-probes to verify every action
//!
//! ## Example
//!
//! ```ignore
//! use converge::{
//!     ApplyContext, Plan, ReconcileOptions, Resource, Satisfaction,
//!     reconcile, NoProgress,
//! };
//!
//! #[derive(Debug)]
//! struct Marker { path: String }
//!
//! impl Resource for Marker {
//!     fn id(&self) -> String { self.path.clone() }
//!     fn description(&self) -> String { format!("Marker file {}", self.path) }
//!     fn resource_type(&self) -> &'static str { "marker" }
//!
//!     fn probe(&self) -> anyhow::Result<Satisfaction> {
//!         if std::path::Path::new(&self.path).exists() {
//!             Ok(Satisfaction::Satisfied)
//!         } else {
//!             Ok(Satisfaction::Missing)
//!         }
//!     }
//!
//!     fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<()> {
//!         std::fs::write(&self.path, b"")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut plan = Plan::new();
//! plan.push(Box::new(Marker { path: "/tmp/provisioned".into() }));
//! let report = reconcile(plan, &ReconcileOptions::default(), &mut NoProgress);
//! assert!(report.is_success());
//! ```
//!
//! ## Semantics
//!
//! The walk is strictly sequential. A failed **required** resource aborts
//! the rest of the plan (remaining resources are recorded as skipped); a
//! failed **best-effort** resource is logged and the walk continues. After
//! every apply the resource is probed again - an action whose exit status
//! was zero but whose effect did not materialize is reported as failed.

pub mod context;
pub mod plan;
pub mod reconciler;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, NoProgress, ProgressCallback};
pub use plan::{Plan, TargetError};
pub use reconciler::reconcile;
pub use resource::{BoxedResource, Resource};
pub use types::{Outcome, ReconcileOptions, Report, ResourceOutcome, Satisfaction};
