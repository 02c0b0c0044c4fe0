//! Case assembly: triage, evidence, critic validation.
//!
//! A [`Case`] flows Pending -> (Accepted | NeedsEvidence) ->
//! (Accepted | Rejected); the orchestrator drives the transitions and the
//! single allowed evidence re-collection.

pub mod critic;
pub mod evidence;
pub mod orchestrator;
pub mod triage;
pub mod types;

pub use critic::CaseCritic;
pub use evidence::{EvidenceCollector, EvidenceScope};
pub use orchestrator::Orchestrator;
pub use triage::CaseAssembler;
pub use types::{Case, CaseStatus, Validation};
