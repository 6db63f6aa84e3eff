//! The per-request authentication flow.

pub mod controller;
pub mod outcome;
pub mod resource;

pub use controller::AuthFlow;
pub use outcome::{FlowDecision, FlowOutcome};
pub use resource::ResourcePath;
