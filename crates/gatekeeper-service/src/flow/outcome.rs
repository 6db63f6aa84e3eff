//! States the flow can end in.

use serde::Serialize;

use gatekeeper_auth::Resolution;
use gatekeeper_core::traits::SignedLink;

use super::resource::ResourcePath;

/// Authorization verdict, before any link is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowDecision {
    /// `bucket` or `path` missing or empty.
    BadRequest { reason: String },
    /// No valid session; the caller must log in.
    RedirectToLogin { location: String },
    /// Valid session, but the ACLs deny.
    Forbidden { login: String, resource: ResourcePath },
    /// Valid session and the ACLs allow.
    Authorized {
        login: String,
        resource: ResourcePath,
        resolution: Resolution,
    },
}

/// Terminal state of a request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FlowOutcome {
    /// `bucket` or `path` missing or empty.
    BadRequest { reason: String },
    /// 303 to the identity provider.
    RedirectToLogin { location: String },
    /// The ACLs deny this caller.
    Forbidden { login: String, resource: ResourcePath },
    /// Authorized; the caller fetches the object itself.
    Granted { login: String, resource: ResourcePath },
    /// Authorized; 303 to a short-lived signed URL.
    Download {
        login: String,
        resource: ResourcePath,
        link: SignedLink,
    },
}

impl FlowOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::RedirectToLogin { .. } => "redirect_to_login",
            Self::Forbidden { .. } => "forbidden",
            Self::Granted { .. } => "granted",
            Self::Download { .. } => "download",
        }
    }
}
