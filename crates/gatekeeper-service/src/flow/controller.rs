//! Flow controller: decides, then completes according to the gateway mode.
//!
//! ```text
//! params missing ─────────────────────────────► BadRequest
//! session absent ─────────────────────────────► RedirectToLogin (303)
//! session active, ACL deny ───────────────────► Forbidden
//! session active, ACL allow ─┬─ integrated ───► Download (303 to signed URL)
//!                            └─ auth-only ────► Granted
//! ```
//!
//! An absent session is sent to login even when the ACLs would admit
//! anonymous callers.

use std::fmt;
use std::sync::Arc;

use gatekeeper_auth::SessionState;
use gatekeeper_core::config::GatewayMode;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::LinkIssuer;

use crate::context::RequestContext;
use crate::snapshot::{GatewaySnapshot, SnapshotStore};

use super::outcome::{FlowDecision, FlowOutcome};
use super::resource::ResourcePath;

/// Runs requests through the authentication flow.
#[derive(Clone)]
pub struct AuthFlow {
    store: Arc<SnapshotStore>,
    issuer: Arc<dyn LinkIssuer>,
}

impl fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthFlow")
            .field("issuer", &self.issuer.provider_type())
            .finish()
    }
}

impl AuthFlow {
    /// Creates a new flow controller.
    pub fn new(store: Arc<SnapshotStore>, issuer: Arc<dyn LinkIssuer>) -> Self {
        Self { store, issuer }
    }

    /// The snapshot store this flow reads.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Handles one request against the live snapshot.
    pub async fn handle(&self, ctx: &RequestContext) -> AppResult<FlowOutcome> {
        let snapshot = self.store.current();
        self.handle_with(&snapshot, ctx).await
    }

    /// Handles one request against `snapshot`.
    ///
    /// Callers that already read the cookie under a snapshot pass that same
    /// snapshot here, so a reload mid-request does not change the keys or
    /// ACLs the request sees. Only link issuance can fail.
    pub async fn handle_with(
        &self,
        snapshot: &GatewaySnapshot,
        ctx: &RequestContext,
    ) -> AppResult<FlowOutcome> {
        let outcome = match Self::decide(snapshot, ctx) {
            FlowDecision::BadRequest { reason } => FlowOutcome::BadRequest { reason },
            FlowDecision::RedirectToLogin { location } => FlowOutcome::RedirectToLogin { location },
            FlowDecision::Forbidden { login, resource } => {
                FlowOutcome::Forbidden { login, resource }
            }
            FlowDecision::Authorized {
                login, resource, ..
            } => match snapshot.mode() {
                GatewayMode::AuthorizationOnly => FlowOutcome::Granted { login, resource },
                GatewayMode::Integrated => {
                    let link = self
                        .issuer
                        .issue_link(resource.bucket(), resource.key())
                        .await?;
                    FlowOutcome::Download {
                        login,
                        resource,
                        link,
                    }
                }
            },
        };

        tracing::info!(outcome = outcome.label(), "Request handled");
        Ok(outcome)
    }

    /// Pure authorization decision for `ctx` under `snapshot`.
    pub fn decide(snapshot: &GatewaySnapshot, ctx: &RequestContext) -> FlowDecision {
        let resource = match ResourcePath::from_params(ctx.bucket.as_deref(), ctx.path.as_deref()) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::debug!(reason = %e.message, "Rejecting request");
                return FlowDecision::BadRequest { reason: e.message };
            }
        };

        let state = snapshot.codec().decode_optional(ctx.session_token.as_deref());
        let session = match state {
            SessionState::Active(session) => session,
            SessionState::Absent => {
                return match ctx.return_url() {
                    Some(return_url) => {
                        tracing::debug!(resource = %resource, "No session, redirecting to login");
                        FlowDecision::RedirectToLogin {
                            location: snapshot.login_redirect(&return_url),
                        }
                    }
                    None => FlowDecision::BadRequest {
                        reason: "missing host".to_string(),
                    },
                };
            }
        };

        let login = session.login().to_string();
        let resolution = snapshot
            .acl()
            .resolve(&resource.acl_path(), &SessionState::Active(session));

        if resolution.decision.is_allowed() {
            tracing::info!(
                login = %login,
                resource = %resource,
                acl = resolution.matched_key.as_deref().unwrap_or("-"),
                "Access granted"
            );
            FlowDecision::Authorized {
                login,
                resource,
                resolution,
            }
        } else {
            tracing::info!(
                login = %login,
                resource = %resource,
                acl = resolution.matched_key.as_deref().unwrap_or("-"),
                "Access denied"
            );
            FlowDecision::Forbidden { login, resource }
        }
    }
}
