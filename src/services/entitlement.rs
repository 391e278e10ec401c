//! Entitlement resolution — membership, subscription, and seat capacity.
//!
//! DESIGN
//! ======
//! Read-only against the record store; the resolver never mutates anything.
//! One authoritative resolution path: active membership -> team ->
//! subscription in an admitting status -> seat headroom.
//!
//! TRADE-OFFS
//! ==========
//! The seat check is count-then-decide with no lock across the store
//! boundary, so two concurrent requests can both observe headroom that only
//! one of them should get. Closing that gap would need a serializable
//! transaction owned by the store; seat accounting is eventually consistent
//! instead.

use tracing::{debug, warn};

use crate::error::EntitlementError;
use crate::store::{CallerIdentity, Membership, RecordStore, Subscription, Team};

/// Everything admission needs to know about a verified caller.
/// Request-scoped; assembled here, dropped when the response is sent.
#[derive(Debug, Clone)]
pub struct AdmissionContext {
    pub team: Team,
    pub membership: Membership,
    pub subscription: Subscription,
}

/// Resolve the caller's team, membership, and subscription, enforcing the
/// seat limit.
///
/// # Errors
///
/// One of the [`EntitlementError`] refusals, or `Store` when the record
/// store is unreachable.
pub async fn resolve(store: &dyn RecordStore, identity: &CallerIdentity) -> Result<AdmissionContext, EntitlementError> {
    let mut memberships = store.find_active_memberships(identity.user_id).await?;
    if memberships.is_empty() {
        return Err(EntitlementError::MembershipMissing(identity.user_id));
    }
    if memberships.len() > 1 {
        // The store enforces at most one active seat per (team, user); more
        // than one active membership across teams means drifted data. Pick
        // the lowest membership id so the choice is stable across requests.
        warn!(
            user_id = %identity.user_id,
            count = memberships.len(),
            "multiple active memberships for one user; picking lowest membership id"
        );
    }
    memberships.sort_by_key(|m| m.id);
    let membership = memberships.remove(0);

    let team = store
        .find_team(membership.team_id)
        .await?
        .ok_or(EntitlementError::TeamMissing(membership.team_id))?;

    let subscription = store
        .find_active_subscription(team.id)
        .await?
        .ok_or(EntitlementError::SubscriptionInactive(team.id))?;

    let seats_used = store.count_active_memberships(team.id).await?;
    if seats_used >= subscription.seats_allowed {
        return Err(EntitlementError::SeatLimitReached {
            team_id: team.id,
            seats_used,
            seats_allowed: subscription.seats_allowed,
        });
    }

    debug!(
        user_id = %identity.user_id,
        team_id = %team.id,
        role = membership.role.as_str(),
        seats_used,
        seats_allowed = subscription.seats_allowed,
        "entitlement resolved"
    );

    Ok(AdmissionContext { team, membership, subscription })
}

#[cfg(test)]
#[path = "entitlement_test.rs"]
mod tests;
