//! # Access Rules
//!
//! The identity layer (outside this workspace) authenticates the caller and
//! hands the engine an [`Actor`]. Every rental operation evaluates
//! [`can_act`] exactly once, right after loading the rental.

use serde::{Deserialize, Serialize};

use crate::types::{Rental, Role};

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    /// Builds an actor from the `(acting user, is admin)` pair.
    pub fn new(user_id: impl Into<String>, is_admin: bool) -> Self {
        Actor {
            user_id: user_id.into(),
            role: if is_admin { Role::Admin } else { Role::Client },
        }
    }

    /// Builds an actor carrying an explicit role.
    pub fn with_role(user_id: impl Into<String>, role: Role) -> Self {
        Actor {
            user_id: user_id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Resolves which user's records a listing may show.
    ///
    /// Non-admins always see only their own records, whatever they ask for.
    /// Admins see the requested user, or everyone when `requested` is `None`.
    pub fn listing_scope<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        if self.is_admin() {
            requested
        } else {
            Some(self.user_id.as_str())
        }
    }
}

/// Whether `actor` may pay, finish, cancel or view `rental`.
///
/// Owners may act on their own rentals; admins may act on any rental.
#[inline]
pub fn can_act(actor: &Actor, rental: &Rental) -> bool {
    actor.is_admin() || actor.user_id == rental.user_id
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RentalStatus;
    use chrono::{Duration, Utc};

    fn rental_owned_by(user_id: &str) -> Rental {
        let now = Utc::now();
        Rental {
            id: "rental-1".to_string(),
            user_id: user_id.to_string(),
            car_id: "car-1".to_string(),
            start_at: now,
            end_at: now + Duration::hours(2),
            total_price_cents: 2000,
            status: RentalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owner_can_act() {
        let rental = rental_owned_by("alice");
        assert!(can_act(&Actor::new("alice", false), &rental));
    }

    #[test]
    fn test_stranger_cannot_act() {
        let rental = rental_owned_by("alice");
        assert!(!can_act(&Actor::new("mallory", false), &rental));
        assert!(!can_act(&Actor::with_role("mallory", Role::Corporate), &rental));
    }

    #[test]
    fn test_admin_can_act_on_anything() {
        let rental = rental_owned_by("alice");
        assert!(can_act(&Actor::new("root", true), &rental));
    }

    #[test]
    fn test_listing_scope() {
        let client = Actor::new("alice", false);
        assert_eq!(client.listing_scope(Some("bob")), Some("alice"));
        assert_eq!(client.listing_scope(None), Some("alice"));

        let admin = Actor::new("root", true);
        assert_eq!(admin.listing_scope(Some("bob")), Some("bob"));
        assert_eq!(admin.listing_scope(None), None);
    }
}
