//! # Rental Lifecycle
//!
//! The exhaustive transition table for [`RentalStatus`].
//!
//! ```text
//!                 pay               finish
//!   ┌─────────┐ ──────► ┌────────┐ ──────► ┌───────────┐
//!   │ pending │         │ active │         │ completed │  (terminal)
//!   └─────────┘         └────────┘         └───────────┘
//!        │
//!        │ cancel (only before start)
//!        ▼
//!   ┌───────────┐
//!   │ cancelled │  (terminal)
//!   └───────────┘
//! ```
//!
//! Anything not drawn above is rejected. Creation is not an action: a
//! rental is born `Pending`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::RentalStatus;

/// An operation that moves an existing rental to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalAction {
    Pay,
    Finish,
    Cancel,
}

impl RentalAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalAction::Pay => "pay",
            RentalAction::Finish => "finish",
            RentalAction::Cancel => "cancel",
        }
    }

    /// The only status this action may start from.
    pub const fn required_status(&self) -> RentalStatus {
        match self {
            RentalAction::Pay | RentalAction::Cancel => RentalStatus::Pending,
            RentalAction::Finish => RentalStatus::Active,
        }
    }
}

impl fmt::Display for RentalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RentalStatus {
    /// Returns the status reached by applying `action`, or
    /// [`CoreError::InvalidTransition`] if the table has no such edge.
    ///
    /// ## Example
    /// ```rust
    /// use autorent_core::{RentalAction, RentalStatus};
    ///
    /// assert_eq!(RentalStatus::Pending.apply(RentalAction::Pay).unwrap(), RentalStatus::Active);
    /// assert!(RentalStatus::Completed.apply(RentalAction::Finish).is_err());
    /// ```
    pub fn apply(self, action: RentalAction) -> CoreResult<RentalStatus> {
        match (self, action) {
            (RentalStatus::Pending, RentalAction::Pay) => Ok(RentalStatus::Active),
            (RentalStatus::Pending, RentalAction::Cancel) => Ok(RentalStatus::Cancelled),
            (RentalStatus::Active, RentalAction::Finish) => Ok(RentalStatus::Completed),
            (from, action) => Err(CoreError::InvalidTransition { from, action }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
