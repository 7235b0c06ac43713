//! Roster maintenance module.
//!
//! Writes the forward-looking part of the attendance ledger:
//! - periodic generation of future rows for every active member
//! - backfill and cleanup when team membership changes

pub mod generator;
pub mod membership;

pub use generator::RosterGenerator;
pub use membership::MembershipHandler;

use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::members::MemberError;

/// Roster maintenance errors.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Member error: {0}")]
    Member(#[from] MemberError),

    #[error("Unknown member: {0}")]
    UnknownMember(Uuid),
}
