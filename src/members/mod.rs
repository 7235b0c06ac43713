//! Member read model.
//!
//! Identity, team membership, and roles are owned by an external
//! collaborator; this module only reads them.

pub mod store;
pub mod types;

pub use store::{MemberError, MemberStore};
pub use types::{Member, Role, RosterEntry, Team};
