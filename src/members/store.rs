//! Member and team storage operations.
//!
//! T015: Create MemberStore read model queries
//!
//! Member/team CRUD is owned by the identity collaborator; the insert
//! helpers here exist for bootstrap and tests. Everything the core
//! consumes at runtime is a read.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{Member, Role, RosterEntry, Team};

/// Store for member, team, and membership reads.
pub struct MemberStore<'a> {
    conn: &'a Connection,
}

impl<'a> MemberStore<'a> {
    /// Create a new member store with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a member record.
    pub fn insert_member(&self, member: &Member) -> Result<(), MemberError> {
        self.conn.execute(
            "INSERT INTO members
             (id, display_name, role, is_active, checkin_opt_in, tz_offset_minutes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                member.id.to_string(),
                member.display_name,
                member.role.as_str(),
                member.is_active as i32,
                member.checkin_opt_in as i32,
                member.tz_offset_minutes,
                member.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Insert a team record.
    pub fn insert_team(&self, team: &Team) -> Result<(), MemberError> {
        self.conn.execute(
            "INSERT INTO teams (id, name, manager_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                team.id.to_string(),
                team.name,
                team.manager_id.map(|id| id.to_string()),
                team.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record a team membership.
    pub fn add_membership(&self, member_id: Uuid, team_id: Uuid) -> Result<(), MemberError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO team_memberships (member_id, team_id, joined_at)
             VALUES (?1, ?2, ?3)",
            params![
                member_id.to_string(),
                team_id.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Remove a team membership.
    pub fn remove_membership(&self, member_id: Uuid, team_id: Uuid) -> Result<(), MemberError> {
        self.conn.execute(
            "DELETE FROM team_memberships WHERE member_id = ?1 AND team_id = ?2",
            params![member_id.to_string(), team_id.to_string()],
        )?;

        Ok(())
    }

    /// Get a member by ID.
    pub fn get_member(&self, id: Uuid) -> Result<Option<Member>, MemberError> {
        self.conn
            .query_row(
                "SELECT id, display_name, role, is_active, checkin_opt_in, tz_offset_minutes,
                        created_at
                 FROM members WHERE id = ?1",
                params![id.to_string()],
                parse_member_row,
            )
            .optional()
            .map_err(MemberError::from)
    }

    /// Every active (user, team, opt-in) tuple currently on a roster.
    pub fn active_roster(&self) -> Result<Vec<RosterEntry>, MemberError> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, tm.team_id, m.checkin_opt_in
             FROM members m
             JOIN team_memberships tm ON tm.member_id = m.id
             WHERE m.is_active = 1
             ORDER BY tm.team_id, m.id",
        )?;

        let rows = stmt.query_map([], |row| {
            let user_id: String = row.get(0)?;
            let team_id: String = row.get(1)?;
            let opt_in: i32 = row.get(2)?;
            Ok((user_id, team_id, opt_in))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (user_id, team_id, opt_in) = row?;
            let (user_id, team_id) = match (Uuid::parse_str(&user_id), Uuid::parse_str(&team_id)) {
                (Ok(u), Ok(t)) => (u, t),
                _ => continue,
            };
            entries.push(RosterEntry {
                user_id,
                team_id,
                opt_in: opt_in != 0,
            });
        }

        Ok(entries)
    }

    /// Team ids the member belongs to.
    pub fn member_team_ids(&self, member_id: Uuid) -> Result<Vec<Uuid>, MemberError> {
        let mut stmt = self
            .conn
            .prepare("SELECT team_id FROM team_memberships WHERE member_id = ?1")?;

        let rows = stmt.query_map(params![member_id.to_string()], |row| {
            let id: String = row.get(0)?;
            Ok(id)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            if let Ok(id) = Uuid::parse_str(&row?) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Team ids the member manages.
    pub fn managed_team_ids(&self, member_id: Uuid) -> Result<Vec<Uuid>, MemberError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM teams WHERE manager_id = ?1")?;

        let rows = stmt.query_map(params![member_id.to_string()], |row| {
            let id: String = row.get(0)?;
            Ok(id)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            if let Ok(id) = Uuid::parse_str(&row?) {
                ids.push(id);
            }
        }

        Ok(ids)
    }
}

/// Parse a database row into a Member.
fn parse_member_row(row: &rusqlite::Row) -> rusqlite::Result<Member> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(2)?;
    let is_active: i32 = row.get(3)?;
    let checkin_opt_in: i32 = row.get(4)?;
    let created_at_str: String = row.get(6)?;

    Ok(Member {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        display_name: row.get(1)?,
        role: Role::parse(&role_str),
        is_active: is_active != 0,
        checkin_opt_in: checkin_opt_in != 0,
        tz_offset_minutes: row.get(5)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Member storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_insert_and_get_member() {
        let db = Database::open_in_memory().unwrap();
        let store = MemberStore::new(db.connection());

        let mut member = Member::new("Ada".to_string());
        member.role = Role::Manager;
        member.tz_offset_minutes = -300;
        store.insert_member(&member).unwrap();

        let loaded = store.get_member(member.id).unwrap().unwrap();
        assert_eq!(loaded.display_name, "Ada");
        assert_eq!(loaded.role, Role::Manager);
        assert_eq!(loaded.tz_offset_minutes, -300);
        assert!(loaded.checkin_opt_in);
    }

    #[test]
    fn test_active_roster_excludes_inactive_members() {
        let db = Database::open_in_memory().unwrap();
        let store = MemberStore::new(db.connection());

        let team = Team::new("core".to_string());
        store.insert_team(&team).unwrap();

        let active = Member::new("Ada".to_string());
        let mut inactive = Member::new("Bob".to_string());
        inactive.is_active = false;
        let mut opted_out = Member::new("Cleo".to_string());
        opted_out.checkin_opt_in = false;

        for member in [&active, &inactive, &opted_out] {
            store.insert_member(member).unwrap();
            store.add_membership(member.id, team.id).unwrap();
        }

        let roster = store.active_roster().unwrap();
        assert_eq!(roster.len(), 2);
        assert!(roster
            .iter()
            .any(|e| e.user_id == active.id && e.opt_in));
        // Opted-out members stay on the roster with the opt-in recorded
        assert!(roster
            .iter()
            .any(|e| e.user_id == opted_out.id && !e.opt_in));
        assert!(!roster.iter().any(|e| e.user_id == inactive.id));
    }

    #[test]
    fn test_team_scope_queries() {
        let db = Database::open_in_memory().unwrap();
        let store = MemberStore::new(db.connection());

        let mut manager = Member::new("Mel".to_string());
        manager.role = Role::Manager;
        store.insert_member(&manager).unwrap();

        let mut managed = Team::new("alpha".to_string());
        managed.manager_id = Some(manager.id);
        let other = Team::new("beta".to_string());
        store.insert_team(&managed).unwrap();
        store.insert_team(&other).unwrap();

        store.add_membership(manager.id, other.id).unwrap();

        assert_eq!(store.managed_team_ids(manager.id).unwrap(), vec![managed.id]);
        assert_eq!(store.member_team_ids(manager.id).unwrap(), vec![other.id]);
    }

    #[test]
    fn test_remove_membership() {
        let db = Database::open_in_memory().unwrap();
        let store = MemberStore::new(db.connection());

        let member = Member::new("Ada".to_string());
        let team = Team::new("core".to_string());
        store.insert_member(&member).unwrap();
        store.insert_team(&team).unwrap();
        store.add_membership(member.id, team.id).unwrap();

        store.remove_membership(member.id, team.id).unwrap();
        assert!(store.member_team_ids(member.id).unwrap().is_empty());
    }
}
