//! Database schema definitions for Rollcall.
//!
//! T008: Define database schema SQL

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Members table (read model; owned by the identity collaborator)
CREATE TABLE IF NOT EXISTS members (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    is_active INTEGER NOT NULL DEFAULT 1,
    checkin_opt_in INTEGER NOT NULL DEFAULT 1,
    tz_offset_minutes INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Teams table
CREATE TABLE IF NOT EXISTS teams (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    manager_id TEXT REFERENCES members(id),
    created_at TEXT NOT NULL
);

-- Team memberships table
CREATE TABLE IF NOT EXISTS team_memberships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id TEXT NOT NULL REFERENCES members(id),
    team_id TEXT NOT NULL REFERENCES teams(id),
    joined_at TEXT NOT NULL,
    UNIQUE(member_id, team_id)
);

CREATE INDEX IF NOT EXISTS idx_memberships_member_id ON team_memberships(member_id);
CREATE INDEX IF NOT EXISTS idx_memberships_team_id ON team_memberships(team_id);

-- Attendance ledger table
CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    team_id TEXT NOT NULL,
    date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    has_checked_in INTEGER NOT NULL DEFAULT 0,
    is_blocked INTEGER NOT NULL DEFAULT 0,
    smart_goal_score REAL,
    UNIQUE(user_id, team_id, date)
);

CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date);
CREATE INDEX IF NOT EXISTS idx_attendance_user_id ON attendance(user_id);

-- Submissions table
CREATE TABLE IF NOT EXISTS submissions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    date TEXT NOT NULL,
    kind TEXT NOT NULL,
    goal_text TEXT,
    update_text TEXT,
    blocker_text TEXT,
    mood TEXT NOT NULL,
    smart_verdict INTEGER,
    goals_met INTEGER,
    created_at TEXT NOT NULL,
    UNIQUE(user_id, channel_id, date, kind)
);

CREATE INDEX IF NOT EXISTS idx_submissions_lookup ON submissions(user_id, channel_id, date);
"#;

/// SQL for the schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
