//! User-facing message text.
//!
//! T034: Prompt and broadcast formatting

use super::types::Mood;

/// Friendly rejection for a repeated check-in.
pub const ALREADY_CHECKED_IN: &str = "You have already checked in today.";

/// Friendly rejection for a repeated check-out.
pub const ALREADY_CHECKED_OUT: &str = "You have already checked out today.";

/// Check-out attempted without a confirmed check-in.
pub const CHECKIN_REQUIRED: &str =
    "There is no check-in to close out today. Check in first with /checkin.";

/// Action arrived with no prompt outstanding.
pub const NOTHING_PENDING: &str = "There is nothing awaiting confirmation right now.";

/// Store write failed; the prompt stays up for a retry.
pub const TRANSIENT_ERROR: &str =
    "Something went wrong saving your entry. Please try again in a moment.";

/// Member is not known to the identity collaborator.
pub const UNKNOWN_MEMBER: &str = "Your account is not registered for check-ins.";

/// Check-in command invoked with no goal text.
pub const EMPTY_CHECKIN: &str =
    "Please include a goal for today, e.g. /checkin finish the search indexer.";

/// Check-out command invoked with no update text.
pub const EMPTY_CHECKOUT: &str =
    "Please include a short update, e.g. /checkout search indexer merged.";

/// Confirm pressed without selecting a mood.
pub const MOOD_REQUIRED: &str = "Pick a mood before confirming.";

/// Confirmation prompt for a check-in draft.
pub fn checkin_prompt(original: &str, suggested: &str, smart: bool) -> String {
    let verdict = if smart {
        "Your goal already reads as SMART."
    } else {
        "Your goal does not read as SMART yet."
    };

    format!(
        "{}\n\nYour goal: {}\nSuggested rewrite: {}\n\n\
         Add a blocker if you have one, pick a mood, then accept or cancel.",
        verdict, original, suggested
    )
}

/// Confirmation prompt for a check-out draft.
pub fn checkout_prompt(update: &str) -> String {
    format!(
        "Your update: {}\n\n\
         Add a blocker if you have one, pick a mood, mark whether you met \
         today's goals, then accept or cancel.",
        update
    )
}

/// Channel broadcast for a confirmed check-in.
pub fn checkin_broadcast(name: &str, goal: &str, mood: Mood, blocker: Option<&str>) -> String {
    let mut text = format!("{} checked in ({}): {}", name, mood, goal);
    if let Some(blocker) = blocker {
        text.push_str(&format!("\nBlocked: {}", blocker));
    }
    text
}

/// Channel broadcast for a confirmed check-out.
pub fn checkout_broadcast(
    name: &str,
    update: &str,
    mood: Mood,
    goals_met: bool,
    blocker: Option<&str>,
) -> String {
    let goals = if goals_met {
        "goals met"
    } else {
        "goals not met"
    };
    let mut text = format!("{} checked out ({}, {}): {}", name, mood, goals, update);
    if let Some(blocker) = blocker {
        text.push_str(&format!("\nBlocked: {}", blocker));
    }
    text
}
