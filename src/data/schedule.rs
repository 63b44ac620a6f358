//! Schedule helpers: date parsing and bye-week detection.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::types::ScheduledGame;

/// A team coming off at least this many days without a game had a bye.
pub const BYE_GAP_DAYS: i64 = 13;

/// Parse an ISO-8601 timestamp. Accepts RFC 3339, naive date-times (taken
/// as UTC) and bare dates. Returns `None` when nothing matches.
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whether the gap since the previous game amounts to a bye week.
pub fn detect_bye(prev_game: Option<DateTime<Utc>>, current: DateTime<Utc>) -> bool {
    match prev_game {
        Some(prev) => (current - prev).num_days() >= BYE_GAP_DAYS,
        None => false,
    }
}

/// Kickoff of the last game that finished before `kickoff`.
///
/// Games within 12 hours of `kickoff` are taken to be the game itself.
pub fn previous_game_date(games: &[ScheduledGame], kickoff: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let cutoff = kickoff - Duration::hours(12);
    games
        .iter()
        .filter_map(|g| g.start_date)
        .filter(|d| *d < cutoff)
        .max()
}

/// Season a date belongs to. Bowl games in January and February count
/// toward the previous year's season.
pub fn season_for(date: DateTime<Utc>) -> i32 {
    if date.month() <= 2 {
        date.year() - 1
    } else {
        date.year()
    }
}
