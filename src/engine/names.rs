//! Team name canonicalisation.
//!
//! The odds and ratings providers spell team names differently
//! ("Ohio State Buckeyes", "Ohio St.", "Texas A&M"). Names are compared in
//! a normalized form: lowercase, `&` spelled out, periods dropped and
//! "state" contracted to "st".

/// Canonical form of a team name. Idempotent.
pub fn normalize(name: &str) -> String {
    let mut out = name.to_lowercase().replace('&', "and").replace('.', "");
    while out.contains(" state") {
        out = out.replace(" state", " st");
    }
    out.trim().to_string()
}

/// Whether two names refer to the same team after normalization.
pub fn same_team(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Looser match that also accepts a mascot suffix on either side, so
/// "Ohio State" matches "Ohio State Buckeyes". Exact matches should be
/// preferred by callers when both are available.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    long.strip_prefix(short.as_str())
        .is_some_and(|rest| rest.starts_with(' '))
}

/// Length of the normalized name both sides share when they match under
/// [`names_match`], `None` when they don't match. Longer means more
/// specific: "Ohio State Buckeyes" shares 7 with "Ohio State" but only 4
/// with "Ohio".
pub fn match_len(a: &str, b: &str) -> Option<usize> {
    if !names_match(a, b) {
        return None;
    }
    Some(normalize(a).len().min(normalize(b).len()))
}

/// Best candidate for `team` among `items`.
///
/// An exact normalized match wins outright. Otherwise the mascot match
/// sharing the longest name with `team` wins, first one on ties. A loose
/// candidate that matches `opponent` more closely than `team` belongs to
/// the opponent and is skipped, so "Michigan" never resolves to
/// "Michigan State Spartans" in a game against Michigan State.
pub fn best_match<'a, T>(
    items: &'a [T],
    name: impl Fn(&T) -> &str,
    team: &str,
    opponent: Option<&str>,
) -> Option<&'a T> {
    if let Some(exact) = items.iter().find(|item| same_team(name(item), team)) {
        return Some(exact);
    }
    items
        .iter()
        .filter_map(|item| {
            let candidate = name(item);
            let score = match_len(candidate, team)?;
            let opponent_score = opponent.and_then(|o| match_len(candidate, o));
            match opponent_score {
                Some(o) if o > score => None,
                _ => Some((score, item)),
            }
        })
        .reduce(|best, next| if next.0 > best.0 { next } else { best })
        .map(|(_, item)| item)
}
