use chrono::{DateTime, Utc};

use crate::error::{FixtureError, FixtureResult};
use crate::models::{SideScore, Sport};

const MAX_NAME_LEN: usize = 100;

/// Render a ball count as cricket overs, e.g. 75 balls -> "12.3".
pub fn format_overs(balls: u32) -> String {
    format!("{}.{}", balls / 6, balls % 6)
}

/// Scoreboard line for one side of a live match.
pub fn format_side_score(sport: Sport, side: &SideScore) -> String {
    match sport {
        Sport::Cricket => format!("{}/{} ({} ov)", side.score, side.wickets, format_overs(side.balls)),
        Sport::Football => side.score.to_string(),
    }
}

/// Generated fixtures carry no date until one is assigned.
pub fn format_match_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "TBD".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

/// Names end up on fixture lists and tables: non-blank and at most 100 characters.
pub fn validate_name(kind: &str, name: &str) -> FixtureResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FixtureError::invalid(format!("{} name must not be blank", kind)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FixtureError::invalid(format!(
            "{} name is longer than {} characters",
            kind, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Pick the candidate closest to `query` by normalized Jaro-Winkler similarity.
///
/// Returns `None` when nothing scores at least `threshold`.
pub fn closest_name<'a, I>(query: &str, candidates: I, threshold: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim().to_lowercase();
    candidates
        .into_iter()
        .map(|candidate| {
            let score = strsim::jaro_winkler(&query, &candidate.to_lowercase());
            (candidate, score)
        })
        .filter(|(_, score)| *score >= threshold)
        .fold(None, |best: Option<(&str, f64)>, (candidate, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((candidate, score)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_overs() {
        assert_eq!(format_overs(0), "0.0");
        assert_eq!(format_overs(75), "12.3");
        assert_eq!(format_overs(120), "20.0");
    }

    #[test]
    fn test_format_side_score() {
        let side = SideScore { score: 156, wickets: 7, balls: 120 };
        assert_eq!(format_side_score(Sport::Cricket, &side), "156/7 (20.0 ov)");
        assert_eq!(format_side_score(Sport::Football, &SideScore { score: 2, ..Default::default() }), "2");
    }

    #[test]
    fn test_format_match_date() {
        assert_eq!(format_match_date(None), "TBD");
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap();
        assert_eq!(format_match_date(Some(date)), "2024-05-01 18:30");
    }

    #[test]
    fn test_closest_name() {
        let names = ["Mumbai Strikers", "Chennai Kings", "Delhi Dynamos"];
        let (best, _) = closest_name("chenai kings", names, 0.8).unwrap();
        assert_eq!(best, "Chennai Kings");
        assert!(closest_name("zzzz", names, 0.9).is_none());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("team", "Rovers").is_ok());
        assert!(matches!(validate_name("team", "   "), Err(FixtureError::InvalidInput(_))));
        assert!(validate_name("venue", &"x".repeat(101)).is_err());
        assert!(validate_name("venue", &"é".repeat(100)).is_ok());
    }
}
