//! Projections from upstream entries into the compact summaries returned to clients.
//!
//! The upstream schema is treated as partial: any missing or null nested field
//! renders as [`NOT_AVAILABLE`] instead of failing the call.

use serde::Serialize;
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

/// Walk `path` through objects (by key) and arrays (by index). Nulls count as absent.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(*key),
        })
        .filter(|v| !v.is_null())
}

/// Render a scalar at `path` as text, or `"N/A"`.
pub fn text(value: &Value, path: &[&str]) -> String {
    match lookup(value, path) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn optional_text(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize a `response` member into a list of entries.
///
/// Most endpoints answer with an array; `/teams/statistics` answers with a single object.
pub fn entries(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        Value::Object(map) if map.is_empty() => Vec::new(),
        obj @ Value::Object(_) => vec![obj],
        _ => Vec::new(),
    }
}

/// First `limit` entries of a `response` member.
pub fn top(response: Value, limit: usize) -> Vec<Value> {
    let mut items = entries(response);
    items.truncate(limit);
    items
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub code: String,
    pub country: String,
    pub founded: String,
    pub venue: String,
    pub city: String,
}

impl TeamSummary {
    pub fn from_entry(entry: &Value) -> Self {
        Self {
            id: text(entry, &["team", "id"]),
            name: text(entry, &["team", "name"]),
            code: text(entry, &["team", "code"]),
            country: text(entry, &["team", "country"]),
            founded: text(entry, &["team", "founded"]),
            venue: text(entry, &["venue", "name"]),
            city: text(entry, &["venue", "city"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSummary {
    pub id: String,
    pub date: String,
    pub status: String,
    pub league: String,
    pub home: String,
    pub away: String,
    pub venue: String,
}

impl FixtureSummary {
    pub fn from_entry(entry: &Value) -> Self {
        Self {
            id: text(entry, &["fixture", "id"]),
            date: text(entry, &["fixture", "date"]),
            status: text(entry, &["fixture", "status", "long"]),
            league: text(entry, &["league", "name"]),
            home: text(entry, &["teams", "home", "name"]),
            away: text(entry, &["teams", "away", "name"]),
            venue: text(entry, &["fixture", "venue", "name"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamForm {
    pub team: String,
    pub league: String,
    pub season: String,
    /// Recent results, oldest first, e.g. `"WWDLW"`.
    pub form: String,
    pub played: String,
    pub wins: String,
    pub draws: String,
    pub losses: String,
    pub goals_for: String,
    pub goals_against: String,
}

impl TeamForm {
    pub fn from_entry(entry: &Value) -> Self {
        Self {
            team: text(entry, &["team", "name"]),
            league: text(entry, &["league", "name"]),
            season: text(entry, &["league", "season"]),
            form: text(entry, &["form"]),
            played: text(entry, &["fixtures", "played", "total"]),
            wins: text(entry, &["fixtures", "wins", "total"]),
            draws: text(entry, &["fixtures", "draws", "total"]),
            losses: text(entry, &["fixtures", "loses", "total"]),
            goals_for: text(entry, &["goals", "for", "total", "total"]),
            goals_against: text(entry, &["goals", "against", "total", "total"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddValue {
    pub value: String,
    pub odd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsSummary {
    pub fixture_id: String,
    pub league: String,
    pub bookmaker: String,
    pub bet: String,
    pub values: Vec<OddValue>,
}

impl OddsSummary {
    /// Uses the first bookmaker; `bet` selects a market by name, falling back to its first one.
    pub fn from_entry(entry: &Value, bet: Option<&str>) -> Self {
        let bookmaker = lookup(entry, &["bookmakers", "0"]);
        let market = bookmaker
            .and_then(|b| b.get("bets"))
            .and_then(Value::as_array)
            .and_then(|bets| {
                bet.and_then(|wanted| {
                    bets.iter().find(|b| {
                        b.get("name")
                            .and_then(Value::as_str)
                            .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
                    })
                })
                .or_else(|| bets.first())
            });

        let values = market
            .and_then(|m| m.get("values"))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .map(|v| OddValue {
                        value: text(v, &["value"]),
                        odd: text(v, &["odd"]),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            fixture_id: text(entry, &["fixture", "id"]),
            league: text(entry, &["league", "name"]),
            bookmaker: bookmaker
                .map(|b| text(b, &["name"]))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            bet: market
                .map(|m| text(m, &["name"]))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            values,
        }
    }
}

/// One hit of the free-text `search` tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SearchResult {
    pub fn team(entry: &Value) -> Self {
        let team = TeamSummary::from_entry(entry);
        Self {
            id: format!("team:{}", team.id),
            text: describe_team(&team),
            title: team.name,
            url: optional_text(entry, &["team", "logo"]),
        }
    }

    pub fn fixture(entry: &Value) -> Self {
        let fixture = FixtureSummary::from_entry(entry);
        Self {
            id: format!("fixture:{}", fixture.id),
            title: format!("{} vs {}", fixture.home, fixture.away),
            text: describe_fixture(&fixture),
            url: None,
        }
    }
}

/// Full record returned by the `fetch` tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub metadata: Value,
}

impl Document {
    pub fn from_search(result: SearchResult, entry: Value) -> Self {
        Self {
            id: result.id,
            title: result.title,
            text: result.text,
            url: result.url,
            metadata: entry,
        }
    }
}

fn describe_team(team: &TeamSummary) -> String {
    format!(
        "{} ({}), founded {}. Home ground: {}, {}.",
        team.name, team.country, team.founded, team.venue, team.city
    )
}

fn describe_fixture(fixture: &FixtureSummary) -> String {
    format!(
        "{}: {} vs {} on {} at {} ({}).",
        fixture.league, fixture.home, fixture.away, fixture.date, fixture.venue, fixture.status
    )
}
