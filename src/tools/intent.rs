//! Keyword classification for the free-text `search` tool.
//!
//! A closed lookup table, not a parser: the query is scanned for league names and a
//! handful of keywords to decide which endpoint to hit and which league id to use.

use regex_lite::Regex;
use std::sync::OnceLock;

/// League names (and common abbreviations) with their upstream league ids.
const LEAGUES: &[(&str, &str)] = &[
    ("premier league", "39"),
    ("epl", "39"),
    ("la liga", "140"),
    ("serie a", "135"),
    ("bundesliga", "78"),
    ("ligue 1", "61"),
    ("champions league", "2"),
    ("europa league", "3"),
    ("mls", "253"),
];

const FIXTURE_KEYWORDS: &[&str] = &[
    "fixture", "fixtures", "match", "matches", "game", "games", "schedule", "upcoming", "next",
];

const TEAM_KEYWORDS: &[&str] = &["team", "teams", "club", "clubs"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Upcoming fixtures of a league.
    Fixtures { league: String },
    /// All teams of a league for the configured season.
    LeagueTeams { league: String },
    /// Team name search.
    TeamSearch { term: String },
}

struct Matchers {
    leagues: Vec<(Regex, &'static str)>,
    fixtures: Regex,
    teams: Regex,
}

fn word_alternation(words: &[&str]) -> String {
    format!(r"(?i)\b(?:{})\b", words.join("|"))
}

fn matchers() -> &'static Matchers {
    static MATCHERS: OnceLock<Matchers> = OnceLock::new();
    MATCHERS.get_or_init(|| Matchers {
        leagues: LEAGUES
            .iter()
            .map(|(name, id)| {
                let pattern = format!(r"(?i)\b{}\b", name.replace(' ', r"\s+"));
                (Regex::new(&pattern).unwrap(), *id)
            })
            .collect(),
        fixtures: Regex::new(&word_alternation(FIXTURE_KEYWORDS)).unwrap(),
        teams: Regex::new(&word_alternation(TEAM_KEYWORDS)).unwrap(),
    })
}

/// League id mentioned in `query`, if any. First table entry wins.
pub fn league_in(query: &str) -> Option<&'static str> {
    matchers()
        .leagues
        .iter()
        .find(|(re, _)| re.is_match(query))
        .map(|(_, id)| *id)
}

pub fn classify(query: &str, default_league: &str) -> Intent {
    let m = matchers();
    let league = league_in(query);

    if m.fixtures.is_match(query) {
        return Intent::Fixtures {
            league: league.unwrap_or(default_league).to_string(),
        };
    }

    if let Some(league) = league {
        return Intent::LeagueTeams {
            league: league.to_string(),
        };
    }

    let term = m.teams.replace_all(query, " ");
    let term = term.split_whitespace().collect::<Vec<_>>().join(" ");
    if term.is_empty() {
        Intent::LeagueTeams {
            league: default_league.to_string(),
        }
    } else {
        Intent::TeamSearch { term }
    }
}
