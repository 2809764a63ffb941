//! Declarative tool registry: name, input schema and handler for every tool.

pub mod handlers;
pub mod intent;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::UpstreamConfig;
use crate::error::{ToolError, ToolResult};
use crate::upstream::UpstreamClient;

pub const SEARCH_TEAMS: &str = "search_teams";
pub const GET_UPCOMING_FIXTURES: &str = "get_upcoming_fixtures";
pub const GET_TEAM_FORM: &str = "get_team_form";
pub const GET_ODDS: &str = "get_odds";
pub const SEARCH: &str = "search";
pub const FETCH: &str = "fetch";

/// Every tool the server knows how to serve, in listing order.
pub const KNOWN_TOOLS: &[&str] = &[
    SEARCH_TEAMS,
    GET_UPCOMING_FIXTURES,
    GET_TEAM_FORM,
    GET_ODDS,
    SEARCH,
    FETCH,
];

/// Tool metadata as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Names listed under the schema's `required` key.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

/// Tool arguments. Values may be strings or numbers.
#[derive(Debug, Clone, Default)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn from_value(value: Option<Value>) -> ToolResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Ok(Self(map)),
            Some(_) => Err(ToolError::InvalidArgument {
                name: "arguments".to_string(),
                reason: "must be an object".to_string(),
            }),
        }
    }

    /// String form of an argument. Numbers render as decimals; empty strings count as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn require(&self, key: &str) -> ToolResult<String> {
        self.get(key)
            .ok_or_else(|| ToolError::MissingArgument(key.to_string()))
    }
}

/// What handlers get to work with.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub upstream: UpstreamClient,
    pub config: UpstreamConfig,
}

impl ToolContext {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(&config),
            config,
        }
    }
}

/// Runs one tool call and produces the text payload.
pub type Handler = for<'a> fn(&'a ToolContext, &'a Arguments) -> BoxFuture<'a, ToolResult<String>>;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Handler,
}

/// Immutable after construction, so the listing is identical for the process lifetime.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    context: ToolContext,
}

impl ToolRegistry {
    /// Registry exposing the `enabled` subset of the catalog, in catalog order.
    pub fn new(enabled: &[String], context: ToolContext) -> Self {
        let tools = catalog()
            .into_iter()
            .filter(|t| enabled.iter().any(|name| name == t.descriptor.name))
            .collect();
        Self { tools, context }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.descriptor.name).collect()
    }

    /// The `{"tools": [...]}` manifest.
    pub fn manifest(&self) -> Value {
        json!({ "tools": self.descriptors() })
    }

    pub async fn call(&self, name: &str, arguments: &Arguments) -> ToolResult<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.descriptor.name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        if let Some(missing) = tool
            .descriptor
            .required()
            .find(|key| arguments.get(key).is_none())
        {
            return Err(ToolError::MissingArgument(missing.to_string()));
        }

        (tool.handler)(&self.context, arguments).await
    }
}

fn catalog() -> Vec<RegisteredTool> {
    vec![
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: SEARCH_TEAMS,
                description: "Search football teams by name. Returns id, country, founding year and venue for each match.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Team name or part of it (at least 3 characters)"}
                    },
                    "required": ["query"]
                }),
            },
            handler: handlers::search_teams,
        },
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: GET_UPCOMING_FIXTURES,
                description: "List upcoming fixtures for a league, optionally restricted to one team.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "team": {"type": ["string", "number"], "description": "Team id"},
                        "league": {"type": ["string", "number"], "description": "League id (default 39, Premier League)"},
                        "season": {"type": ["string", "number"], "description": "Season year, e.g. 2024"},
                        "next": {"type": ["string", "number"], "description": "Number of fixtures to return"}
                    }
                }),
            },
            handler: handlers::get_upcoming_fixtures,
        },
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: GET_TEAM_FORM,
                description: "Recent form and season totals (wins, draws, losses, goals) for a team in a league.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "team": {"type": ["string", "number"], "description": "Team id"},
                        "league": {"type": ["string", "number"], "description": "League id (default 39, Premier League)"},
                        "season": {"type": ["string", "number"], "description": "Season year, e.g. 2024"}
                    },
                    "required": ["team"]
                }),
            },
            handler: handlers::get_team_form,
        },
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: GET_ODDS,
                description: "Pre-match betting odds for a fixture, or for a league's fixtures when no fixture is given.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "fixture": {"type": ["string", "number"], "description": "Fixture id"},
                        "league": {"type": ["string", "number"], "description": "League id (default 39, Premier League)"},
                        "season": {"type": ["string", "number"], "description": "Season year, e.g. 2024"},
                        "bet": {"type": "string", "description": "Market name, e.g. \"Match Winner\""}
                    }
                }),
            },
            handler: handlers::get_odds,
        },
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: SEARCH,
                description: "Free-text football search. Mentions of fixtures or matches return upcoming games, league names select the league, anything else searches team names.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Search query, e.g. \"upcoming la liga matches\""}
                    },
                    "required": ["query"]
                }),
            },
            handler: handlers::search,
        },
        RegisteredTool {
            descriptor: ToolDescriptor {
                name: FETCH,
                description: "Fetch the full record for an id returned by search (\"team:<id>\" or \"fixture:<id>\").",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "string", "description": "Document id from search results"}
                    },
                    "required": ["id"]
                }),
            },
            handler: handlers::fetch,
        },
    ]
}
