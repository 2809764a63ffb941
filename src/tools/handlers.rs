//! Tool handlers: arguments in, upstream query out, summary text back.

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::json;

use super::intent::{self, Intent};
use super::{Arguments, ToolContext};
use crate::error::{ToolError, ToolResult};
use crate::upstream::project::{
    entries, top, Document, FixtureSummary, OddsSummary, SearchResult, TeamForm, TeamSummary,
};
use crate::upstream::UpstreamQuery;

fn render<T: Serialize + ?Sized>(value: &T) -> ToolResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn league(ctx: &ToolContext, args: &Arguments) -> String {
    args.get("league")
        .unwrap_or_else(|| ctx.config.default_league.clone())
}

fn season(ctx: &ToolContext, args: &Arguments) -> String {
    args.get("season")
        .unwrap_or_else(|| ctx.config.default_season.to_string())
}

fn count(args: &Arguments, key: &str, default: usize) -> ToolResult<usize> {
    match args.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ToolError::InvalidArgument {
                name: key.to_string(),
                reason: format!("expected a positive integer, got '{raw}'"),
            }),
    }
}

pub fn search_teams<'a>(ctx: &'a ToolContext, args: &'a Arguments) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let query = args.require("query")?;
        let response = ctx
            .upstream
            .get(&UpstreamQuery::new("/teams").param("search", query))
            .await?;

        let teams: Vec<TeamSummary> = top(response, ctx.config.result_limit)
            .iter()
            .map(TeamSummary::from_entry)
            .collect();
        render(&teams)
    }
    .boxed()
}

pub fn get_upcoming_fixtures<'a>(
    ctx: &'a ToolContext,
    args: &'a Arguments,
) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let next = count(args, "next", ctx.config.result_limit)?;
        let query = UpstreamQuery::new("/fixtures")
            .param("league", league(ctx, args))
            .param_opt("team", args.get("team"))
            .param_opt("season", args.get("season"))
            .param("next", next.to_string());
        let response = ctx.upstream.get(&query).await?;

        let fixtures: Vec<FixtureSummary> = top(response, next)
            .iter()
            .map(FixtureSummary::from_entry)
            .collect();
        render(&fixtures)
    }
    .boxed()
}

pub fn get_team_form<'a>(ctx: &'a ToolContext, args: &'a Arguments) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let query = UpstreamQuery::new("/teams/statistics")
            .param("team", args.require("team")?)
            .param("league", league(ctx, args))
            .param("season", season(ctx, args));
        let response = ctx.upstream.get(&query).await?;

        let form: Vec<TeamForm> = entries(response).iter().map(TeamForm::from_entry).collect();
        render(&form)
    }
    .boxed()
}

pub fn get_odds<'a>(ctx: &'a ToolContext, args: &'a Arguments) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let query = match args.get("fixture") {
            Some(fixture) => UpstreamQuery::new("/odds").param("fixture", fixture),
            None => UpstreamQuery::new("/odds")
                .param("league", league(ctx, args))
                .param("season", season(ctx, args)),
        };
        let response = ctx.upstream.get(&query).await?;

        let bet = args.get("bet");
        let odds: Vec<OddsSummary> = top(response, ctx.config.result_limit)
            .iter()
            .map(|entry| OddsSummary::from_entry(entry, bet.as_deref()))
            .collect();
        render(&odds)
    }
    .boxed()
}

pub fn search<'a>(ctx: &'a ToolContext, args: &'a Arguments) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let text = args.require("query")?;
        let intent = intent::classify(&text, &ctx.config.default_league);
        tracing::debug!(query = %text, ?intent, "classified search");

        let limit = ctx.config.search_limit;
        let results: Vec<SearchResult> = match intent {
            Intent::Fixtures { league } => {
                let query = UpstreamQuery::new("/fixtures")
                    .param("league", league)
                    .param("next", limit.to_string());
                top(ctx.upstream.get(&query).await?, limit)
                    .iter()
                    .map(SearchResult::fixture)
                    .collect()
            }
            Intent::LeagueTeams { league } => {
                let query = UpstreamQuery::new("/teams")
                    .param("league", league)
                    .param("season", ctx.config.default_season.to_string());
                top(ctx.upstream.get(&query).await?, limit)
                    .iter()
                    .map(SearchResult::team)
                    .collect()
            }
            Intent::TeamSearch { term } => {
                let query = UpstreamQuery::new("/teams").param("search", term);
                top(ctx.upstream.get(&query).await?, limit)
                    .iter()
                    .map(SearchResult::team)
                    .collect()
            }
        };

        render(&json!({ "results": results }))
    }
    .boxed()
}

/// Split a `team:<n>` / `fixture:<n>` document id into endpoint and numeric id.
fn parse_document_id(id: &str) -> ToolResult<(&'static str, &str)> {
    let invalid = |reason: &str| ToolError::InvalidArgument {
        name: "id".to_string(),
        reason: reason.to_string(),
    };

    let (kind, number) = id
        .split_once(':')
        .ok_or_else(|| invalid("expected 'team:<id>' or 'fixture:<id>'"))?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("document id must end in a numeric id"));
    }

    match kind {
        "team" => Ok(("/teams", number)),
        "fixture" => Ok(("/fixtures", number)),
        _ => Err(invalid("unknown document kind, expected 'team' or 'fixture'")),
    }
}

pub fn fetch<'a>(ctx: &'a ToolContext, args: &'a Arguments) -> BoxFuture<'a, ToolResult<String>> {
    async move {
        let id = args.require("id")?;
        let (path, number) = parse_document_id(&id)?;
        let response = ctx
            .upstream
            .get(&UpstreamQuery::new(path).param("id", number))
            .await?;

        let entry = entries(response)
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::DocumentNotFound(id.clone()))?;
        let result = if path == "/teams" {
            SearchResult::team(&entry)
        } else {
            SearchResult::fixture(&entry)
        };
        render(&Document::from_search(result, entry))
    }
    .boxed()
}
