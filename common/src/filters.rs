//! Which sports the match list shows, and the query the list is fetched with.

use serde::Serialize;
use std::collections::HashSet;

use crate::{Match, MatchStatus};

const SPORT_NAMES: &[(&str, &str)] = &[
    ("FOOTBALL", "Football"),
    ("BASKETBALL", "Basketball"),
    ("HOCKEY", "Hockey"),
    ("TENNIS", "Tennis"),
    ("VOLLEYBALL", "Volleyball"),
    ("ESPORTS", "Esports"),
];

/// Human name for a sport code. Unknown codes are shown as they are.
pub fn sport_display_name(sport: &str) -> &str {
    SPORT_NAMES
        .iter()
        .find(|(code, _)| *code == sport)
        .map_or(sport, |(_, name)| *name)
}

/// Every sport code the client knows a name for.
pub fn known_sports() -> Vec<String> {
    SPORT_NAMES.iter().map(|(code, _)| code.to_string()).collect()
}

/// Selected sports, in the order they were picked. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SportFilter {
    selected: Vec<String>,
}

impl SportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, sport: &str) {
        match self.selected.iter().position(|selected| selected == sport) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(sport.to_owned()),
        }
    }

    pub fn set(&mut self, sports: Vec<String>) {
        self.selected = sports;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn selected_set(&self) -> HashSet<&str> {
        self.selected.iter().map(String::as_str).collect()
    }

    pub fn is_selected(&self, sport: &str) -> bool {
        self.selected.iter().any(|selected| selected == sport)
    }

    pub fn is_all_selected(&self) -> bool {
        self.selected.is_empty()
    }

    /// The sports of `catalogue` that pass the filter, in catalogue order.
    pub fn visible_sports<'a>(&self, catalogue: &'a [String]) -> Vec<&'a str> {
        let selected = self.selected_set();
        catalogue
            .iter()
            .map(String::as_str)
            .filter(|sport| selected.is_empty() || selected.contains(sport))
            .collect()
    }
}

/// Sport codes in order of first appearance among `matches`.
pub fn sports_of(matches: &[Match]) -> Vec<String> {
    let mut sports: Vec<String> = Vec::new();
    for game in matches {
        if !sports.contains(&game.sport_type) {
            sports.push(game.sport_type.clone());
        }
    }
    sports
}

/// Matches bucketed under each of `sports`, keeping the list order within a bucket.
pub fn group_by_sport<'a>(
    sports: &[&'a str],
    matches: &'a [Match],
) -> Vec<(&'a str, Vec<&'a Match>)> {
    sports
        .iter()
        .map(|sport| {
            let games = matches
                .iter()
                .filter(|game| game.sport_type == *sport)
                .collect();
            (*sport, games)
        })
        .collect()
}

/// Filters for `GET /matches`. Unset or empty entries are left out of the query.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub status: Option<MatchStatus>,
    pub sport_type: Option<String>,
    pub league: Option<String>,
}

impl MatchQuery {
    pub fn upcoming() -> Self {
        Self {
            status: Some(MatchStatus::Upcoming),
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let Ok(serde_json::Value::Object(entries)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(text) if !text.is_empty() => Some((key, text)),
                serde_json::Value::Number(number) => Some((key, number.to_string())),
                serde_json::Value::Bool(true) => Some((key, "true".to_owned())),
                _ => None,
            })
            .collect()
    }
}
