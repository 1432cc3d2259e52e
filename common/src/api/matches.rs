use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::{ApiClient, ApiResult};
use crate::filters::MatchQuery;
use crate::network::{Request, Transport};
use crate::{Match, MatchStatus, NewMatch, Odds};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchRecord<'a> {
    #[serde(flatten)]
    new_match: &'a NewMatch,
    start_time: DateTime<Utc>,
    status: MatchStatus,
    score_a: Option<u32>,
    score_b: Option<u32>,
}

impl<T: Transport> ApiClient<T> {
    pub async fn get_matches(&self, query: &MatchQuery) -> ApiResult<Vec<Match>> {
        self.fetch(Request::get("matches").with_query_pairs(query.to_query_pairs()))
            .await
    }

    pub async fn get_match(&self, match_id: &str) -> ApiResult<Match> {
        self.fetch(Request::get(format!("matches/{match_id}"))).await
    }

    /// Publishes a match as upcoming, starting now, with no score yet.
    pub async fn create_match(&self, new_match: &NewMatch) -> ApiResult<Match> {
        let record = MatchRecord {
            new_match,
            start_time: Utc::now(),
            status: MatchStatus::Upcoming,
            score_a: None,
            score_b: None,
        };
        let created: Match = self
            .fetch(Request::post("matches", serde_json::to_value(&record)?))
            .await?;
        tracing::info!(id = %created.id, "{} vs {} created", created.team_a, created.team_b);
        Ok(created)
    }

    pub async fn update_match_odds(&self, match_id: &str, odds: &Odds) -> ApiResult<Match> {
        self.fetch(Request::patch(
            format!("matches/{match_id}"),
            json!({ "odds": odds }),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::FakeBackend;
    use super::*;
    use crate::config::ApiConfig;
    use crate::network::Method;
    use crate::Total;

    fn client() -> ApiClient<FakeBackend> {
        let backend = FakeBackend::new();
        for (id, sport, status) in [
            ("1", "FOOTBALL", "UPCOMING"),
            ("2", "HOCKEY", "UPCOMING"),
            ("3", "FOOTBALL", "FINISHED"),
        ] {
            backend.seed(
                "matches",
                json!({
                    "id": id,
                    "teamA": "A",
                    "teamB": "B",
                    "sportType": sport,
                    "league": "League",
                    "status": status,
                    "odds": { "winA": 2.0, "draw": 3.0, "winB": 4.0 }
                }),
            );
        }
        ApiClient::with_transport(backend, ApiConfig::real("/api"))
    }

    fn new_match() -> NewMatch {
        NewMatch {
            team_a: "Spartak".into(),
            team_b: "Zenit".into(),
            sport_type: "FOOTBALL".into(),
            league: "RPL".into(),
            odds: Odds {
                win_a: 2.1,
                draw: 3.3,
                win_b: 3.6,
                ..Odds::default()
            },
        }
    }

    #[tokio::test]
    async fn match_filters_become_query_parameters() {
        let client = client();
        let upcoming = client.get_matches(&MatchQuery::upcoming()).await.unwrap();
        assert_eq!(upcoming.len(), 2);

        let query = MatchQuery {
            sport_type: Some("FOOTBALL".into()),
            ..MatchQuery::upcoming()
        };
        let football = client.get_matches(&query).await.unwrap();
        assert_eq!(football.len(), 1);
        assert_eq!(football[0].id, "1");

        let everything = client.get_matches(&MatchQuery::default()).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert!(client.transport().requests()[2].query.is_empty());
    }

    #[tokio::test]
    async fn created_matches_are_stamped_upcoming() {
        let client = client();
        let created = client.create_match(&new_match()).await.unwrap();
        assert_eq!(created.status, MatchStatus::Upcoming);
        assert_eq!(created.score_a, None);
        assert!(created.start_time.is_some());

        let sent = client.transport().requests().pop().unwrap().body.unwrap();
        assert_eq!(sent["teamA"], "Spartak");
        assert_eq!(sent["status"], "UPCOMING");
        assert!(sent["scoreB"].is_null());
        assert!(sent.get("scoreB").is_some());
    }

    #[tokio::test]
    async fn odds_updates_patch_only_the_odds() {
        let client = client();
        let odds = Odds {
            total: vec![Total {
                value: 5.5,
                over: 1.9,
                under: 1.9,
            }],
            ..Odds::default()
        };
        let updated = client.update_match_odds("2", &odds).await.unwrap();
        assert_eq!(updated.odds.total[0].value, 5.5);
        assert_eq!(updated.sport_type, "HOCKEY");

        let request = client.transport().requests().pop().unwrap();
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "matches/2");
    }

    #[tokio::test]
    async fn single_match_lookup() {
        let game = client().get_match("3").await.unwrap();
        assert_eq!(game.status, MatchStatus::Finished);
    }
}
