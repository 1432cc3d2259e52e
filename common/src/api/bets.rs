use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ApiClient, ApiResult};
use crate::network::{Request, Transport};
use crate::{Bet, BetStatus, NewBet};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BetRecord<'a> {
    #[serde(flatten)]
    bet: &'a NewBet,
    created_at: DateTime<Utc>,
    status: BetStatus,
}

impl<T: Transport> ApiClient<T> {
    /// Records a bet as pending. Settlement happens elsewhere.
    pub async fn place_bet(&self, bet: &NewBet) -> ApiResult<Bet> {
        let record = BetRecord {
            bet,
            created_at: Utc::now(),
            status: BetStatus::Pending,
        };
        let placed: Bet = self
            .fetch(Request::post("bets", serde_json::to_value(&record)?))
            .await?;
        tracing::info!(id = %placed.id, amount = placed.amount, odds = placed.odds, "bet placed");
        Ok(placed)
    }

    pub async fn get_user_bets(&self, user_id: &str) -> ApiResult<Vec<Bet>> {
        self.fetch(Request::get("bets").with_query("userId", user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::FakeBackend;
    use super::*;
    use crate::config::ApiConfig;
    use crate::{BetType, MatchSnapshot};

    fn bet(user_id: &str) -> NewBet {
        NewBet {
            user_id: user_id.into(),
            match_id: "m1".into(),
            amount: 200.0,
            potential_win: 420.0,
            odds: 2.1,
            bet_type: BetType::WinA,
            sub_type: None,
            match_snapshot: MatchSnapshot {
                team_a: "Spartak".into(),
                team_b: "Zenit".into(),
                start_time: None,
            },
        }
    }

    #[tokio::test]
    async fn placed_bets_are_pending_and_listed_per_user() {
        let client = ApiClient::with_transport(FakeBackend::new(), ApiConfig::real("/api"));
        let placed = client.place_bet(&bet("u1")).await.unwrap();
        client.place_bet(&bet("u2")).await.unwrap();

        assert_eq!(placed.status, BetStatus::Pending);
        assert!(placed.created_at.is_some());
        assert_eq!(placed.bet_type, BetType::WinA);

        let sent = client.transport().records("bets");
        assert_eq!(sent[0]["type"], "WIN_A");
        assert_eq!(sent[0]["matchSnapshot"]["teamB"], "Zenit");

        let mine = client.get_user_bets("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, placed.id);
    }
}
