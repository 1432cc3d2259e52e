use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod api;
pub mod config;
pub mod filters;
pub mod form;
pub mod forms;
pub mod network;
pub mod notify;
pub mod odds;
pub mod roles;
pub mod session;

// json-server hands out numeric ids for seeded records and string ids for created ones
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
    Support,
    #[default]
    None,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
            UserRole::Support => "SUPPORT",
            UserRole::None => "NONE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::User => "User",
            UserRole::Admin => "Administrator",
            UserRole::Support => "Support",
            UserRole::None => "",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    #[default]
    Active,
    Blocked,
}

impl UserStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Blocked => "Blocked",
        }
    }
}

/// A user record as the client keeps it: everything but the password.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub login: String,
    pub email: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// A user about to be created. The server assigns the id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub password: String,
    pub balance: f64,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn register(request: &RegisterRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            login: request.login.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            balance: 0.0,
            role: UserRole::User,
            status: UserStatus::Active,
            created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    #[default]
    Upcoming,
    Live,
    Finished,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "UPCOMING",
            MatchStatus::Live => "LIVE",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Handicap {
    pub value: f64,
    pub odds_a: f64,
    pub odds_b: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Total {
    pub value: f64,
    pub over: f64,
    pub under: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    pub win_a: f64,
    pub draw: f64,
    pub win_b: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub handicap: Vec<Handicap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub total: Vec<Total>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub team_a: String,
    pub team_b: String,
    pub sport_type: String,
    pub league: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub score_a: Option<u32>,
    #[serde(default)]
    pub score_b: Option<u32>,
    pub odds: Odds,
}

// A match as entered by an administrator, before the client stamps it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub team_a: String,
    pub team_b: String,
    pub sport_type: String,
    pub league: String,
    pub odds: Odds,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetStatus {
    #[default]
    Pending,
    Won,
    Lost,
    Canceled,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetType {
    WinA,
    Draw,
    WinB,
    Handicap,
    Total,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub team_a: String,
    pub team_b: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl From<&Match> for MatchSnapshot {
    fn from(value: &Match) -> Self {
        Self {
            team_a: value.team_a.clone(),
            team_b: value.team_b.clone(),
            start_time: value.start_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBet {
    pub user_id: String,
    pub match_id: String,
    pub amount: f64,
    pub potential_win: f64,
    pub odds: f64,
    #[serde(rename = "type")]
    pub bet_type: BetType,
    pub sub_type: Option<String>,
    pub match_snapshot: MatchSnapshot,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub match_id: String,
    pub amount: f64,
    pub potential_win: f64,
    #[serde(default)]
    pub status: BetStatus,
    pub odds: f64,
    #[serde(rename = "type")]
    pub bet_type: BetType,
    #[serde(default)]
    pub sub_type: Option<String>,
    pub match_snapshot: MatchSnapshot,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_data_drops_password_and_accepts_numeric_id() {
        let user: UserData = serde_json::from_value(json!({
            "id": 7,
            "login": "aidan",
            "email": "aidan@example.com",
            "password": "hunter22",
            "balance": 2000,
            "role": "ADMIN",
            "status": "ACTIVE",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.balance, 2000.0);
        let stored = serde_json::to_value(&user).unwrap();
        assert!(stored.get("password").is_none());
    }

    #[test]
    fn match_uses_camel_case_wire_names() {
        let game: Match = serde_json::from_value(json!({
            "id": "m1",
            "teamA": "Spartak",
            "teamB": "Zenit",
            "sportType": "FOOTBALL",
            "league": "RPL",
            "startTime": "2024-05-01T18:00:00Z",
            "status": "UPCOMING",
            "scoreA": null,
            "scoreB": null,
            "odds": {
                "winA": 2.1, "draw": 3.2, "winB": 3.5,
                "handicap": [{ "value": -1.5, "oddsA": 3.1, "oddsB": 1.4 }]
            }
        }))
        .unwrap();

        assert_eq!(game.team_a, "Spartak");
        assert_eq!(game.odds.handicap[0].odds_b, 1.4);
        assert!(game.odds.total.is_empty());
        assert_eq!(game.score_a, None);
    }

    #[test]
    fn bet_type_serializes_in_screaming_case() {
        assert_eq!(serde_json::to_value(BetType::WinA).unwrap(), json!("WIN_A"));
        assert_eq!(serde_json::to_value(BetType::Total).unwrap(), json!("TOTAL"));
    }

    #[test]
    fn registration_starts_with_an_empty_active_wallet() {
        let request = RegisterRequest {
            login: "new_user".into(),
            email: "new@example.com".into(),
            password: "secret1".into(),
        };
        let user = NewUser::register(&request, Utc::now());

        assert_eq!(user.balance, 0.0);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, UserStatus::Active);
        let body = serde_json::to_value(&user).unwrap();
        assert_eq!(body["role"], json!("USER"));
        assert!(body.get("createdAt").is_some());
    }
}
