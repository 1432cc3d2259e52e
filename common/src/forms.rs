//! The storefront's concrete forms and the conversions from their submitted
//! values into request types.

use regex::Regex;
use std::sync::LazyLock;

use crate::filters::sport_display_name;
use crate::form::validation::parse_number;
use crate::form::{FieldKind, FieldSchema, FormError, FormValue, SelectOption};
use crate::{Handicap, LoginRequest, NewMatch, Odds, RegisterRequest, Total};

pub const MIN_BET: f64 = 100.0;
pub const MIN_COEF: f64 = 1.0;
const MIN_PASSWORD_LENGTH: usize = 6;

static LOGIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("login pattern is valid"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

fn coef(name: &str, label: &str) -> FieldSchema {
    FieldSchema::new(name, label, FieldKind::Number)
        .required()
        .min(MIN_COEF)
}

fn line(label: &str) -> FieldSchema {
    FieldSchema::new("value", label, FieldKind::Number).required()
}

pub fn create_match_fields(sport_types: &[String]) -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("league", "League", FieldKind::Text).required(),
        FieldSchema::new("teamA", "Team A", FieldKind::Text).required(),
        FieldSchema::new("teamB", "Team B", FieldKind::Text).required(),
        FieldSchema::new("sportType", "Sport", FieldKind::Autocomplete)
            .required()
            .strict_match()
            .options(
                sport_types
                    .iter()
                    .map(|sport| SelectOption::new(sport, sport_display_name(sport))),
            ),
        FieldSchema::new("odds", "Odds", FieldKind::Object)
            .required()
            .fields(vec![
                coef("winA", "Team A wins"),
                coef("draw", "Draw"),
                coef("winB", "Team B wins"),
                FieldSchema::new("handicap", "Handicaps", FieldKind::Array)
                    .array_item_label("Handicap")
                    .fields(vec![
                        line("Line"),
                        coef("oddsA", "Team A odds"),
                        coef("oddsB", "Team B odds"),
                    ]),
                FieldSchema::new("total", "Totals", FieldKind::Array)
                    .array_item_label("Total")
                    .fields(vec![
                        line("Line"),
                        coef("over", "Over odds"),
                        coef("under", "Under odds"),
                    ]),
            ]),
    ]
}

pub fn bet_amount_fields() -> Vec<FieldSchema> {
    vec![FieldSchema::new("amount", "Stake", FieldKind::Number)
        .required()
        .min(MIN_BET)]
}

pub fn top_up_fields() -> Vec<FieldSchema> {
    vec![FieldSchema::new("amount", "Top-up amount", FieldKind::Number)
        .required()
        .min(1.0)]
}

pub fn change_login_fields() -> Vec<FieldSchema> {
    vec![login_field()]
}

pub fn change_email_fields() -> Vec<FieldSchema> {
    vec![email_field()]
}

pub fn change_password_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("currentPassword", "Current password", FieldKind::Password).required(),
        FieldSchema::new("newPassword", "New password", FieldKind::Password)
            .required()
            .min_length(MIN_PASSWORD_LENGTH),
        FieldSchema::new("confirmPassword", "Repeat new password", FieldKind::Password)
            .required(),
    ]
}

pub fn register_fields() -> Vec<FieldSchema> {
    vec![
        login_field(),
        email_field(),
        FieldSchema::new("password", "Password", FieldKind::Password)
            .required()
            .min_length(MIN_PASSWORD_LENGTH),
        FieldSchema::new("confirmPassword", "Repeat password", FieldKind::Password).required(),
    ]
}

pub fn login_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema::new("email", "Email", FieldKind::Email).required(),
        FieldSchema::new("password", "Password", FieldKind::Password).required(),
    ]
}

fn login_field() -> FieldSchema {
    FieldSchema::new("login", "Login", FieldKind::Text)
        .required()
        .min_length(3)
        .pattern(LOGIN_PATTERN.clone())
}

fn email_field() -> FieldSchema {
    FieldSchema::new("email", "Email", FieldKind::Email)
        .required()
        .pattern(EMAIL_PATTERN.clone())
}

pub fn text(values: &FormValue, name: &str) -> Result<String, FormError> {
    match values.get(name) {
        Some(FormValue::Text(text)) => Ok(text.trim().to_owned()),
        Some(FormValue::Number(number)) => Ok(number.to_string()),
        _ => Err(FormError::MissingField(name.to_owned())),
    }
}

/// Reads a password exactly as typed.
pub fn password(values: &FormValue, name: &str) -> Result<String, FormError> {
    match values.get(name) {
        Some(FormValue::Text(text)) => Ok(text.to_string()),
        _ => Err(FormError::MissingField(name.to_owned())),
    }
}

pub fn number(values: &FormValue, name: &str) -> Result<f64, FormError> {
    let value = values
        .get(name)
        .ok_or_else(|| FormError::MissingField(name.to_owned()))?;
    parse_number(value).ok_or_else(|| FormError::InvalidNumber {
        field: name.to_owned(),
        value: value.to_input_string(),
    })
}

fn items<'a>(values: &'a FormValue, name: &str) -> &'a [FormValue] {
    values
        .get(name)
        .and_then(FormValue::as_list)
        .unwrap_or_default()
}

/// Two password fields that must agree.
pub fn confirmed_password(
    values: &FormValue,
    password: &str,
    confirmation: &str,
) -> Result<String, FormError> {
    let first = self::password(values, password)?;
    if first != self::password(values, confirmation)? {
        return Err(FormError::PasswordMismatch);
    }
    Ok(first)
}

impl NewMatch {
    pub fn from_form(values: &FormValue) -> Result<Self, FormError> {
        let odds = values
            .get("odds")
            .ok_or_else(|| FormError::MissingField("odds".into()))?;

        let handicap = items(odds, "handicap")
            .iter()
            .map(|item| {
                Ok(Handicap {
                    value: number(item, "value")?,
                    odds_a: number(item, "oddsA")?,
                    odds_b: number(item, "oddsB")?,
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        let total = items(odds, "total")
            .iter()
            .map(|item| {
                Ok(Total {
                    value: number(item, "value")?,
                    over: number(item, "over")?,
                    under: number(item, "under")?,
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        Ok(Self {
            league: text(values, "league")?,
            team_a: text(values, "teamA")?,
            team_b: text(values, "teamB")?,
            sport_type: text(values, "sportType")?,
            odds: Odds {
                win_a: number(odds, "winA")?,
                draw: number(odds, "draw")?,
                win_b: number(odds, "winB")?,
                handicap,
                total,
            },
        })
    }
}

impl RegisterRequest {
    pub fn from_form(values: &FormValue) -> Result<Self, FormError> {
        Ok(Self {
            login: text(values, "login")?,
            email: text(values, "email")?,
            password: confirmed_password(values, "password", "confirmPassword")?,
        })
    }
}

impl LoginRequest {
    pub fn from_form(values: &FormValue) -> Result<Self, FormError> {
        Ok(Self {
            email: text(values, "email")?,
            password: password(values, "password")?,
        })
    }
}
