//! Picking a price off a match card and turning it into a bet.

use thiserror::Error;

use crate::{BetType, Match, MatchSnapshot, NewBet, Odds, UserData};

/// One clickable price on a match card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    WinA,
    Draw,
    WinB,
    HandicapA,
    HandicapB,
    Over,
    Under,
}

impl Market {
    pub fn label(&self) -> &'static str {
        match self {
            Market::WinA => "Win A",
            Market::Draw => "Draw",
            Market::WinB => "Win B",
            Market::HandicapA => "Handicap A",
            Market::HandicapB => "Handicap B",
            Market::Over => "Over",
            Market::Under => "Under",
        }
    }

    pub fn bet_type(&self) -> BetType {
        match self {
            Market::WinA => BetType::WinA,
            Market::Draw => BetType::Draw,
            Market::WinB => BetType::WinB,
            Market::HandicapA | Market::HandicapB => BetType::Handicap,
            Market::Over | Market::Under => BetType::Total,
        }
    }

    pub fn sub_type(&self) -> Option<&'static str> {
        match self {
            Market::HandicapA => Some("A"),
            Market::HandicapB => Some("B"),
            Market::Over => Some("OVER"),
            Market::Under => Some("UNDER"),
            _ => None,
        }
    }

    fn is_handicap(&self) -> bool {
        matches!(self, Market::HandicapA | Market::HandicapB)
    }

    fn is_total(&self) -> bool {
        matches!(self, Market::Over | Market::Under)
    }
}

/// The handicap and total lines currently shown on one match card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsSelector {
    pub handicap_line: f64,
    pub total_line: f64,
}

impl OddsSelector {
    /// Starts on the first line of each market, or 0 when a market has none.
    pub fn new(odds: &Odds) -> Self {
        Self {
            handicap_line: odds.handicap.first().map_or(0.0, |line| line.value),
            total_line: odds.total.first().map_or(0.0, |line| line.value),
        }
    }

    pub fn select_handicap(&mut self, line: f64) {
        self.handicap_line = line;
    }

    pub fn select_total(&mut self, line: f64) {
        self.total_line = line;
    }

    /// The price of `market` at the selected line. A line that is no longer
    /// offered falls back to the first one; a market without lines has no price.
    pub fn coef(&self, odds: &Odds, market: Market) -> Option<f64> {
        let coef = match market {
            Market::WinA => Some(odds.win_a),
            Market::Draw => Some(odds.draw),
            Market::WinB => Some(odds.win_b),
            Market::HandicapA | Market::HandicapB => {
                let line = odds
                    .handicap
                    .iter()
                    .find(|line| line.value == self.handicap_line)
                    .or_else(|| odds.handicap.first())?;
                Some(if market == Market::HandicapA {
                    line.odds_a
                } else {
                    line.odds_b
                })
            }
            Market::Over | Market::Under => {
                let line = odds
                    .total
                    .iter()
                    .find(|line| line.value == self.total_line)
                    .or_else(|| odds.total.first())?;
                Some(if market == Market::Over {
                    line.over
                } else {
                    line.under
                })
            }
        };
        coef.filter(|coef| *coef > 0.0)
    }

    /// Captures the price of `market` as it is right now.
    pub fn select(&self, odds: &Odds, market: Market) -> Option<BetSelection> {
        let coef = self.coef(odds, market)?;
        let line = if market.is_handicap() {
            Some(self.handicap_line)
        } else if market.is_total() {
            Some(self.total_line)
        } else {
            None
        };
        Some(BetSelection { market, coef, line })
    }
}

/// Handicap lines carry an explicit sign; totals do not.
pub fn format_line(value: f64, handicap: bool) -> String {
    if handicap && value > 0.0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

pub fn format_coef(coef: Option<f64>) -> String {
    match coef {
        Some(coef) if coef > 0.0 => format!("{coef:.2}"),
        _ => "-".to_owned(),
    }
}

/// A price the user clicked, waiting for a stake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetSelection {
    pub market: Market,
    pub coef: f64,
    pub line: Option<f64>,
}

impl BetSelection {
    pub fn title(&self, game: &Match) -> String {
        let mut pick = self.market.label().to_owned();
        if let Some(line) = self.line {
            pick.push(' ');
            pick.push_str(&format_line(line, self.market.is_handicap()));
        }
        format!(
            "\"{}\" {} vs. {} | {} (x{})",
            game.league, game.team_a, game.team_b, pick, self.coef
        )
    }

    pub fn potential_win(&self, amount: f64) -> f64 {
        (amount * self.coef * 100.0).round() / 100.0
    }

    pub fn to_new_bet(&self, user: &UserData, game: &Match, amount: f64) -> NewBet {
        let sub_type = self.market.sub_type().map(|side| match self.line {
            Some(line) => format!("{side} {}", format_line(line, self.market.is_handicap())),
            None => side.to_owned(),
        });
        NewBet {
            user_id: user.id.clone(),
            match_id: game.id.clone(),
            amount,
            potential_win: self.potential_win(amount),
            odds: self.coef,
            bet_type: self.market.bet_type(),
            sub_type,
            match_snapshot: MatchSnapshot::from(game),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BetError {
    #[error("User error. Try signing in again")]
    NotSignedIn,

    #[error("Insufficient funds")]
    InsufficientFunds,
}

/// Checks that run before a stake is sent anywhere.
pub fn check_bet(user: Option<&UserData>, amount: f64) -> Result<&UserData, BetError> {
    let user = user.ok_or(BetError::NotSignedIn)?;
    if user.balance < amount {
        return Err(BetError::InsufficientFunds);
    }
    Ok(user)
}
