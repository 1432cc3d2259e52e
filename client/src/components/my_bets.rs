use chrono::{DateTime, Local, Utc};
use common::api::ApiResult;
use common::{Bet, BetStatus, BetType};
use yew::prelude::*;

use crate::nav::{use_navigator, Page};
use crate::services::{run, use_alive, use_api, use_notifications};
use crate::session::use_session;

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|time| time.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_default()
}

fn pick_label(bet: &Bet) -> String {
    let market = match bet.bet_type {
        BetType::WinA => "Win A",
        BetType::Draw => "Draw",
        BetType::WinB => "Win B",
        BetType::Handicap => "Handicap",
        BetType::Total => "Total",
    };
    match &bet.sub_type {
        Some(sub_type) => format!("{market} {sub_type}"),
        None => market.to_owned(),
    }
}

fn status_label(status: BetStatus) -> (&'static str, &'static str) {
    match status {
        BetStatus::Pending => ("Pending", "bet-pending"),
        BetStatus::Won => ("Won", "bet-won"),
        BetStatus::Lost => ("Lost", "bet-lost"),
        BetStatus::Canceled => ("Canceled", "bet-canceled"),
    }
}

/// The signed-in user's bets, newest first.
#[function_component]
pub fn MyBetsPage() -> Html {
    let api = use_api();
    let session = use_session();
    let notifications = use_notifications();
    let navigator = use_navigator();
    let alive = use_alive();
    let bets = use_state(|| None::<Vec<Bet>>);
    let user_id = session.0.user().map(|user| user.id.clone());

    {
        let bets = bets.clone();
        use_effect_with(user_id.clone(), move |user_id| {
            if let Some(user_id) = user_id.clone() {
                run(
                    &alive,
                    async move { api.get_user_bets(&user_id).await },
                    Callback::from(move |outcome: ApiResult<Vec<Bet>>| match outcome {
                        Ok(mut loaded) => {
                            loaded.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                            bets.set(Some(loaded));
                        }
                        Err(err) => {
                            tracing::error!(code = err.code(), "loading bets failed: {err}");
                            notifications.error(err.user_message());
                            bets.set(Some(Vec::new()));
                        }
                    }),
                );
            }
        });
    }

    if user_id.is_none() {
        return html! {
            <div class="my-bets-page">
                <p>{ "Sign in to see your bets" }</p>
                <button type="button" class="button-primary" onclick={navigator.to(Page::Login)}>
                    { Page::Login.title() }
                </button>
            </div>
        };
    }

    let body = match &*bets {
        None => html! { <div class="spinner" aria-busy="true" /> },
        Some(list) if list.is_empty() => html! { <p class="empty">{ "No bets yet" }</p> },
        Some(list) => html! {
            <table class="bets-table">
                <thead>
                    <tr>
                        <th>{ "Placed" }</th>
                        <th>{ "Match" }</th>
                        <th>{ "Pick" }</th>
                        <th>{ "Odds" }</th>
                        <th>{ "Stake" }</th>
                        <th>{ "Potential win" }</th>
                        <th>{ "Status" }</th>
                    </tr>
                </thead>
                <tbody>
                    { for list.iter().map(|bet| {
                        let (status, class) = status_label(bet.status);
                        html! {
                            <tr key={bet.id.clone()}>
                                <td>{ format_time(bet.created_at) }</td>
                                <td>
                                    { format!("{} vs. {}", bet.match_snapshot.team_a, bet.match_snapshot.team_b) }
                                    <div class="muted">{ format_time(bet.match_snapshot.start_time) }</div>
                                </td>
                                <td>{ pick_label(bet) }</td>
                                <td>{ format!("{:.2}", bet.odds) }</td>
                                <td>{ bet.amount }</td>
                                <td>{ bet.potential_win }</td>
                                <td class={class}>{ status }</td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        },
    };

    html! {
        <div class="my-bets-page">
            <h2>{ Page::MyBets.title() }</h2>
            { body }
        </div>
    }
}
