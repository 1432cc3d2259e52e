use std::rc::Rc;

use common::api::ApiResult;
use common::form::FormValue;
use common::forms::{bet_amount_fields, number};
use common::odds::{check_bet, format_coef, format_line, BetSelection, Market, OddsSelector};
use common::{Bet, Match};
use yew::prelude::*;

use crate::components::form::FormView;
use crate::components::modal::{use_modal, Modal};
use crate::services::{run, use_alive, use_api, use_notifications};
use crate::session::use_session;

#[derive(Properties, PartialEq)]
pub struct CoefBoxProps {
    #[prop_or_default]
    pub coef: Option<f64>,
    #[prop_or_default]
    pub onclick: Callback<()>,
    #[prop_or_default]
    pub selected: bool,
}

#[function_component]
pub fn CoefBox(props: &CoefBoxProps) -> Html {
    let available = props.coef.is_some_and(|coef| coef > 0.0);
    html! {
        <button type="button"
            class={classes!("coef-box", props.selected.then_some("coef-box-selected"))}
            disabled={!available}
            onclick={props.onclick.reform(|_: MouseEvent| ())}>
            { format_coef(props.coef) }
        </button>
    }
}

#[function_component]
fn CoefBoxPlug() -> Html {
    html! {
        <div class="coef-row">
            <CoefBox />
            <CoefBox />
            <CoefBox />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct LineSelectorProps {
    /// `(line, left price, right price)` per offered line.
    lines: Vec<(f64, f64, f64)>,
    current: f64,
    handicap: bool,
    on_change: Callback<f64>,
}

/// Reads a line back from the value of its `<option>`.
fn parse_line(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|line| line.is_finite())
}

#[function_component]
fn LineSelector(props: &LineSelectorProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            match parse_line(&select.value()) {
                Some(line) => on_change.emit(line),
                None => tracing::debug!(value = %select.value(), "ignoring unknown line"),
            }
        })
    };
    html! {
        <select class="line-selector" {onchange}>
            { for props.lines.iter().map(|(line, left, right)| html! {
                <option value={line.to_string()} selected={*line == props.current}>
                    { format!("{:.2}  {}  {:.2}", left, format_line(*line, props.handicap), right) }
                </option>
            }) }
        </select>
    }
}

#[derive(Properties, PartialEq)]
pub struct CoefsListProps {
    pub game: Rc<Match>,
}

/// One match row: the 1X2 prices, then handicap and total with their line pickers.
#[function_component]
pub fn CoefsList(props: &CoefsListProps) -> Html {
    let api = use_api();
    let session = use_session();
    let notifications = use_notifications();
    let alive = use_alive();
    let selector = use_state(|| OddsSelector::new(&props.game.odds));
    let selection = use_state(|| None::<BetSelection>);
    let loading = use_state(|| false);
    let bet_modal = use_modal();
    let fields = use_memo((), |_| Rc::new(bet_amount_fields()));

    let odds = &props.game.odds;
    let pick = |market: Market| {
        let game = props.game.clone();
        let selector = selector.clone();
        let selection = selection.clone();
        let bet_modal = bet_modal.clone();
        Callback::from(move |_: ()| {
            if let Some(chosen) = selector.select(&game.odds, market) {
                selection.set(Some(chosen));
                bet_modal.open();
            }
        })
    };
    let coef_box = |market: Market| {
        let coef = selector.coef(odds, market);
        let selected = bet_modal.is_open() && (*selection).is_some_and(|chosen| chosen.market == market);
        html! { <CoefBox {coef} onclick={pick(market)} {selected} /> }
    };

    let on_handicap = {
        let selector = selector.clone();
        Callback::from(move |line: f64| {
            let mut next = *selector;
            next.select_handicap(line);
            selector.set(next);
        })
    };
    let on_total = {
        let selector = selector.clone();
        Callback::from(move |line: f64| {
            let mut next = *selector;
            next.select_total(line);
            selector.set(next);
        })
    };

    let on_submit = {
        let game = props.game.clone();
        let selection = selection.clone();
        let bet_modal = bet_modal.clone();
        let loading = loading.clone();
        Callback::from(move |values: FormValue| {
            let Some(chosen) = *selection else {
                return;
            };
            let amount = match number(&values, "amount") {
                Ok(amount) => amount,
                Err(err) => {
                    bet_modal.set_error(err.to_string());
                    return;
                }
            };
            let user = match check_bet(session.0.user(), amount) {
                Ok(user) => user,
                Err(err) => {
                    bet_modal.set_error(err.to_string());
                    return;
                }
            };

            let bet = chosen.to_new_bet(user, &game, amount);
            tracing::info!(match_id = %bet.match_id, amount, odds = bet.odds, "placing bet");
            loading.set(true);
            let api = api.clone();
            let notifications = notifications.clone();
            let bet_modal = bet_modal.clone();
            let loading = loading.clone();
            run(
                &alive,
                async move { api.place_bet(&bet).await },
                Callback::from(move |outcome: ApiResult<Bet>| {
                    loading.set(false);
                    match outcome {
                        Ok(bet) => {
                            notifications.success(format!(
                                "Bet placed. Potential win: {}",
                                bet.potential_win
                            ));
                            bet_modal.close();
                        }
                        Err(err) => {
                            tracing::warn!(code = err.code(), "placing bet failed: {err}");
                            bet_modal.set_error(err.user_message());
                        }
                    }
                }),
            );
        })
    };

    let handicap = if odds.handicap.is_empty() {
        html! { <CoefBoxPlug /> }
    } else {
        let lines = odds.handicap.iter().map(|line| (line.value, line.odds_a, line.odds_b)).collect::<Vec<_>>();
        html! {
            <div class="coef-row">
                { coef_box(Market::HandicapA) }
                <LineSelector {lines} current={selector.handicap_line} handicap={true} on_change={on_handicap} />
                { coef_box(Market::HandicapB) }
            </div>
        }
    };
    let total = if odds.total.is_empty() {
        html! { <CoefBoxPlug /> }
    } else {
        let lines = odds.total.iter().map(|line| (line.value, line.over, line.under)).collect::<Vec<_>>();
        html! {
            <div class="coef-row">
                { coef_box(Market::Over) }
                <LineSelector {lines} current={selector.total_line} handicap={false} on_change={on_total} />
                { coef_box(Market::Under) }
            </div>
        }
    };

    let title = (*selection).map(|chosen| AttrValue::from(chosen.title(&props.game)));

    html! {
        <div class="coefs-list">
            <div class="teams">
                <span>{ &props.game.team_a }</span>
                <span>{ &props.game.team_b }</span>
            </div>
            <div class="coef-groups">
                <div class="coef-row">
                    { coef_box(Market::WinA) }
                    { coef_box(Market::Draw) }
                    { coef_box(Market::WinB) }
                </div>
                <span class="divider" />
                { handicap }
                <span class="divider" />
                { total }
            </div>
            <Modal open={bet_modal.is_open()} on_close={bet_modal.close_callback()}>
                <FormView
                    fields={(*fields).clone()}
                    {on_submit}
                    on_cancel={bet_modal.close_callback()}
                    {title}
                    submit_text="Place bet"
                    loading={*loading}
                    error_message={bet_modal.error()}
                />
            </Modal>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_values_read_back_from_options() {
        for line in [-1.5, 0.0, 2.25, 10.0] {
            assert_eq!(parse_line(&line.to_string()), Some(line));
        }
        assert_eq!(parse_line("-1.5"), Some(-1.5));
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("abc"), None);
        assert_eq!(parse_line("NaN"), None);
        assert_eq!(parse_line("inf"), None);
    }
}
