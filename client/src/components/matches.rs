use std::rc::Rc;

use common::api::ApiResult;
use common::filters::{group_by_sport, sport_display_name, sports_of, MatchQuery, SportFilter};
use common::Match;
use yew::prelude::*;

use crate::components::coefs::CoefsList;
use crate::services::{run, use_alive, use_api, use_notifications};

#[derive(Properties, PartialEq)]
struct SportFilterBarProps {
    sports: Rc<Vec<String>>,
    filter: SportFilter,
    on_toggle: Callback<String>,
    on_clear: Callback<()>,
}

#[function_component]
fn SportFilterBar(props: &SportFilterBarProps) -> Html {
    let all_class = classes!("chip", props.filter.is_all_selected().then_some("chip-selected"));
    html! {
        <div class="sport-filter">
            <button type="button" class={all_class} onclick={props.on_clear.reform(|_: MouseEvent| ())}>
                { "All" }
            </button>
            { for props.sports.iter().map(|sport| {
                let selected = props.filter.is_selected(sport);
                let onclick = {
                    let sport = sport.clone();
                    props.on_toggle.reform(move |_: MouseEvent| sport.clone())
                };
                html! {
                    <button type="button" key={sport.clone()}
                        class={classes!("chip", selected.then_some("chip-selected"))} {onclick}>
                        { sport_display_name(sport) }
                    </button>
                }
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SportCardProps {
    sport: AttrValue,
    games: Vec<Rc<Match>>,
}

#[function_component]
fn SportCard(props: &SportCardProps) -> Html {
    let expanded = use_state(|| true);
    let toggle = {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| expanded.set(!*expanded))
    };

    html! {
        <section class="sport-card">
            <button type="button" class="sport-card-header" onclick={toggle}>
                <span>{ sport_display_name(&props.sport) }</span>
                <span class="count">{ props.games.len() }</span>
                <span class={classes!("chevron", (*expanded).then_some("chevron-open"))} />
            </button>
            if *expanded {
                { for props.games.iter().map(|game| html! {
                    <div class="match" key={game.id.clone()}>
                        <div class="league">{ game.league.clone() }</div>
                        <CoefsList game={game.clone()} />
                    </div>
                }) }
            }
        </section>
    }
}

#[function_component]
fn MatchListSkeleton() -> Html {
    html! {
        <div class="match-list-skeleton" aria-busy="true">
            { for (0..3).map(|_| html! { <div class="skeleton-card" /> }) }
        </div>
    }
}

/// Upcoming matches grouped by sport, narrowed by the sport chips.
#[function_component]
pub fn MatchesPage() -> Html {
    let api = use_api();
    let notifications = use_notifications();
    let alive = use_alive();
    let matches = use_state(|| None::<Rc<Vec<Match>>>);
    let filter = use_state(SportFilter::new);

    {
        let matches = matches.clone();
        use_effect_with((), move |_| {
            let query = MatchQuery::upcoming();
            run(
                &alive,
                async move { api.get_matches(&query).await },
                Callback::from(move |outcome: ApiResult<Vec<Match>>| match outcome {
                    Ok(loaded) => {
                        tracing::debug!(count = loaded.len(), "matches loaded");
                        matches.set(Some(Rc::new(loaded)));
                    }
                    Err(err) => {
                        tracing::error!(code = err.code(), "loading matches failed: {err}");
                        notifications.error(err.user_message());
                        matches.set(Some(Rc::default()));
                    }
                }),
            );
        });
    }

    let Some(loaded) = (*matches).clone() else {
        return html! { <MatchListSkeleton /> };
    };

    let sports = Rc::new(sports_of(&loaded));
    let on_toggle = {
        let filter = filter.clone();
        Callback::from(move |sport: String| {
            let mut next = (*filter).clone();
            next.toggle(&sport);
            filter.set(next);
        })
    };
    let on_clear = {
        let filter = filter.clone();
        Callback::from(move |_: ()| filter.set(SportFilter::new()))
    };

    let visible = filter.visible_sports(&sports);
    let groups = group_by_sport(&visible, &loaded);

    html! {
        <div class="matches-page">
            <SportFilterBar sports={sports.clone()} filter={(*filter).clone()} {on_toggle} {on_clear} />
            if loaded.is_empty() {
                <p class="empty">{ "No upcoming matches" }</p>
            }
            { for groups.into_iter().filter(|(_, games)| !games.is_empty()).map(|(sport, games)| {
                let games = games.into_iter().cloned().map(Rc::new).collect::<Vec<_>>();
                html! {
                    <SportCard key={sport} sport={AttrValue::from(sport.to_owned())} {games} />
                }
            }) }
        </div>
    }
}
