use std::rc::Rc;

use common::api::ApiResult;
use common::filters::known_sports;
use common::form::FormValue;
use common::forms::create_match_fields;
use common::roles::AllowedRoles;
use common::{Match, NewMatch};
use yew::prelude::*;

use crate::components::form::FormView;
use crate::components::with_role::WithRole;
use crate::nav::{use_navigator, Page};
use crate::services::{run, use_alive, use_api, use_notifications};

#[function_component]
fn CreateMatchForm() -> Html {
    let api = use_api();
    let notifications = use_notifications();
    let navigator = use_navigator();
    let alive = use_alive();
    let fields = use_memo((), |_| Rc::new(create_match_fields(&known_sports())));
    let loading = use_state(|| false);
    let error = use_state(|| None::<AttrValue>);
    // bumping the key remounts the form with fresh values
    let generation = use_state(|| 0u32);

    let on_submit = {
        let loading = loading.clone();
        let error = error.clone();
        let generation = generation.clone();
        Callback::from(move |values: FormValue| {
            let new_match = match NewMatch::from_form(&values) {
                Ok(new_match) => new_match,
                Err(err) => {
                    error.set(Some(err.to_string().into()));
                    return;
                }
            };
            loading.set(true);
            error.set(None);
            let api = api.clone();
            let notifications = notifications.clone();
            let loading = loading.clone();
            let error = error.clone();
            let generation = generation.clone();
            run(
                &alive,
                async move { api.create_match(&new_match).await },
                Callback::from(move |outcome: ApiResult<Match>| {
                    loading.set(false);
                    match outcome {
                        Ok(created) => {
                            tracing::info!(id = %created.id, "match created");
                            notifications.success(format!(
                                "Match {} vs. {} created",
                                created.team_a, created.team_b
                            ));
                            generation.set(*generation + 1);
                        }
                        Err(err) => {
                            tracing::warn!(code = err.code(), "creating match failed: {err}");
                            error.set(Some(err.user_message().into()));
                        }
                    }
                }),
            );
        })
    };

    html! {
        <FormView
            key={*generation}
            fields={(*fields).clone()}
            {on_submit}
            on_cancel={navigator.0.reform(|_: ()| Page::Matches)}
            title="New match"
            submit_text="Create"
            loading={*loading}
            error_message={(*error).clone()}
        />
    }
}

#[function_component]
pub fn CreateMatchPage() -> Html {
    let fallback = html! {
        <p class="forbidden">{ "Only administrators can create matches" }</p>
    };
    html! {
        <div class="create-match-page">
            <WithRole allowed_roles={AllowedRoles::from("ADMIN")} {fallback}>
                <CreateMatchForm />
            </WithRole>
        </div>
    }
}
