use common::api::ApiError;
use common::notify::Notifications;
use common::roles::roles_ready;
use common::session::UserSession;
use common::{UserData, UserRole};
use yew::prelude::*;

use crate::components::auth_pages::{LoginPage, RegisterPage};
use crate::components::create_match::CreateMatchPage;
use crate::components::header::Header;
use crate::components::matches::MatchesPage;
use crate::components::my_bets::MyBetsPage;
use crate::components::toasts::ToastContainer;
use crate::components::with_role::AuthorizationProvider;
use crate::nav::{Navigator, Page};
use crate::services::{run, use_alive, Api};
use crate::session::{SessionAction, SessionHandle, SessionState};
use crate::storage::on_storage_change;

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub api: Api,
    pub notifications: Notifications,
    /// The session as it was read from storage at startup.
    pub session: UserSession,
}

#[function_component]
pub fn App(props: &AppProps) -> Html {
    let session = {
        let initial = props.session.clone();
        use_reducer(move || SessionState(initial))
    };
    let page = use_state(Page::default);
    let navigator = {
        let setter = page.setter();
        use_memo((), move |_| {
            Navigator(Callback::from(move |next: Page| {
                tracing::debug!(?next, "navigate");
                setter.set(next);
            }))
        })
    };
    let alive = use_alive();

    {
        let session = session.clone();
        use_effect_with((), move |_| {
            let listener = on_storage_change(Callback::from(move |change| {
                session.dispatch(SessionAction::Storage(change));
            }));
            move || drop(listener)
        });
    }
    {
        let notifications = props.notifications.clone();
        use_effect_with((), move |_| move || notifications.shutdown());
    }

    // the stored copy may be stale, so refresh it once per signed-in user
    let user_id = session.0.user().map(|user| user.id.clone());
    {
        let api = props.api.clone();
        let session = session.clone();
        use_effect_with(user_id, move |user_id| {
            if let Some(user_id) = user_id.clone() {
                run(
                    &alive,
                    async move { api.get_user(&user_id).await },
                    Callback::from(move |outcome: Result<UserData, ApiError>| match outcome {
                        Ok(user) => session.dispatch(SessionAction::Refresh(user)),
                        Err(ApiError::UserNotFound) => {
                            tracing::warn!("stored user no longer exists");
                            session.dispatch(SessionAction::SignOut);
                        }
                        Err(err) => tracing::warn!(code = err.code(), "refreshing user failed: {err}"),
                    }),
                );
            }
        });
    }

    let role = session.0.role();
    let get_user_roles = use_callback(role, |(), role: &UserRole| roles_ready(vec![role.as_str().to_owned()]));

    let content = match *page {
        Page::Matches => html! { <MatchesPage /> },
        Page::Login => html! { <LoginPage /> },
        Page::Register => html! { <RegisterPage /> },
        Page::MyBets => html! { <MyBetsPage /> },
        Page::CreateMatch => html! { <CreateMatchPage /> },
    };

    html! {
        <ContextProvider<Api> context={props.api.clone()}>
            <ContextProvider<Notifications> context={props.notifications.clone()}>
                <ContextProvider<SessionHandle> context={session}>
                    <ContextProvider<Navigator> context={(*navigator).clone()}>
                        <AuthorizationProvider {get_user_roles}>
                            <Header />
                            <main class="content">{ content }</main>
                        </AuthorizationProvider>
                        <ToastContainer />
                    </ContextProvider<Navigator>>
                </ContextProvider<SessionHandle>>
            </ContextProvider<Notifications>>
        </ContextProvider<Api>>
    }
}
