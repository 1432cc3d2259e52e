use std::rc::Rc;

use common::api::{ApiError, ApiResult};
use common::form::{FormError, FormValue};
use common::forms::{login_fields, register_fields};
use common::{LoginRequest, RegisterRequest, UserData};
use yew::prelude::*;

use crate::nav::{use_navigator, Page};
use crate::services::{run, use_alive, use_api, use_notifications};
use crate::session::{use_session, SessionAction};

use super::form::FormView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

enum AuthRequest {
    Login(LoginRequest),
    Register(RegisterRequest),
}

impl AuthMode {
    fn request(&self, values: &FormValue) -> Result<AuthRequest, FormError> {
        Ok(match self {
            AuthMode::Login => AuthRequest::Login(LoginRequest::from_form(values)?),
            AuthMode::Register => AuthRequest::Register(RegisterRequest::from_form(values)?),
        })
    }

    fn failure(&self, err: &ApiError) -> &'static str {
        match (self, err) {
            (AuthMode::Register, ApiError::Status { status: 400, .. }) => {
                "Invalid registration data"
            }
            _ => err.user_message(),
        }
    }
}

#[derive(Properties, PartialEq)]
struct AuthFormProps {
    mode: AuthMode,
}

#[function_component]
fn AuthForm(props: &AuthFormProps) -> Html {
    let api = use_api();
    let session = use_session();
    let notifications = use_notifications();
    let navigator = use_navigator();
    let alive = use_alive();
    let loading = use_state(|| false);
    let error = use_state(|| None::<AttrValue>);
    let fields = use_memo(props.mode, |mode| {
        Rc::new(match mode {
            AuthMode::Login => login_fields(),
            AuthMode::Register => register_fields(),
        })
    });

    let on_submit = {
        let mode = props.mode;
        let loading = loading.clone();
        let error = error.clone();
        let navigator = navigator.clone();
        Callback::from(move |values: FormValue| {
            let request = match mode.request(&values) {
                Ok(request) => request,
                Err(FormError::PasswordMismatch) => {
                    error.set(Some("Passwords do not match".into()));
                    return;
                }
                Err(err) => {
                    error.set(Some(err.to_string().into()));
                    return;
                }
            };

            loading.set(true);
            error.set(None);
            let api = api.clone();
            let task = async move {
                match request {
                    AuthRequest::Login(request) => api.login(&request).await,
                    AuthRequest::Register(request) => api.register(&request).await,
                }
            };

            let session = session.clone();
            let notifications = notifications.clone();
            let navigator = navigator.clone();
            let loading = loading.clone();
            let error = error.clone();
            run(
                &alive,
                task,
                Callback::from(move |outcome: ApiResult<UserData>| {
                    loading.set(false);
                    match outcome {
                        Ok(user) => {
                            session.dispatch(SessionAction::SignIn(user));
                            notifications.success(match mode {
                                AuthMode::Login => "Signed in",
                                AuthMode::Register => "Registration complete",
                            });
                            navigator.go(Page::Matches);
                        }
                        Err(err) => {
                            tracing::warn!(code = err.code(), "{mode:?} failed: {err}");
                            error.set(Some(mode.failure(&err).into()));
                        }
                    }
                }),
            );
        })
    };

    let (title, submit_text, switch_text, switch_to) = match props.mode {
        AuthMode::Login => ("Sign in", "Sign in", "No account yet? Sign up", Page::Register),
        AuthMode::Register => ("Sign up", "Sign up", "Already registered? Sign in", Page::Login),
    };

    html! {
        <div class="auth-page">
            <FormView
                fields={(*fields).clone()}
                {on_submit}
                {title}
                {submit_text}
                loading={*loading}
                error_message={(*error).clone()}
            />
            <button type="button" class="button-link" onclick={navigator.to(switch_to)}>
                { switch_text }
            </button>
        </div>
    }
}

#[function_component]
pub fn LoginPage() -> Html {
    html! { <AuthForm mode={AuthMode::Login} /> }
}

#[function_component]
pub fn RegisterPage() -> Html {
    html! { <AuthForm mode={AuthMode::Register} /> }
}
