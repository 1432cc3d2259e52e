use std::rc::Rc;

use common::api::ApiResult;
use common::form::{FormError, FormValue};
use common::forms::{
    change_email_fields, change_login_fields, change_password_fields, confirmed_password, number,
    password, text, top_up_fields,
};
use common::odds::BetError;
use common::roles::AllowedRoles;
use common::UserData;
use yew::prelude::*;

use crate::components::form::FormView;
use crate::components::modal::{use_modal, Modal, ModalHandle};
use crate::components::with_role::WithRole;
use crate::nav::{use_navigator, Page};
use crate::services::{run, use_alive, use_api, use_notifications};
use crate::session::{use_session, SessionAction};

/// The account settings reachable from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountForm {
    TopUp,
    ChangeLogin,
    ChangeEmail,
    ChangePassword,
}

enum AccountRequest {
    TopUp(f64),
    Login(String),
    Email(String),
    Password { current: String, new: String },
}

impl AccountForm {
    fn title(&self) -> &'static str {
        match self {
            AccountForm::TopUp => "Top up balance",
            AccountForm::ChangeLogin => "Change login",
            AccountForm::ChangeEmail => "Change email",
            AccountForm::ChangePassword => "Change password",
        }
    }

    fn success(&self) -> &'static str {
        match self {
            AccountForm::TopUp => "Balance topped up",
            AccountForm::ChangeLogin => "Login changed",
            AccountForm::ChangeEmail => "Email changed",
            AccountForm::ChangePassword => "Password changed",
        }
    }

    fn fields(&self) -> Rc<Vec<common::form::FieldSchema>> {
        Rc::new(match self {
            AccountForm::TopUp => top_up_fields(),
            AccountForm::ChangeLogin => change_login_fields(),
            AccountForm::ChangeEmail => change_email_fields(),
            AccountForm::ChangePassword => change_password_fields(),
        })
    }

    fn request(&self, values: &FormValue) -> Result<AccountRequest, FormError> {
        Ok(match self {
            AccountForm::TopUp => AccountRequest::TopUp(number(values, "amount")?),
            AccountForm::ChangeLogin => AccountRequest::Login(text(values, "login")?),
            AccountForm::ChangeEmail => AccountRequest::Email(text(values, "email")?),
            AccountForm::ChangePassword => AccountRequest::Password {
                current: password(values, "currentPassword")?,
                new: confirmed_password(values, "newPassword", "confirmPassword")?,
            },
        })
    }
}

#[derive(Properties, PartialEq)]
struct AccountModalProps {
    form: AccountForm,
    modal: ModalHandle,
}

#[function_component]
fn AccountModal(props: &AccountModalProps) -> Html {
    let api = use_api();
    let session = use_session();
    let notifications = use_notifications();
    let alive = use_alive();
    let loading = use_state(|| false);
    let fields = use_memo(props.form, |form| form.fields());

    let on_submit = {
        let form = props.form;
        let modal = props.modal.clone();
        let loading = loading.clone();
        Callback::from(move |values: FormValue| {
            let Some(user) = session.0.user().cloned() else {
                modal.set_error(BetError::NotSignedIn.to_string());
                return;
            };
            let request = match form.request(&values) {
                Ok(request) => request,
                Err(FormError::PasswordMismatch) => {
                    modal.set_error("Passwords do not match");
                    return;
                }
                Err(err) => {
                    modal.set_error(err.to_string());
                    return;
                }
            };

            loading.set(true);
            modal.clear_error();
            let api = api.clone();
            let task = async move {
                match request {
                    AccountRequest::TopUp(amount) => api.update_balance(&user.id, amount).await,
                    AccountRequest::Login(login) => api.update_login(&user.id, &login).await,
                    AccountRequest::Email(email) => api.update_email(&user.id, &email).await,
                    AccountRequest::Password { current, new } => {
                        api.update_password(&user.id, &current, &new).await
                    }
                }
            };

            let session = session.clone();
            let notifications = notifications.clone();
            let modal = modal.clone();
            let loading = loading.clone();
            run(
                &alive,
                task,
                Callback::from(move |outcome: ApiResult<UserData>| {
                    loading.set(false);
                    match outcome {
                        Ok(user) => {
                            session.dispatch(SessionAction::Refresh(user));
                            notifications.success(form.success());
                            modal.close();
                        }
                        Err(err) => {
                            tracing::warn!(code = err.code(), "{form:?} failed: {err}");
                            modal.set_error(err.user_message());
                        }
                    }
                }),
            );
        })
    };

    html! {
        <Modal open={props.modal.is_open()} on_close={props.modal.close_callback()}>
            <FormView
                fields={(*fields).clone()}
                {on_submit}
                on_cancel={props.modal.close_callback()}
                title={props.form.title()}
                submit_text="Save"
                loading={*loading}
                error_message={props.modal.error()}
            />
        </Modal>
    }
}

#[function_component]
pub fn Header() -> Html {
    let session = use_session();
    let navigator = use_navigator();
    let notifications = use_notifications();

    let top_up = use_modal();
    let change_login = use_modal();
    let change_email = use_modal();
    let change_password = use_modal();
    let menu_open = use_state(|| false);

    let open = |modal: &ModalHandle| {
        let modal = modal.clone();
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
            modal.open();
        })
    };
    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };
    let sign_out = {
        let session = session.clone();
        let navigator = navigator.clone();
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
            session.dispatch(SessionAction::SignOut);
            notifications.success("Signed out");
            navigator.go(Page::Matches);
        })
    };

    let user_info = match session.0.user() {
        Some(user) => html! {
            <div class="user-info">
                <button type="button" class="balance-chip" onclick={open(&top_up)}>
                    { format!("Balance: {} +", user.balance) }
                </button>
                <button type="button" class="user-chip" onclick={toggle_menu}>
                    { &user.login }
                </button>
                if *menu_open {
                    <div class="user-menu">
                        <div class="user-menu-row">{ format!("ID: {}", user.id) }</div>
                        <div class="user-menu-row">{ &user.email }</div>
                        <div class="user-menu-row">{ user.role.display_name() }</div>
                        <div class="user-menu-row">{ user.status.display_name() }</div>
                        <button type="button" onclick={open(&change_login)}>{ "Change login" }</button>
                        <button type="button" onclick={open(&change_email)}>{ "Change email" }</button>
                        <button type="button" onclick={open(&change_password)}>{ "Change password" }</button>
                        <button type="button" onclick={navigator.to(Page::MyBets)}>{ "My bets" }</button>
                        <button type="button" class="danger" onclick={sign_out}>{ "Sign out" }</button>
                    </div>
                }
            </div>
        },
        None => html!(),
    };

    html! {
        <header class="app-header">
            <div class="header-row">
                <button type="button" class="logo" onclick={navigator.to(Page::Matches)}>
                    { "LanBet" }
                </button>
                <nav class="nav-bar">
                    <button type="button" onclick={navigator.to(Page::Matches)}>
                        { Page::Matches.title() }
                    </button>
                    <WithRole allowed_roles={AllowedRoles::from("ADMIN")}>
                        <button type="button" onclick={navigator.to(Page::CreateMatch)}>
                            { Page::CreateMatch.title() }
                        </button>
                    </WithRole>
                </nav>

                <WithRole allowed_roles={AllowedRoles::from("NONE")}>
                    <div class="auth-buttons">
                        <button type="button" class="button-secondary" onclick={navigator.to(Page::Login)}>
                            { Page::Login.title() }
                        </button>
                        <button type="button" class="button-primary" onclick={navigator.to(Page::Register)}>
                            { Page::Register.title() }
                        </button>
                    </div>
                </WithRole>
                <WithRole allowed_roles={AllowedRoles::from(["USER", "ADMIN", "SUPPORT"])}>
                    { user_info }
                </WithRole>
            </div>

            <AccountModal form={AccountForm::TopUp} modal={top_up} />
            <AccountModal form={AccountForm::ChangeLogin} modal={change_login} />
            <AccountModal form={AccountForm::ChangeEmail} modal={change_email} />
            <AccountModal form={AccountForm::ChangePassword} modal={change_password} />
        </header>
    }
}
