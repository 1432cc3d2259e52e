use common::roles::{resolve_roles, AllowedRoles, Authorization, RoleFuture, RoleGate};
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AuthorizationProviderProps {
    /// Produces the current user's roles. A new callback triggers a new lookup.
    pub get_user_roles: Callback<(), RoleFuture>,
    #[prop_or_default]
    pub children: Html,
}

#[function_component]
pub fn AuthorizationProvider(props: &AuthorizationProviderProps) -> Html {
    let authorization = use_state(Authorization::pending);
    let settled_once = use_state(|| false);
    let gate = use_memo((), |_| RoleGate::new());

    {
        let authorization = authorization.clone();
        let settled_once = settled_once.clone();
        let gate = gate.clone();
        use_effect_with(props.get_user_roles.clone(), move |get_user_roles| {
            let ticket = gate.begin();
            authorization.set(Authorization::pending());
            let source = get_user_roles.emit(());
            spawn_local(async move {
                let resolved = resolve_roles(source).await;
                if gate.accepts(ticket) {
                    tracing::debug!(roles = ?resolved.roles(), "roles resolved");
                    authorization.set(resolved);
                    settled_once.set(true);
                }
            });
        });
    }
    {
        let gate = gate.clone();
        use_effect_with((), move |_| move || gate.teardown());
    }

    let spinner = html! {
        <div class="auth-loading" aria-busy="true">
            <span class="spinner"></span>
        </div>
    };

    html! {
        <ContextProvider<Authorization> context={(*authorization).clone()}>
            if authorization.is_loading() {
                { spinner }
            }
            if *settled_once || !authorization.is_loading() {
                { props.children.clone() }
            }
        </ContextProvider<Authorization>>
    }
}

/// The role snapshot of the nearest `AuthorizationProvider`.
///
/// # Panics
///
/// When there is no provider above the caller.
#[hook]
pub fn use_authorization() -> Authorization {
    Authorization::from_context(use_context::<Authorization>()).unwrap_or_else(|err| panic!("{err}"))
}

#[derive(Properties, PartialEq)]
pub struct WithRoleProps {
    pub allowed_roles: AllowedRoles,
    #[prop_or_default]
    pub fallback: Html,
    #[prop_or_default]
    pub children: Html,
}

/// Shows its children only to the allowed roles. Renders nothing until the
/// roles are known.
#[function_component]
pub fn WithRole(props: &WithRoleProps) -> Html {
    let authorization = use_authorization();
    if authorization.is_loading() {
        return html!();
    }
    if authorization.has_role(&props.allowed_roles) {
        props.children.clone()
    } else {
        props.fallback.clone()
    }
}
