use std::rc::Rc;

use common::session::UserSession;
use common::UserData;
use yew::prelude::*;

use crate::storage::StorageChange;

pub enum SessionAction {
    SignIn(UserData),
    /// Fresh copy of the signed-in user from the server.
    Refresh(UserData),
    SignOut,
    Storage(StorageChange),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState(pub UserSession);

impl Reducible for SessionState {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut session = self.0.clone();
        match action {
            SessionAction::SignIn(user) => {
                tracing::info!(login = %user.login, "signed in");
                session.set_user(Some(user));
            }
            SessionAction::Refresh(user) => session.set_user(Some(user)),
            SessionAction::SignOut => {
                tracing::info!("signed out");
                session.clear_user();
            }
            SessionAction::Storage(change) => {
                let changed = session.apply_storage_event(
                    change.key.as_deref(),
                    change.old_value.as_deref(),
                    change.new_value.as_deref(),
                );
                if !changed {
                    return self;
                }
                tracing::debug!("user changed in another tab");
            }
        }
        Rc::new(Self(session))
    }
}

pub type SessionHandle = UseReducerHandle<SessionState>;

#[hook]
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>().expect("SessionHandle context is provided by App")
}
