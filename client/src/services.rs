use std::cell::Cell;
use std::future::Future;
use std::ops::Deref;
use std::rc::Rc;

use common::api::ApiClient;
use common::notify::{Notifications, AUTO_DISMISS};
use yew::platform::spawn_local;
use yew::platform::time::sleep;
use yew::prelude::*;

/// The api client shared through context.
#[derive(Clone)]
pub struct Api(pub Rc<ApiClient>);

impl PartialEq for Api {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Api {
    type Target = ApiClient;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[hook]
pub fn use_api() -> Api {
    use_context::<Api>().expect("Api context is provided by App")
}

#[hook]
pub fn use_notifications() -> Notifications {
    use_context::<Notifications>().expect("Notifications context is provided by App")
}

/// Cleared when the owning component unmounts, so late responses can be dropped.
#[derive(Clone, Debug)]
pub struct Alive(Rc<Cell<bool>>);

impl Alive {
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }
}

#[hook]
pub fn use_alive() -> Alive {
    let alive = use_memo((), |_| Alive(Rc::new(Cell::new(true))));
    {
        let alive = alive.clone();
        use_effect_with((), move |_| move || alive.0.set(false));
    }
    (*alive).clone()
}

/// Runs `task` in the background and reports its outcome, unless the owner
/// has gone away in the meantime.
pub fn run<R: 'static>(alive: &Alive, task: impl Future<Output = R> + 'static, done: Callback<R>) {
    let alive = alive.clone();
    spawn_local(async move {
        let outcome = task.await;
        if alive.is_alive() {
            done.emit(outcome);
        } else {
            tracing::debug!("dropping a response that arrived after teardown");
        }
    });
}

pub fn schedule_dismiss(notifications: Notifications, id: u64) {
    spawn_local(async move {
        sleep(AUTO_DISMISS).await;
        notifications.dismiss(id);
    });
}
