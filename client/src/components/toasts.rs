use std::cell::RefCell;
use std::collections::HashSet;

use common::notify::Toast;
use yew::prelude::*;

use crate::services::{schedule_dismiss, use_notifications};

#[function_component]
pub fn ToastContainer() -> Html {
    let notifications = use_notifications();
    let toasts = use_state(Vec::<Toast>::new);

    {
        let toasts = toasts.clone();
        use_effect_with(notifications.clone(), move |notifications| {
            let queue = notifications.clone();
            let timed = RefCell::new(HashSet::<u64>::new());
            let subscription = notifications.subscribe(move |current: &[Toast]| {
                let mut seen = timed.borrow_mut();
                for toast in current {
                    if seen.insert(toast.id) {
                        schedule_dismiss(queue.clone(), toast.id);
                    }
                }
                toasts.set(current.to_vec());
            });
            let notifications = notifications.clone();
            move || notifications.unsubscribe(subscription)
        });
    }

    let dismiss = |id: u64| {
        let notifications = notifications.clone();
        Callback::from(move |_: MouseEvent| notifications.dismiss(id))
    };

    html! {
        <div class="toast-container" aria-live="polite">
            { for toasts.iter().map(|toast| html! {
                <div key={toast.id} class={classes!("toast", toast.kind.class())} role="status">
                    <span class="toast-message">{ &toast.message }</span>
                    <button type="button" class="toast-close" aria-label="Close"
                        onclick={dismiss(toast.id)}>
                        { "×" }
                    </button>
                </div>
            }) }
        </div>
    }
}
