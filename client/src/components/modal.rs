use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub open: bool,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

#[function_component]
pub fn Modal(props: &ModalProps) -> Html {
    if !props.open {
        return html!();
    }
    let on_backdrop = props.on_close.reform(|_: MouseEvent| ());
    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div class="modal-body" onclick={|e: MouseEvent| e.stop_propagation()}>
                { props.children.clone() }
            </div>
        </div>
    }
}

/// Open flag plus the form-level error shown inside the modal.
#[derive(Clone, PartialEq)]
pub struct ModalHandle {
    open: UseStateHandle<bool>,
    error: UseStateHandle<Option<AttrValue>>,
}

impl ModalHandle {
    pub fn is_open(&self) -> bool {
        *self.open
    }

    pub fn error(&self) -> Option<AttrValue> {
        (*self.error).clone()
    }

    pub fn open(&self) {
        self.open.set(true);
    }

    pub fn set_error(&self, message: impl Into<AttrValue>) {
        self.error.set(Some(message.into()));
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    /// Closes and forgets the error.
    pub fn close(&self) {
        self.open.set(false);
        self.error.set(None);
    }

    pub fn close_callback(&self) -> Callback<()> {
        let modal = self.clone();
        Callback::from(move |_| modal.close())
    }
}

#[hook]
pub fn use_modal() -> ModalHandle {
    ModalHandle {
        open: use_state(|| false),
        error: use_state(|| None),
    }
}
