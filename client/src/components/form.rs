use std::rc::Rc;

use common::form::{
    item_template, FieldErrors, FieldKind, FieldPath, FieldSchema, FormEngine, FormValue,
    Submission,
};
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FormProps {
    pub fields: Rc<Vec<FieldSchema>>,
    pub on_submit: Callback<FormValue>,
    #[prop_or_default]
    pub on_cancel: Option<Callback<()>>,
    #[prop_or_default]
    pub title: Option<AttrValue>,
    #[prop_or(AttrValue::Static("Submit"))]
    pub submit_text: AttrValue,
    #[prop_or(AttrValue::Static("Cancel"))]
    pub cancel_text: AttrValue,
    #[prop_or_default]
    pub loading: bool,
    #[prop_or_default]
    pub error_message: Option<AttrValue>,
}

pub enum FormMsg {
    Set(FieldPath, FormValue),
    AddItem(FieldPath, FormValue),
    RemoveItem(FieldPath, usize),
    Submit,
    Cancel,
}

/// Renders a field list and owns its values until they are submitted.
pub struct FormView {
    engine: FormEngine,
    on_change: Callback<(FieldPath, FormValue)>,
    on_add: Callback<(FieldPath, FormValue)>,
    on_remove: Callback<(FieldPath, usize)>,
}

fn focus_field(path: &str) {
    let element = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(path))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());
    match element {
        Some(element) => {
            if let Err(err) = element.focus() {
                tracing::debug!("could not focus {path}: {err:?}");
            }
        }
        None => tracing::debug!("no element to focus for {path}"),
    }
}

impl Component for FormView {
    type Message = FormMsg;
    type Properties = FormProps;

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link();
        Self {
            engine: FormEngine::new(ctx.props().fields.clone()),
            on_change: link.callback(|(path, value)| FormMsg::Set(path, value)),
            on_add: link.callback(|(path, item)| FormMsg::AddItem(path, item)),
            on_remove: link.callback(|(path, index)| FormMsg::RemoveItem(path, index)),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.engine.replace_fields(ctx.props().fields.clone());
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            FormMsg::Set(path, value) => {
                self.engine.set_value(&path, value);
                true
            }
            FormMsg::AddItem(path, item) => {
                self.engine.add_array_item(&path, Some(item));
                true
            }
            FormMsg::RemoveItem(path, index) => self.engine.remove_array_item(&path, index),
            FormMsg::Submit => {
                match self.engine.submit() {
                    Submission::Accepted(values) => ctx.props().on_submit.emit(values),
                    Submission::Rejected { focus } => focus_field(&focus),
                }
                true
            }
            FormMsg::Cancel => {
                self.engine.reset();
                if let Some(on_cancel) = &ctx.props().on_cancel {
                    on_cancel.emit(());
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            FormMsg::Submit
        });
        let values = self.engine.values();
        let errors = self.engine.errors();

        html! {
            <form class="form" {onsubmit} novalidate={true}>
                if let Some(title) = &props.title {
                    <h2 class="form-title">{ title.clone() }</h2>
                }
                if let Some(message) = &props.error_message {
                    <div class="form-error" role="alert">{ message.clone() }</div>
                }
                { for props.fields.iter().map(|field| {
                    let path = FieldPath::root().key(&field.name);
                    let (_, errors) = keyed_errors(errors, &path);
                    html! {
                        <FieldRenderer
                            key={field.name.clone()}
                            field={field.clone()}
                            value={values.get(&field.name).cloned()}
                            {errors}
                            {path}
                            loading={props.loading}
                            on_change={self.on_change.clone()}
                            on_add={self.on_add.clone()}
                            on_remove={self.on_remove.clone()}
                        />
                    }
                }) }
                <div class="form-actions">
                    if props.on_cancel.is_some() {
                        <button type="button" class="button-secondary" disabled={props.loading}
                            onclick={ctx.link().callback(|_| FormMsg::Cancel)}>
                            { props.cancel_text.clone() }
                        </button>
                    }
                    <button type="submit" class="button-primary" disabled={props.loading}>
                        { if props.loading { "..." } else { props.submit_text.as_str() } }
                    </button>
                </div>
            </form>
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct FieldProps {
    pub field: FieldSchema,
    pub path: FieldPath,
    pub value: Option<FormValue>,
    /// Errors at this field's path and below.
    pub errors: FieldErrors,
    pub loading: bool,
    pub on_change: Callback<(FieldPath, FormValue)>,
    pub on_add: Callback<(FieldPath, FormValue)>,
    pub on_remove: Callback<(FieldPath, usize)>,
}

fn error_text(errors: &FieldErrors, id: &str) -> Html {
    match errors.get(id) {
        Some(message) => html! { <span class="field-error">{ message }</span> },
        None => html!(),
    }
}

fn label_text(field: &FieldSchema) -> String {
    if field.required {
        format!("{} *", field.label)
    } else {
        field.label.clone()
    }
}

/// The render key for a child field and the errors it should display.
fn keyed_errors(errors: &FieldErrors, path: &FieldPath) -> (String, FieldErrors) {
    let key = path.to_string();
    let scoped = errors.scoped(&key);
    (key, scoped)
}

fn child(props: &FieldProps, field: &FieldSchema, path: FieldPath, value: Option<&FormValue>) -> Html {
    let (key, errors) = keyed_errors(&props.errors, &path);
    html! {
        <FieldRenderer
            {key}
            field={field.clone()}
            value={value.cloned()}
            {errors}
            {path}
            loading={props.loading}
            on_change={props.on_change.clone()}
            on_add={props.on_add.clone()}
            on_remove={props.on_remove.clone()}
        />
    }
}

/// One control for one field. Object and array fields render their children.
///
/// Props compare by value, and untouched subtrees share their nodes, so an
/// edit only re-renders the fields along the edited path.
#[function_component]
pub fn FieldRenderer(props: &FieldProps) -> Html {
    let field = &props.field;
    let id = props.path.to_string();
    let has_error = props.errors.get(&id).is_some();
    let class = classes!("field", has_error.then_some("field-invalid"));

    match field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Password | FieldKind::Number => {
            let path = props.path.clone();
            let oninput = props.on_change.reform(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                (path.clone(), FormValue::Text(input.value()))
            });
            let value = props
                .value
                .as_ref()
                .map(FormValue::to_input_string)
                .unwrap_or_default();
            html! {
                <div {class}>
                    <label for={id.clone()}>{ label_text(field) }</label>
                    <input id={id.clone()} type={field.kind.input_type()} {value} {oninput}
                        disabled={props.loading} />
                    { error_text(&props.errors, &id) }
                </div>
            }
        }
        FieldKind::Checkbox => {
            let path = props.path.clone();
            let onchange = props.on_change.reform(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                (path.clone(), FormValue::Bool(input.checked()))
            });
            let checked = props
                .value
                .as_ref()
                .and_then(FormValue::as_bool)
                .unwrap_or(false);
            html! {
                <div {class}>
                    <label>
                        <input id={id.clone()} type="checkbox" {checked} {onchange}
                            disabled={props.loading} />
                        { label_text(field) }
                    </label>
                    { error_text(&props.errors, &id) }
                </div>
            }
        }
        FieldKind::Select => {
            let path = props.path.clone();
            let onchange = props.on_change.reform(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                (path.clone(), FormValue::Text(select.value()))
            });
            let current = props
                .value
                .as_ref()
                .map(FormValue::to_input_string)
                .unwrap_or_default();
            html! {
                <div {class}>
                    <label for={id.clone()}>{ label_text(field) }</label>
                    <select id={id.clone()} {onchange} disabled={props.loading}>
                        <option value="" selected={current.is_empty()}></option>
                        { for field.option_list().iter().map(|option| html! {
                            <option value={option.value.clone()} selected={option.value == current}>
                                { &option.label }
                            </option>
                        }) }
                    </select>
                    { error_text(&props.errors, &id) }
                </div>
            }
        }
        FieldKind::Autocomplete => {
            let path = props.path.clone();
            let schema = field.clone();
            // a typed label is stored as its option value
            let oninput = props.on_change.reform(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                let text = input.value();
                let value = schema
                    .option_list()
                    .iter()
                    .find(|option| option.label == text)
                    .map_or(text, |option| option.value.clone());
                (path.clone(), FormValue::Text(value))
            });
            let stored = props
                .value
                .as_ref()
                .map(FormValue::to_input_string)
                .unwrap_or_default();
            let value = field
                .option_list()
                .iter()
                .find(|option| option.value == stored)
                .map_or(stored.clone(), |option| option.label.clone());
            let list = format!("{id}-options");
            html! {
                <div {class}>
                    <label for={id.clone()}>{ label_text(field) }</label>
                    <input id={id.clone()} list={list.clone()} {value} {oninput}
                        autocomplete="off" disabled={props.loading} />
                    <datalist id={list}>
                        { for field.option_list().iter().map(|option| html! {
                            <option value={option.label.clone()} />
                        }) }
                    </datalist>
                    { error_text(&props.errors, &id) }
                </div>
            }
        }
        FieldKind::Object => html! {
            <fieldset id={id.clone()} tabindex="-1" {class}>
                <legend>{ label_text(field) }</legend>
                { for field.fields.iter().map(|sub| {
                    let value = props.value.as_ref().and_then(|value| value.get(&sub.name));
                    child(props, sub, props.path.key(&sub.name), value)
                }) }
                { error_text(&props.errors, &id) }
            </fieldset>
        },
        FieldKind::Array => {
            let items = props
                .value
                .as_ref()
                .and_then(FormValue::as_list)
                .unwrap_or_default();
            let item_label = field.array_item_label.as_deref().unwrap_or("Item");
            let template = if field.fields.is_empty() {
                FormValue::from("")
            } else {
                item_template(field)
            };
            let onadd = {
                let path = props.path.clone();
                props.on_add.reform(move |_: MouseEvent| (path.clone(), template.clone()))
            };

            html! {
                <fieldset id={id.clone()} tabindex="-1" {class}>
                    <legend>{ label_text(field) }</legend>
                    { for items.iter().enumerate().map(|(index, item)| {
                        let item_path = props.path.index(index);
                        let onremove = {
                            let path = props.path.clone();
                            props.on_remove.reform(move |_: MouseEvent| (path.clone(), index))
                        };
                        let body = if field.fields.is_empty() {
                            let scalar = FieldSchema::new("", format!("{item_label} {}", index + 1), FieldKind::Text);
                            child(props, &scalar, item_path.clone(), Some(item))
                        } else {
                            html! {
                                <>
                                    { for field.fields.iter().map(|sub| {
                                        child(props, sub, item_path.key(&sub.name), item.get(&sub.name))
                                    }) }
                                </>
                            }
                        };
                        html! {
                            <div class="array-item" key={item_path.to_string()}>
                                <div class="array-item-header">
                                    <span>{ format!("{item_label} {}", index + 1) }</span>
                                    <button type="button" class="button-link" onclick={onremove}
                                        disabled={props.loading}>
                                        { "Remove" }
                                    </button>
                                </div>
                                { body }
                            </div>
                        }
                    }) }
                    <button type="button" class="button-secondary" onclick={onadd} disabled={props.loading}>
                        { format!("Add {}", item_label.to_lowercase()) }
                    </button>
                    { error_text(&props.errors, &id) }
                </fieldset>
            }
        }
    }
}
