use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Matches,
    Login,
    Register,
    MyBets,
    CreateMatch,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Matches => "Matches",
            Page::Login => "Sign in",
            Page::Register => "Sign up",
            Page::MyBets => "My bets",
            Page::CreateMatch => "Create match",
        }
    }
}

/// Switches the page shown under the header.
#[derive(Clone, PartialEq)]
pub struct Navigator(pub Callback<Page>);

impl Navigator {
    pub fn go(&self, page: Page) {
        self.0.emit(page);
    }

    pub fn to(&self, page: Page) -> Callback<MouseEvent> {
        self.0.reform(move |_| page)
    }
}

#[hook]
pub fn use_navigator() -> Navigator {
    use_context::<Navigator>().expect("Navigator context is provided by App")
}
