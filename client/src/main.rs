mod app;
mod components;
mod logging;
mod nav;
mod services;
mod session;
mod storage;

use std::rc::Rc;

use common::api::ApiClient;
use common::config::ApiConfig;
use common::notify::Notifications;
use common::session::{KeyValueStore, UserSession};

use app::{App, AppProps};
use services::Api;
use storage::BrowserStore;

fn main() {
    logging::init();

    let config = ApiConfig::from_env();
    let client = match ApiClient::connect(config) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("could not set up the api client: {err:#}");
            return;
        }
    };

    let store: Rc<dyn KeyValueStore> = Rc::new(BrowserStore);
    let props = AppProps {
        api: Api(Rc::new(client.with_token_store(store.clone()))),
        notifications: Notifications::new(),
        session: UserSession::load(store),
    };
    yew::Renderer::<App>::with_props(props).render();
}
