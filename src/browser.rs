use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::{self, ActivityApi};
use crate::config::{ClientConfig, CONFIG_ELEMENT_ID};
use crate::controller::Controller;
use crate::error::Result;
use crate::model::{Activity, ActivityCatalog, Credentials, LoginReply, MessageReply, SessionStatus};
use crate::session::TokenStore;
use crate::ui::SignalUi;

pub type BrowserController = Controller<HttpApi, BrowserStorage, SignalUi>;

pub fn controller(config: ClientConfig, ui: SignalUi) -> BrowserController {
    Controller::new(HttpApi::new(&config), BrowserStorage, ui, config)
}

/// Reads the configuration written by the host into the page.
pub fn embedded_config() -> ClientConfig {
    let json = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    ClientConfig::from_embedded(json.as_deref())
}

pub struct HttpApi {
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Self {
        HttpApi {
            config: config.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    async fn send<T: DeserializeOwned>(request: Request) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        api::interpret(status, &body)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header("Authorization", &api::bearer(token)),
            None => builder,
        }
    }
}

impl ActivityApi for HttpApi {
    async fn list_activities(&self) -> Result<Vec<Activity>> {
        let request = Request::get(&self.url(api::ACTIVITIES_PATH)).build()?;
        let catalog: ActivityCatalog = Self::send(request).await?;
        Ok(catalog.into_inner())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginReply> {
        let request = Request::post(&self.url(api::LOGIN_PATH)).json(credentials)?;
        Self::send(request).await
    }

    async fn signup(&self, activity: &str, email: &str, token: Option<&str>) -> Result<MessageReply> {
        let builder = Request::post(&self.url(&api::signup_path(activity, email)));
        let request = Self::authorized(builder, token).build()?;
        Self::send(request).await
    }

    async fn unregister(&self, activity: &str, email: &str, token: &str) -> Result<MessageReply> {
        let builder = Request::delete(&self.url(&api::unregister_path(activity, email)));
        let request = Self::authorized(builder, Some(token)).build()?;
        Self::send(request).await
    }

    async fn session_status(&self, token: &str) -> Result<SessionStatus> {
        let builder = Request::get(&self.url(api::STATUS_PATH));
        let request = Self::authorized(builder, Some(token)).build()?;
        Self::send(request).await
    }
}

/// `window.localStorage`. Storage errors (private mode, quota) are ignored: the session
/// then simply lives in memory for this page.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

impl TokenStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()
            .and_then(|storage| storage.get_item(key).ok())
            .flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
