use chrono::Utc;
use leptos::logging::{error, log};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::ActivityApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{ActivityCard, Credentials};
use crate::notice::Notice;
use crate::session::{Session, TokenStore};
use crate::ui::{AdminMode, Ui};

pub const LOGIN_SUCCESS: &str = "Successfully logged in as teacher";
pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGIN_RETRY: &str = "Login failed. Please try again.";
pub const LOGGED_OUT: &str = "Logged out successfully";
pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const LOAD_FAILED: &str = "Failed to load activities. Please try again later.";
pub const GENERIC_FAILURE: &str = "An error occurred";
pub const SIGNUP_RETRY: &str = "Failed to sign up. Please try again.";
pub const UNREGISTER_RETRY: &str = "Failed to unregister. Please try again.";
pub const TEACHERS_ONLY: &str = "Only teachers can unregister participants";

/// A user-initiated event on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The page finished loading.
    Start,
    /// The user icon in the header.
    ToggleAccount,
    CloseLogin,
    Login { username: String, password: String },
    Logout,
    Signup { email: String, activity: String },
    Unregister { activity: String, email: String },
}

struct Inner<A, S, U> {
    api: A,
    store: S,
    ui: U,
    config: ClientConfig,
    session: RefCell<Session>,
    // Sequence numbers of list refreshes: last one sent, last one drawn.
    issued: Cell<u64>,
    applied: Cell<u64>,
}

/// Drives the signup page: owns the admin session and runs every user action against the
/// API, reporting back through the `Ui`.
///
/// Cloning is cheap and clones share state. Nothing borrowed from the session is held
/// across an await, so handlers may interleave at network calls.
pub struct Controller<A, S, U> {
    inner: Rc<Inner<A, S, U>>,
}

impl<A, S, U> Clone for Controller<A, S, U> {
    fn clone(&self) -> Self {
        Controller {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, S, U> Controller<A, S, U>
where
    A: ActivityApi,
    S: TokenStore,
    U: Ui,
{
    pub fn new(api: A, store: S, ui: U, config: ClientConfig) -> Self {
        Controller {
            inner: Rc::new(Inner {
                api,
                store,
                ui,
                config,
                session: RefCell::new(Session::anonymous()),
                issued: Cell::new(0),
                applied: Cell::new(0),
            }),
        }
    }

    /// Runs the handler registered for `action` to completion.
    pub async fn handle(&self, action: Action) {
        match action {
            Action::Start => self.start().await,
            Action::ToggleAccount => self.toggle_account(),
            Action::CloseLogin => self.close_login(),
            Action::Login { username, password } => self.login(username, password).await,
            Action::Logout => self.logout(),
            Action::Signup { email, activity } => self.signup(&email, &activity).await,
            Action::Unregister { activity, email } => self.unregister(&activity, &email).await,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.borrow().is_authenticated()
    }

    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Page start-up: restore the stored session, optionally check it with the server,
    /// then draw the list.
    pub async fn start(&self) {
        self.restore_session();
        if self.inner.config.verify_session_on_start {
            self.verify_session().await;
        }
        self.sync_mode();
        self.refresh().await;
    }

    pub fn restore_session(&self) {
        let session = Session::restore(&self.inner.store, &self.inner.config, Utc::now());
        log!(
            "Starting in {} mode",
            if session.is_authenticated() { "teacher" } else { "student" }
        );
        *self.inner.session.borrow_mut() = session;
    }

    async fn verify_session(&self) {
        let Some(token) = self.session().token().map(str::to_string) else {
            return;
        };
        match self.inner.api.session_status(&token).await {
            Ok(status) if !status.authenticated => {
                log!("Stored admin token was rejected by the server, discarding it");
                self.end_session();
            }
            Ok(status) => {
                if let Some(name) = status.teacher_name {
                    self.inner.session.borrow_mut().set_teacher_name(
                        &self.inner.store,
                        &self.inner.config,
                        name,
                    );
                }
            }
            // Keep the token; a dead one shows up on the next failing call.
            Err(e) => error!("Error checking admin session: {}", e),
        }
    }

    fn mode(&self) -> AdminMode {
        let session = self.inner.session.borrow();
        AdminMode {
            authenticated: session.is_authenticated(),
            teacher_name: session.teacher_name().map(str::to_string),
        }
    }

    fn sync_mode(&self) {
        let mode = self.mode();
        self.inner.ui.apply_mode(&mode);
    }

    fn notify(&self, notice: Notice) {
        self.inner.ui.show_notice(notice);
    }

    fn end_session(&self) {
        self.inner
            .session
            .borrow_mut()
            .end(&self.inner.store, &self.inner.config);
    }

    /// User icon: log out when signed in, otherwise open the login dialog.
    pub fn toggle_account(&self) {
        if self.is_authenticated() {
            self.logout();
        } else {
            self.inner.ui.open_login_dialog();
        }
    }

    pub fn close_login(&self) {
        self.inner.ui.close_login_dialog();
    }

    pub async fn login(&self, username: String, password: String) {
        let credentials = Credentials { username, password };
        match self.inner.api.login(&credentials).await {
            Ok(reply) => match reply.token {
                Some(token) => {
                    self.inner.session.borrow_mut().begin(
                        &self.inner.store,
                        &self.inner.config,
                        token,
                        reply.teacher_name,
                        Utc::now(),
                    );
                    self.inner.ui.close_login_dialog();
                    self.inner.ui.reset_login_form();
                    self.notify(Notice::success(LOGIN_SUCCESS));
                    self.sync_mode();
                }
                None => {
                    let text = reply.message.unwrap_or_else(|| LOGIN_FAILED.to_string());
                    self.notify(Notice::error(text));
                }
            },
            Err(e) if e.is_transport() => {
                error!("Login error: {}", e);
                self.notify(Notice::error(LOGIN_RETRY));
            }
            Err(e) => self.notify(Notice::error(e.detail_or(LOGIN_FAILED))),
        }
    }

    /// Forgets the session locally. The server is not told.
    pub fn logout(&self) {
        self.end_session();
        self.sync_mode();
        self.notify(Notice::info(LOGGED_OUT));
    }

    fn expire_session(&self) {
        log!("Admin session expired");
        self.end_session();
        self.sync_mode();
        self.notify(Notice::error(SESSION_EXPIRED));
    }

    /// Fetches the activity list and redraws it from scratch.
    pub async fn refresh(&self) {
        let seq = self.inner.issued.get() + 1;
        self.inner.issued.set(seq);

        let result = self.inner.api.list_activities().await;

        if self.inner.config.discard_stale_refreshes && seq < self.inner.applied.get() {
            log!(
                "Discarding activity list {} (list {} already shown)",
                seq,
                self.inner.applied.get()
            );
            return;
        }
        self.inner.applied.set(seq);

        match result {
            Ok(activities) => {
                let admin = self.is_authenticated();
                let cards = activities
                    .iter()
                    .map(|activity| ActivityCard::new(activity, admin))
                    .collect();
                self.inner.ui.render_activities(cards);
                // The session may have changed while the request was in flight.
                self.sync_mode();
            }
            Err(e) => {
                error!("Error fetching activities: {}", e);
                self.inner.ui.render_load_failure(LOAD_FAILED);
            }
        }
    }

    pub async fn signup(&self, email: &str, activity: &str) {
        let token = self.session().token().map(str::to_string);
        match self
            .inner
            .api
            .signup(activity, email, token.as_deref())
            .await
        {
            Ok(reply) => {
                self.notify(Notice::success(reply.message));
                self.inner.ui.reset_signup_form();
                self.refresh().await;
            }
            Err(e) => self.report_failure(e, token.is_some(), SIGNUP_RETRY, "Error signing up"),
        }
    }

    pub async fn unregister(&self, activity: &str, email: &str) {
        let Some(token) = self.session().token().map(str::to_string) else {
            self.notify(Notice::error(TEACHERS_ONLY));
            return;
        };
        match self.inner.api.unregister(activity, email, &token).await {
            Ok(reply) => {
                self.notify(Notice::success(reply.message));
                self.refresh().await;
            }
            Err(e) => self.report_failure(e, true, UNREGISTER_RETRY, "Error unregistering"),
        }
    }

    fn report_failure(&self, e: ApiError, sent_token: bool, retry: &str, context: &str) {
        if e.is_transport() {
            error!("{}: {}", context, e);
            self.notify(Notice::error(retry));
        } else if sent_token && e.is_unauthorized() {
            self.expire_session();
        } else {
            self.notify(Notice::error(e.detail_or(GENERIC_FAILURE)));
        }
    }
}
