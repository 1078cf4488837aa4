use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use crate::config::{ClientConfig, CONFIG_ELEMENT_ID};
use crate::controller::Action;
use crate::model::{ActivityCard, ParticipantRow};
use crate::ui::{ListView, SignalUi};

#[cfg(feature = "hydrate")]
use crate::browser::BrowserController;
#[cfg(feature = "hydrate")]
use leptos::reactive::owner::LocalStorage;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    let config = use_context::<ClientConfig>().unwrap_or_default();

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <script
                    type="application/json"
                    id=CONFIG_ELEMENT_ID
                    inner_html=config.to_embedded()
                ></script>
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/activity-signup.css" />
        <Title text="Mergington High School Activities" />

        <Router>
            <main>
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=path!("/") view=SignupPage />
                </Routes>
            </main>
        </Router>
    }
}

/// Hands page events to the controller. Handlers only ever run in the browser, so the
/// server-rendered page carries no controller at all.
#[derive(Clone, Copy)]
struct Dispatcher {
    #[cfg(feature = "hydrate")]
    controller: StoredValue<BrowserController, LocalStorage>,
}

impl Dispatcher {
    fn new(config: ClientConfig, ui: SignalUi) -> Self {
        #[cfg(feature = "hydrate")]
        {
            Dispatcher {
                controller: StoredValue::new_local(crate::browser::controller(config, ui)),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, ui);
            Dispatcher {}
        }
    }

    fn dispatch(self, action: Action) {
        #[cfg(feature = "hydrate")]
        {
            let controller = self.controller.get_value();
            leptos::task::spawn_local(async move { controller.handle(action).await });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = action;
    }
}

fn page_config() -> ClientConfig {
    #[cfg(feature = "hydrate")]
    {
        crate::browser::embedded_config()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        use_context::<ClientConfig>().unwrap_or_default()
    }
}

#[component]
fn SignupPage() -> impl IntoView {
    let config = page_config();
    let ui = SignalUi::new(config.notice_timeout_ms);
    let dispatcher = Dispatcher::new(config, ui);

    // Effects only run after hydration, so this fires once in the browser.
    Effect::new(move || dispatcher.dispatch(Action::Start));

    let is_admin = move || ui.mode.with(|m| m.authenticated);

    let on_signup = move |ev: SubmitEvent| {
        ev.prevent_default();
        dispatcher.dispatch(Action::Signup {
            email: ui.email.get_untracked(),
            activity: ui.selected_activity.get_untracked(),
        });
    };

    let notice_class = move || {
        ui.notice.with(|board| match (board.visible(), board.last()) {
            (Some(notice), _) => notice.kind.class().to_string(),
            (None, Some(notice)) => format!("{} hidden", notice.kind.class()),
            (None, None) => "hidden".to_string(),
        })
    };
    let notice_text = move || {
        ui.notice
            .with(|board| board.last().map(|n| n.text.clone()).unwrap_or_default())
    };

    let activity_list = move || match ui.list.get() {
        ListView::Loading => view! { <p>"Loading activities..."</p> }.into_any(),
        ListView::Failed(text) => view! { <p>{text}</p> }.into_any(),
        ListView::Loaded(cards) => cards
            .into_iter()
            .map(|card| view! { <ActivityCardView card dispatcher /> })
            .collect_view()
            .into_any(),
    };

    view! {
        <header>
            <div class="user-controls">
                <button
                    id="user-icon"
                    class="user-icon"
                    title="Teacher login"
                    on:click=move |_| dispatcher.dispatch(Action::ToggleAccount)
                >
                    "👤"
                </button>
                <div
                    id="admin-status"
                    class="admin-status"
                    style:display=move || if is_admin() { "flex" } else { "none" }
                >
                    <span>{move || ui.mode.with(|m| m.status_label())}</span>
                    <button id="logout-btn" on:click=move |_| dispatcher.dispatch(Action::Logout)>
                        "Logout"
                    </button>
                </div>
            </div>
            <h1>"Mergington High School"</h1>
            <h2>"Extracurricular Activities"</h2>
        </header>

        <div class="page">
            <section id="activities-container">
                <h3>"Available Activities"</h3>
                <div id="activities-list">{activity_list}</div>
            </section>

            <section id="signup-container">
                <h3>"Sign Up for an Activity"</h3>
                <div
                    id="admin-notice"
                    class="notice admin-notice"
                    style:display=move || if is_admin() { "block" } else { "none" }
                >
                    "Teacher mode: you can unregister students from activities."
                </div>
                <div
                    id="student-notice"
                    class="notice student-notice"
                    style:display=move || if is_admin() { "none" } else { "block" }
                >
                    "Only teachers can unregister students. Log in to manage participants."
                </div>
                <form id="signup-form" on:submit=on_signup>
                    <div class="form-group">
                        <label for="email">"Student Email:"</label>
                        <input
                            type="email"
                            id="email"
                            required
                            placeholder="your-email@mergington.edu"
                            prop:value=move || ui.email.get()
                            on:input=move |ev| ui.email.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-group">
                        <label for="activity">"Select Activity:"</label>
                        <select
                            id="activity"
                            required
                            prop:value=move || ui.selected_activity.get()
                            on:change=move |ev| ui.selected_activity.set(event_target_value(&ev))
                        >
                            <option value="">"-- Select an activity --"</option>
                            {move || {
                                ui.activity_options
                                    .get()
                                    .into_iter()
                                    .map(|name| {
                                        let label = name.clone();
                                        view! { <option value=name>{label}</option> }
                                    })
                                    .collect_view()
                            }}
                        </select>
                    </div>
                    <button type="submit">"Sign Up"</button>
                </form>
                <div id="message" class=notice_class>
                    {notice_text}
                </div>
            </section>
        </div>

        <LoginModal ui dispatcher />
    }
}

#[component]
fn ActivityCardView(card: ActivityCard, dispatcher: Dispatcher) -> impl IntoView {
    let availability = card.availability();
    let participants = if card.participants.is_empty() {
        view! {
            <p>
                <em>"No participants yet"</em>
            </p>
        }
        .into_any()
    } else {
        view! {
            <div class="participants-section">
                <h5>"Participants:"</h5>
                <ul class="participants-list">
                    {card
                        .participants
                        .into_iter()
                        .map(|row| view! { <ParticipantItem row dispatcher /> })
                        .collect_view()}
                </ul>
            </div>
        }
        .into_any()
    };

    view! {
        <div class="activity-card">
            <h4>{card.name}</h4>
            <p>{card.description}</p>
            <p>
                <strong>"Schedule:"</strong>
                " "
                {card.schedule}
            </p>
            <p>
                <strong>"Availability:"</strong>
                " "
                {availability}
            </p>
            <div class="participants-container">{participants}</div>
        </div>
    }
}

#[component]
fn ParticipantItem(row: ParticipantRow, dispatcher: Dispatcher) -> impl IntoView {
    let ParticipantRow {
        activity,
        email,
        unregister_enabled,
    } = row;
    let activity_attr = activity.clone();
    let email_attr = email.clone();
    let label = email.clone();

    let unregister = move |_| {
        dispatcher.dispatch(Action::Unregister {
            activity: activity.clone(),
            email: email.clone(),
        })
    };

    view! {
        <li>
            <span class="participant-email">{label}</span>
            <button
                class="delete-btn"
                data-activity=activity_attr
                data-email=email_attr
                disabled=!unregister_enabled
                on:click=unregister
            >
                "❌"
            </button>
        </li>
    }
}

#[component]
fn LoginModal(ui: SignalUi, dispatcher: Dispatcher) -> impl IntoView {
    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        dispatcher.dispatch(Action::Login {
            username: ui.username.get_untracked(),
            password: ui.password.get_untracked(),
        });
    };

    // A click on the backdrop closes the dialog; clicks inside it stop at the content box.
    view! {
        <div
            id="login-modal"
            class="modal"
            style:display=move || if ui.login_open.get() { "block" } else { "none" }
            on:click=move |_| dispatcher.dispatch(Action::CloseLogin)
        >
            <div class="modal-content" on:click=|ev| ev.stop_propagation()>
                <span class="close" on:click=move |_| dispatcher.dispatch(Action::CloseLogin)>
                    "×"
                </span>
                <h3>"Teacher Login"</h3>
                <form id="login-form" on:submit=submit>
                    <div class="form-group">
                        <label for="username">"Username:"</label>
                        <input
                            type="text"
                            id="username"
                            required
                            prop:value=move || ui.username.get()
                            on:input=move |ev| ui.username.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="form-group">
                        <label for="password">"Password:"</label>
                        <input
                            type="password"
                            id="password"
                            required
                            prop:value=move || ui.password.get()
                            on:input=move |ev| ui.password.set(event_target_value(&ev))
                        />
                    </div>
                    <button type="submit">"Login"</button>
                </form>
            </div>
        </div>
    }
}
