use leptos::prelude::*;
use std::future::Future;

use crate::model::ActivityCard;
use crate::notice::{Notice, NoticeBoard, NoticeTicket};

/// Which affordances the page should expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminMode {
    pub authenticated: bool,
    pub teacher_name: Option<String>,
}

impl AdminMode {
    pub fn status_label(&self) -> String {
        match &self.teacher_name {
            Some(name) => format!("Logged in as {name}"),
            None => "Logged in as teacher".to_string(),
        }
    }
}

/// What the activity list area shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListView {
    #[default]
    Loading,
    Loaded(Vec<ActivityCard>),
    Failed(String),
}

/// The page surface driven by the controller.
pub trait Ui {
    fn show_notice(&self, notice: Notice);
    /// Replaces the whole list, and the activity selector with it.
    fn render_activities(&self, cards: Vec<ActivityCard>);
    fn render_load_failure(&self, text: &str);
    /// Admin/student notices, status indicator and every unregister control.
    fn apply_mode(&self, mode: &AdminMode);
    fn open_login_dialog(&self);
    fn close_login_dialog(&self);
    fn reset_login_form(&self);
    fn reset_signup_form(&self);
}

/// Enables or disables every unregister control already drawn.
pub fn sync_controls(cards: &mut [ActivityCard], enabled: bool) {
    for row in cards.iter_mut().flat_map(|c| c.participants.iter_mut()) {
        row.unregister_enabled = enabled;
    }
}

/// Hides the notice behind `ticket` once `delay` completes. A notice shown in the meantime
/// stays up.
pub async fn hide_after(
    board: RwSignal<NoticeBoard>,
    ticket: NoticeTicket,
    delay: impl Future<Output = ()>,
) {
    delay.await;
    board.update(|b| {
        b.expire(ticket);
    });
}

/// Reactive state behind the Leptos components.
#[derive(Debug, Clone, Copy)]
pub struct SignalUi {
    pub notice: RwSignal<NoticeBoard>,
    pub list: RwSignal<ListView>,
    pub activity_options: RwSignal<Vec<String>>,
    pub mode: RwSignal<AdminMode>,
    pub login_open: RwSignal<bool>,
    pub username: RwSignal<String>,
    pub password: RwSignal<String>,
    pub email: RwSignal<String>,
    pub selected_activity: RwSignal<String>,
    notice_timeout_ms: u32,
}

impl SignalUi {
    pub fn new(notice_timeout_ms: u32) -> Self {
        SignalUi {
            notice: RwSignal::new(NoticeBoard::new()),
            list: RwSignal::new(ListView::Loading),
            activity_options: RwSignal::new(Vec::new()),
            mode: RwSignal::new(AdminMode::default()),
            login_open: RwSignal::new(false),
            username: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            selected_activity: RwSignal::new(String::new()),
            notice_timeout_ms,
        }
    }

    pub fn notice_timeout_ms(&self) -> u32 {
        self.notice_timeout_ms
    }
}

impl Ui for SignalUi {
    fn show_notice(&self, notice: Notice) {
        let ticket = self.notice.try_update(|board| board.show(notice));

        #[cfg(feature = "hydrate")]
        {
            if let Some(ticket) = ticket {
                let delay = gloo_timers::future::TimeoutFuture::new(self.notice_timeout_ms);
                leptos::task::spawn_local(hide_after(self.notice, ticket, delay));
            }
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = ticket;
    }

    fn render_activities(&self, cards: Vec<ActivityCard>) {
        self.activity_options
            .set(cards.iter().map(|c| c.name.clone()).collect());
        self.list.set(ListView::Loaded(cards));
    }

    fn render_load_failure(&self, text: &str) {
        self.list.set(ListView::Failed(text.to_string()));
    }

    fn apply_mode(&self, mode: &AdminMode) {
        let enabled = mode.authenticated;
        self.list.update(|list| {
            if let ListView::Loaded(cards) = list {
                sync_controls(cards, enabled);
            }
        });
        self.mode.set(mode.clone());
    }

    fn open_login_dialog(&self) {
        self.login_open.set(true);
    }

    fn close_login_dialog(&self) {
        self.login_open.set(false);
    }

    fn reset_login_form(&self) {
        self.username.set(String::new());
        self.password.set(String::new());
    }

    fn reset_signup_form(&self) {
        self.email.set(String::new());
        self.selected_activity.set(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Activity;
    use leptos::reactive::owner::Owner;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn card(participants: &[&str]) -> ActivityCard {
        ActivityCard::new(
            &Activity {
                name: "Chess Club".to_string(),
                description: String::new(),
                schedule: String::new(),
                max_participants: 10,
                participants: participants.iter().map(|p| p.to_string()).collect(),
            },
            false,
        )
    }

    #[test]
    fn test_sync_controls_touches_every_row() {
        let mut cards = vec![card(&["a@x.com", "b@x.com"]), card(&[]), card(&["c@x.com"])];
        sync_controls(&mut cards, true);
        assert!(cards
            .iter()
            .flat_map(|c| c.participants.iter())
            .all(|p| p.unregister_enabled));
        sync_controls(&mut cards, false);
        assert!(cards
            .iter()
            .flat_map(|c| c.participants.iter())
            .all(|p| !p.unregister_enabled));
    }

    #[test]
    fn test_status_label() {
        let mode = AdminMode {
            authenticated: true,
            teacher_name: Some("Ms. Lee".to_string()),
        };
        assert_eq!(mode.status_label(), "Logged in as Ms. Lee");
        assert_eq!(AdminMode::default().status_label(), "Logged in as teacher");
    }

    #[test]
    fn test_signal_ui_mode_resyncs_rendered_controls() {
        let owner = Owner::new();
        owner.set();

        let ui = SignalUi::new(5000);
        assert_eq!(ui.notice_timeout_ms(), 5000);
        ui.render_activities(vec![card(&["a@x.com"]), card(&["b@x.com"])]);
        assert_eq!(ui.activity_options.get_untracked().len(), 2);

        ui.apply_mode(&AdminMode {
            authenticated: true,
            teacher_name: None,
        });
        ui.list.with_untracked(|list| match list {
            ListView::Loaded(cards) => assert!(cards
                .iter()
                .flat_map(|c| c.participants.iter())
                .all(|p| p.unregister_enabled)),
            other => panic!("unexpected list state {other:?}"),
        });

        ui.show_notice(Notice::info("Logged out successfully"));
        assert!(ui.notice.with_untracked(|b| b.visible().is_some()));

        ui.email.set("c@x.com".to_string());
        ui.reset_signup_form();
        assert!(ui.email.get_untracked().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_hides_after_timeout() {
        let owner = Owner::new();
        owner.set();
        let board = RwSignal::new(NoticeBoard::new());

        let ticket = board
            .try_update(|b| b.show(Notice::success("Signed up c@x.com")))
            .unwrap();
        let hide = hide_after(board, ticket, sleep(Duration::from_millis(5000)));
        tokio::pin!(hide);

        assert!(timeout(Duration::from_millis(4999), &mut hide).await.is_err());
        assert!(board.with_untracked(|b| b.visible().is_some()));

        timeout(Duration::from_millis(1), &mut hide).await.unwrap();
        assert_eq!(board.with_untracked(|b| b.visible().cloned()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_notice_timer_leaves_successor() {
        let owner = Owner::new();
        owner.set();
        let board = RwSignal::new(NoticeBoard::new());

        let first = board
            .try_update(|b| b.show(Notice::info("Logged out successfully")))
            .unwrap();
        let hide_first = hide_after(board, first, sleep(Duration::from_millis(5000)));
        sleep(Duration::from_millis(2000)).await;

        let second = board
            .try_update(|b| b.show(Notice::error("Login failed")))
            .unwrap();
        let hide_second = hide_after(board, second, sleep(Duration::from_millis(5000)));
        tokio::pin!(hide_second);

        // 5000 ms after the first notice: the second is still up.
        hide_first.await;
        assert_eq!(
            board.with_untracked(|b| b.visible().cloned()),
            Some(Notice::error("Login failed"))
        );

        assert!(timeout(Duration::from_millis(1999), &mut hide_second)
            .await
            .is_err());
        assert!(board.with_untracked(|b| b.visible().is_some()));

        timeout(Duration::from_millis(1), &mut hide_second)
            .await
            .unwrap();
        assert_eq!(board.with_untracked(|b| b.visible().cloned()), None);
    }
}
