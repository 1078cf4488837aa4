#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    /// CSS class for the message element.
    pub fn class(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind: NoticeKind::Info,
        }
    }
}

/// Identifies one `NoticeBoard::show` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTicket(u64);

/// The single status message slot. A new notice replaces the old one at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBoard {
    last: Option<Notice>,
    visible: bool,
    shown: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) -> NoticeTicket {
        self.shown += 1;
        self.last = Some(notice);
        self.visible = true;
        NoticeTicket(self.shown)
    }

    /// Hides the board if `ticket` still belongs to the notice on display. Returns whether
    /// anything was hidden.
    pub fn expire(&mut self, ticket: NoticeTicket) -> bool {
        if self.visible && ticket.0 == self.shown {
            self.visible = false;
            true
        } else {
            false
        }
    }

    /// The notice currently on screen.
    pub fn visible(&self) -> Option<&Notice> {
        self.last.as_ref().filter(|_| self.visible)
    }

    /// The most recent notice, even once hidden. The element keeps its text while hidden.
    pub fn last(&self) -> Option<&Notice> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_expire() {
        let mut board = NoticeBoard::new();
        assert_eq!(board.visible(), None);

        let ticket = board.show(Notice::success("Signed up c@x.com"));
        assert_eq!(board.visible().map(|n| n.text.as_str()), Some("Signed up c@x.com"));

        assert!(board.expire(ticket));
        assert_eq!(board.visible(), None);
        assert_eq!(board.last().map(|n| n.kind), Some(NoticeKind::Success));
        // A second expiry is a no-op.
        assert!(!board.expire(ticket));
    }

    #[test]
    fn test_new_notice_replaces_old_immediately() {
        let mut board = NoticeBoard::new();
        let first = board.show(Notice::info("Logged out successfully"));
        let second = board.show(Notice::error("Login failed"));

        let shown = board.visible().cloned();
        assert_eq!(shown, Some(Notice::error("Login failed")));

        // The first notice's timer fires; the second must stay.
        assert!(!board.expire(first));
        assert_eq!(board.visible().map(|n| n.kind), Some(NoticeKind::Error));

        assert!(board.expire(second));
        assert_eq!(board.visible(), None);
    }

    #[test]
    fn test_kind_classes() {
        assert_eq!(NoticeKind::Success.class(), "success");
        assert_eq!(NoticeKind::Error.class(), "error");
        assert_eq!(NoticeKind::Info.class(), "info");
    }
}
