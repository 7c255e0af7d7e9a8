//! User-facing notices emitted by lab operations

use console::style;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient message for whoever drives the lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

/// Notification sink
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Keeps every notice it receives
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Notices of one kind, oldest first
    pub fn of_kind(&self, kind: NoticeKind) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.kind == kind)
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Prints notices to the terminal
///
/// Success and info go to stdout and are silenced by `quiet`; errors are
/// left to the caller's error report, so they are only echoed to stderr when
/// `echo_errors` is set.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
    echo_errors: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            echo_errors: false,
        }
    }

    pub fn echo_errors(mut self, echo: bool) -> Self {
        self.echo_errors = echo;
        self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success if !self.quiet => {
                println!("{} {}", style("✓").green(), notice.message);
            }
            NoticeKind::Info if !self.quiet => {
                println!("{} {}", style("i").cyan(), notice.message);
            }
            NoticeKind::Error if self.echo_errors => {
                eprintln!("{} {}", style("✗").red(), notice.message);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_log_filters_by_kind() {
        let mut log = NoticeLog::new();
        log.notify(Notice::success("saved"));
        log.notify(Notice::error("boom"));
        log.notify(Notice::info("seeded"));

        assert_eq!(log.notices().len(), 3);
        let errors: Vec<_> = log.of_kind(NoticeKind::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "boom");
        assert_eq!(log.last().unwrap().kind, NoticeKind::Info);
    }
}
