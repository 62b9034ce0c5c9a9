use super::controller::IgnoreReason;

/// User-facing events emitted by session controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A slow session start is under way.
    Starting { path: String },
    Accepted { path: String },
    Ignored { path: String, reason: IgnoreReason },
    Failed { path: String, message: String },
    Terminated,
}

pub type NoticeCallback = Box<dyn Fn(Notice) + Send + Sync>;

#[derive(Default)]
pub struct NoticeReporter {
    callback: Option<NoticeCallback>,
}

impl NoticeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: NoticeCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, notice: Notice) {
        if let Some(cb) = &self.callback {
            cb(notice);
        }
    }
}

impl std::fmt::Debug for NoticeReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeReporter")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
