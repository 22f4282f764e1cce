// src/app/table/notify.rs
// Notification bridge: the toast/confirm facility the host provides to the controller.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub title: Option<String>,
    /// Non-stacking toasts are dropped when an identical one is already showing.
    pub stacking: bool,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            title: None,
            stacking: true,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Danger, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn non_stacking(mut self) -> Self {
        self.stacking = false;
        self
    }
}

/// A yes/no question. The answer is reported back through
/// `TableController::resolve_confirmation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub message: String,
}

pub trait Notifier {
    fn toast(&mut self, toast: Toast);
    fn confirm(&mut self, prompt: ConfirmPrompt);
}
