use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Year,
    Genre,
}

impl EditField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "New title:",
            Self::Year => "New year:",
            Self::Genre => "New genre:",
        }
    }
}

/// Asks the user for a replacement value, pre-filled with `current`.
/// `None` means the user cancelled.
#[async_trait]
pub trait EditDialog: Send + Sync {
    async fn ask(&self, field: EditField, current: &str) -> Option<String>;
}

/// Dialog for hosts that cannot prompt: every edit is cancelled.
pub struct MissingEditDialog;

#[async_trait]
impl EditDialog for MissingEditDialog {
    async fn ask(&self, _field: EditField, _current: &str) -> Option<String> {
        None
    }
}
