/// Placeholder shown by an empty editable surface.
pub const DEFAULT_PLACEHOLDER: &str = "Write something...";

/// Construction options for an [`Editor`](super::Editor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Text shown while the document is empty
    pub placeholder: Option<String>,
    /// Whether user-level commands may change the document
    pub editable: bool,
    /// Whether the editor starts focused
    pub autofocus: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            placeholder: Some(DEFAULT_PLACEHOLDER.to_string()),
            editable: true,
            autofocus: false,
        }
    }
}

impl EditorOptions {
    /// Options for a permanently non-editable instance.
    pub fn read_only() -> Self {
        Self::default().with_editable(false)
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub const fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub const fn with_autofocus(mut self, autofocus: bool) -> Self {
        self.autofocus = autofocus;
        self
    }
}
