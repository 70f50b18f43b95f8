//! Render model.
//!
//! Components render into a [`Rendered`] tree describing what a host should
//! draw. Hosts turn it into pixels, HTML or test assertions.

use super::Scope;
use super::buttons::Toggle;

/// Something that can render under a [`Scope`].
pub trait View {
    fn render(&mut self, scope: &Scope<'_>) -> Rendered;
}

impl<F> View for F
where
    F: FnMut(&Scope<'_>) -> Rendered,
{
    fn render(&mut self, scope: &Scope<'_>) -> Rendered {
        self(scope)
    }
}

/// Output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Nothing to draw
    Empty,
    Fragment(Vec<Rendered>),
    /// An editor surface, editable or not
    Surface(SurfaceView),
    Button(ButtonView),
    /// Inline error indicator
    Error(String),
}

impl Rendered {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Every surface in the tree, depth first.
    pub fn surfaces(&self) -> Vec<&SurfaceView> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let Self::Surface(surface) = node {
                out.push(surface);
            }
        });
        out
    }

    /// Every button in the tree, depth first.
    pub fn buttons(&self) -> Vec<&ButtonView> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let Self::Button(button) = node {
                out.push(button);
            }
        });
        out
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        if let Self::Fragment(children) = self {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

/// A rendered editor surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceView {
    /// Document markup
    pub html: String,
    pub editable: bool,
    pub focused: bool,
    /// Placeholder, only while the document is empty
    pub placeholder: Option<String>,
    /// Whether a block drag handle is shown
    pub drag_handle: bool,
    pub class: String,
}

/// Visual variant of a toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    /// Emphasized, the format is active
    Default,
    /// Neutral
    #[default]
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub toggle: Toggle,
    pub variant: ButtonVariant,
    pub class: String,
}

/// Join class names, skipping empty ones.
pub(crate) fn join_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> String {
    classes
        .into_iter()
        .map(str::trim)
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_classes_skips_empty() {
        assert_eq!(join_classes(["a", "", "  b "]), "a b");
        assert_eq!(join_classes([]), "");
    }

    #[test]
    fn test_closure_is_a_view() {
        let mut view = |_: &Scope<'_>| Rendered::Error("boom".to_string());
        assert_eq!(view.render(&Scope::root()), Rendered::Error("boom".to_string()));
    }

    #[test]
    fn test_surfaces_walks_fragments() {
        let surface = SurfaceView {
            html: "<p></p>".to_string(),
            editable: true,
            focused: false,
            placeholder: None,
            drag_handle: false,
            class: String::new(),
        };
        let tree = Rendered::Fragment(vec![
            Rendered::Empty,
            Rendered::Fragment(vec![Rendered::Surface(surface.clone())]),
        ]);
        assert_eq!(tree.surfaces(), vec![&surface]);
        assert!(tree.buttons().is_empty());
    }
}
