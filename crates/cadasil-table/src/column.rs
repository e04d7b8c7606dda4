//! Column descriptors.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Failure raised by a cell renderer. Confined to the cell it occurred in.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Custom cell renderer: `(value, row) -> text`.
pub type Renderer<R> = Box<dyn Fn(&Value, &R) -> Result<String, RenderError>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Display hint carried through to the rendered cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub alignment: Alignment,
    pub emphasis: bool,
}

/// One table column: which field it shows and how.
pub struct Column<R> {
    key: String,
    label: String,
    sortable: bool,
    renderer: Option<Renderer<R>>,
    style: CellStyle,
}

impl<R> Column<R> {
    /// A sortable column showing the raw value at `key`.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            renderer: None,
            style: CellStyle::default(),
        }
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value, &R) -> Result<String, RenderError> + 'static,
    {
        self.renderer = Some(Box::new(renderer));
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.style.alignment = alignment;
        self
    }

    #[must_use]
    pub fn emphasized(mut self) -> Self {
        self.style.emphasis = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn style(&self) -> CellStyle {
        self.style
    }

    pub(crate) fn renderer(&self) -> Option<&Renderer<R>> {
        self.renderer.as_ref()
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("renderer", &self.renderer.is_some())
            .field("style", &self.style)
            .finish()
    }
}
