//! Site configuration form.
//!
//! Holds the field values being edited, validates them on submit and hands
//! valid values to [`write_site_config`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ActionResult, SiteConfig, read_site_config, write_site_config};

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Url,
    AuthorName,
    AuthorUrl,
}

impl Field {
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Description,
        Self::Url,
        Self::AuthorName,
        Self::AuthorUrl,
    ];

    /// Key of the field in the stored JSON.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Url => "url",
            Self::AuthorName => "authorName",
            Self::AuthorUrl => "authorUrl",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Url => "Site URL",
            Self::AuthorName => "Author Name",
            Self::AuthorUrl => "Author URL",
        }
    }

    pub const fn description(self) -> Option<&'static str> {
        match self {
            Self::Title => Some("Title of the site. (tab title)"),
            _ => None,
        }
    }
}

/// A validation failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Site title is required.")]
    TitleRequired,
}

impl FieldError {
    pub const fn field(&self) -> Field {
        match self {
            Self::TitleRequired => Field::Title,
        }
    }
}

/// How a submit result should be announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was written
    Invalid(Vec<FieldError>),
    /// The write was attempted
    Saved(ActionResult),
}

impl SubmitOutcome {
    /// Toast to show, if any. Validation errors show inline instead.
    pub fn toast(&self) -> Option<(ToastLevel, &str)> {
        match self {
            Self::Invalid(_) => None,
            Self::Saved(result) if result.success => {
                Some((ToastLevel::Success, result.message.as_str()))
            }
            Self::Saved(result) => Some((ToastLevel::Error, result.message.as_str())),
        }
    }
}

/// Form state for editing the site configuration under a project root.
#[derive(Debug, Clone)]
pub struct SiteConfigForm {
    root: PathBuf,
    values: SiteConfig,
    touched: HashSet<Field>,
    errors: Vec<FieldError>,
}

impl SiteConfigForm {
    /// A form prefilled from `existing`, or blank.
    pub fn new(root: impl Into<PathBuf>, existing: Option<&SiteConfig>) -> Self {
        Self {
            root: root.into(),
            values: existing.cloned().unwrap_or_default(),
            touched: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// A form prefilled from the configuration stored under `root`.
    pub fn load(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let existing = read_site_config(&root);
        Self::new(root, existing.as_ref())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn values(&self) -> &SiteConfig {
        &self.values
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.values.title,
            Field::Description => &self.values.description,
            Field::Url => &self.values.url,
            Field::AuthorName => &self.values.author_name,
            Field::AuthorUrl => &self.values.author_url,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.values.title = value,
            Field::Description => self.values.description = value,
            Field::Url => self.values.url = value,
            Field::AuthorName => self.values.author_name = value,
            Field::AuthorUrl => self.values.author_url = value,
        }
        self.touched.insert(field);
    }

    /// Check the current values.
    ///
    /// # Errors
    /// Returns every failing rule.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.values.title.is_empty() {
            errors.push(FieldError::TitleRequired);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Errors to display for `field`: only after it was touched.
    pub fn errors_for(&self, field: Field) -> Vec<&FieldError> {
        if !self.touched.contains(&field) {
            return Vec::new();
        }
        self.errors
            .iter()
            .filter(|error| error.field() == field)
            .collect()
    }

    /// Validate and, when valid, write the configuration.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.touched.extend(Field::ALL);
        match self.validate() {
            Ok(()) => {
                self.errors.clear();
                let result = write_site_config(&self.root, &self.values);
                tracing::info!(success = result.success, "site config submitted");
                SubmitOutcome::Saved(result)
            }
            Err(errors) => {
                tracing::debug!(count = errors.len(), "site config form invalid");
                self.errors.clone_from(&errors);
                SubmitOutcome::Invalid(errors)
            }
        }
    }
}
