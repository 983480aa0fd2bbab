//! HTML query layer.
//!
//! Thin helpers over `scraper` for the lookups the upstream's pages need:
//! element by tag and attribute value, by tag and class, by tag and exact
//! inner text, or by tag alone. Lookups that match nothing return
//! [`OrderingError::NotFound`]; callers decide whether absence is fatal or a
//! signal. [`optional_text`] is the one lenient read path, for display fields
//! that may legitimately be missing.

use core::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::error::{OrderingError, Result};

/// An element predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `<tag attr="value">`, matching the whole attribute value.
    Attr {
        tag: String,
        attr: String,
        value: String,
    },
    /// `<tag>` whose trimmed inner text equals `text`.
    Text { tag: String, text: String },
    /// Any `<tag>`.
    Tag { tag: String },
}

impl Query {
    /// Match on an exact attribute value.
    #[must_use]
    pub fn attr(tag: &str, attr: &str, value: &str) -> Self {
        Self::Attr {
            tag: tag.to_owned(),
            attr: attr.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Match on the exact `class` attribute (all classes, in order).
    #[must_use]
    pub fn class(tag: &str, class: &str) -> Self {
        Self::attr(tag, "class", class)
    }

    /// Match any element with this tag name.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self::Tag {
            tag: tag.to_owned(),
        }
    }

    /// Match on exact inner text.
    #[must_use]
    pub fn text(tag: &str, text: &str) -> Self {
        Self::Text {
            tag: tag.to_owned(),
            text: text.to_owned(),
        }
    }

    fn selector(&self) -> Result<Selector> {
        let css = match self {
            Self::Attr { tag, attr, value } => format!("{tag}[{attr}=\"{}\"]", escape(value)),
            Self::Text { tag, .. } | Self::Tag { tag } => tag.clone(),
        };
        Selector::parse(&css).map_err(|e| OrderingError::Selector {
            selector: css.clone(),
            message: e.to_string(),
        })
    }

    fn matches(&self, element: ElementRef<'_>) -> bool {
        match self {
            Self::Attr { .. } | Self::Tag { .. } => true,
            Self::Text { text, .. } => inner_text(element) == *text,
        }
    }
}

/// XPath-style rendering, used in error messages.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attr { tag, attr, value } => write!(f, "//{tag}[@{attr}='{value}']"),
            Self::Text { tag, text } => write!(f, "//{tag}[text()='{text}']"),
            Self::Tag { tag } => write!(f, "//{tag}"),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Parse a full HTML document.
#[must_use]
pub fn parse(body: &str) -> Html {
    Html::parse_document(body)
}

/// All descendants of `scope` matching `query`, in document order.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if nothing matches.
pub fn find_all<'a>(scope: ElementRef<'a>, query: &Query) -> Result<Vec<ElementRef<'a>>> {
    let selector = query.selector()?;
    let found: Vec<_> = scope
        .select(&selector)
        .filter(|element| query.matches(*element))
        .collect();
    if found.is_empty() {
        return Err(OrderingError::NotFound(query.to_string()));
    }
    Ok(found)
}

/// The first descendant of `scope` matching `query`.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if nothing matches.
pub fn find_one<'a>(scope: ElementRef<'a>, query: &Query) -> Result<ElementRef<'a>> {
    let selector = query.selector()?;
    scope
        .select(&selector)
        .find(|element| query.matches(*element))
        .ok_or_else(|| OrderingError::NotFound(query.to_string()))
}

/// Value of `attr` on `element`.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if the attribute is absent.
pub fn attr_of(element: ElementRef<'_>, attr: &str) -> Result<String> {
    element
        .value()
        .attr(attr)
        .map(str::to_owned)
        .ok_or_else(|| OrderingError::NotFound(format!("@{attr} on <{}>", element.value().name())))
}

/// Concatenated, trimmed text content of `element`.
#[must_use]
pub fn inner_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Value of `attr` on the first match of `query`.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if no element matches or it lacks the
/// attribute.
pub fn select_attr(scope: ElementRef<'_>, query: &Query, attr: &str) -> Result<String> {
    attr_of(find_one(scope, query)?, attr)
}

/// Inner text of the first match of `query`.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] if no element matches.
pub fn select_text(scope: ElementRef<'_>, query: &Query) -> Result<String> {
    find_one(scope, query).map(inner_text)
}

/// Inner text of the first match of `query`, or `None`.
#[must_use]
pub fn optional_text(scope: ElementRef<'_>, query: &Query) -> Option<String> {
    find_one(scope, query).ok().map(inner_text)
}

/// The element enclosing `element`.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] for the document root.
pub fn parent_element(element: ElementRef<'_>) -> Result<ElementRef<'_>> {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .ok_or_else(|| OrderingError::NotFound(format!("parent of <{}>", element.value().name())))
}

/// The children of `element` that are themselves elements, skipping text.
pub fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

/// The first child of `element` that is itself an element.
#[must_use]
pub fn first_child_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    child_elements(element).next()
}
