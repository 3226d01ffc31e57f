//! Presentational layout types.
//!
//! The shapes follow the JSON Forms UI schema vocabulary: a tree of layouts
//! whose leaves are controls pointing at a property through a `scope`.
//!
//! ```json
//! {
//!   "type": "VerticalLayout",
//!   "elements": [
//!     { "type": "Control", "scope": "#/properties/name",
//!       "options": { "customStyle": true, "placeholder": "Enter name" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node of a layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayoutElement {
    /// Elements stacked top to bottom
    VerticalLayout { elements: Vec<LayoutElement> },
    /// Elements placed side by side
    HorizontalLayout { elements: Vec<LayoutElement> },
    /// Labelled group of elements
    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        elements: Vec<LayoutElement>,
    },
    /// A single control bound to one property
    Control {
        scope: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ControlOptions>,
    },
}

impl LayoutElement {
    pub fn control(scope: impl Into<String>) -> Self {
        Self::Control {
            scope: scope.into(),
            label: None,
            options: None,
        }
    }

    /// Child elements of a layout node; controls have none.
    pub fn elements(&self) -> &[LayoutElement] {
        match self {
            Self::VerticalLayout { elements }
            | Self::HorizontalLayout { elements }
            | Self::Group { elements, .. } => elements,
            Self::Control { .. } => &[],
        }
    }

    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::Control { scope, .. } => Some(scope),
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&ControlOptions> {
        match self {
            Self::Control { options, .. } => options.as_ref(),
            _ => None,
        }
    }
}

/// Extra presentation options attached to a control
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Options this crate does not interpret, kept for the renderer
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
