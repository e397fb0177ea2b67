//! Consent choice values and their wire tags.
//!
//! The banner markup carries the choice as a plain string tag
//! (`data-ccc-action="accept"` and friends). Here it is a closed enum;
//! anything that does not parse is ignored rather than trusted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A visitor's decision about cookie usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentChoice {
    /// Accept all cookies.
    Accept,
    /// Reject all non-required cookies.
    Reject,
    /// Required cookies only.
    Required,
}

impl ConsentChoice {
    /// Every valid choice, in markup order.
    pub const ALL: [ConsentChoice; 3] = [
        ConsentChoice::Accept,
        ConsentChoice::Reject,
        ConsentChoice::Required,
    ];

    /// The raw tag persisted to storage and carried on banner controls.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentChoice::Accept => "accept",
            ConsentChoice::Reject => "reject",
            ConsentChoice::Required => "required",
        }
    }

    /// The class applied to the document root once this choice is active.
    pub fn status_class(&self) -> &'static str {
        match self {
            ConsentChoice::Accept => "ccc-status-accept",
            ConsentChoice::Reject => "ccc-status-reject",
            ConsentChoice::Required => "ccc-status-required",
        }
    }

    /// Parse a markup/storage tag. Unknown tags yield `None`.
    pub fn parse_tag(tag: &str) -> Option<ConsentChoice> {
        match tag {
            "accept" => Some(ConsentChoice::Accept),
            "reject" => Some(ConsentChoice::Reject),
            "required" => Some(ConsentChoice::Required),
            _ => None,
        }
    }
}

impl fmt::Display for ConsentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
