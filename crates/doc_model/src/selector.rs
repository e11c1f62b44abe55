//! Minimal selector matching for descendant queries
//!
//! Supports comma-separated compound selectors made of an optional tag
//! name (or `*`) followed by any number of attribute conditions:
//! `td`, `*[data-x]`, `td[data-x],th[data-x]`, `td[class="a"]`.

use crate::{DocModelError, Element, Result};

/// A condition on a single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeCondition {
    name: String,
    value: Option<String>,
}

/// One alternative of a selector list
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// `None` matches any tag
    tag: Option<String>,
    attributes: Vec<AttributeCondition>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag() != tag {
                return false;
            }
        }
        self.attributes.iter().all(|cond| match &cond.value {
            None => element.has_attribute(&cond.name),
            Some(expected) => element.attribute(&cond.name) == Some(expected.as_str()),
        })
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| DocModelError::InvalidSelector {
            selector: text.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector"));
            }
            alternatives.push(parse_compound(part).map_err(|reason| invalid(&reason))?);
        }

        Ok(Self { alternatives })
    }

    /// Selector matching any element with the given tag
    pub fn tag(tag: &str) -> Self {
        Self {
            alternatives: vec![Compound {
                tag: Some(tag.to_ascii_lowercase()),
                attributes: Vec::new(),
            }],
        }
    }

    /// Check whether an element matches any alternative
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

impl std::str::FromStr for Selector {
    type Err = DocModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_compound(text: &str) -> std::result::Result<Compound, String> {
    let (tag_part, mut rest) = match text.find('[') {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };

    let tag_part = tag_part.trim();
    let tag = match tag_part {
        "" | "*" => None,
        name if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            Some(name.to_ascii_lowercase())
        }
        name => return Err(format!("unsupported tag selector {:?}", name)),
    };

    let mut attributes = Vec::new();
    while !rest.is_empty() {
        let inner_end = rest.find(']').ok_or("unterminated attribute selector")?;
        let inner = &rest[1..inner_end];
        attributes.push(parse_attribute(inner)?);
        rest = rest[inner_end + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(format!("unexpected input {:?}", rest));
        }
    }

    Ok(Compound { tag, attributes })
}

fn parse_attribute(inner: &str) -> std::result::Result<AttributeCondition, String> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(unquoted.to_string()))
        }
        None => (inner.trim(), None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(format!("invalid attribute name {:?}", name));
    }

    Ok(AttributeCondition {
        name: name.to_ascii_lowercase(),
        value,
    })
}
