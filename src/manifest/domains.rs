//! Domain string handling.
//!
//! Record domains are either a bare category (`HomeDomain`) or a category
//! plus an identifier joined by the first dash (`AppDomain-com.example.app`).

use std::fmt;

/// A parsed domain string, borrowing from the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainLabel<'a> {
    category: &'a str,
    identifier: Option<&'a str>,
}

impl<'a> DomainLabel<'a> {
    /// Split a raw domain on its first dash.
    #[must_use]
    pub fn parse(domain: &'a str) -> Self {
        match domain.split_once('-') {
            Some((category, identifier)) => Self {
                category,
                identifier: Some(identifier),
            },
            None => Self {
                category: domain,
                identifier: None,
            },
        }
    }

    #[must_use]
    pub const fn category(self) -> &'a str {
        self.category
    }

    #[must_use]
    pub const fn identifier(self) -> Option<&'a str> {
        self.identifier
    }

    /// Whether this domain belongs to an installed application or its group.
    #[must_use]
    pub fn is_app_domain(self) -> bool {
        self.category.starts_with("AppDomain")
    }
}

impl fmt::Display for DomainLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier {
            Some(identifier) => write!(f, "{}-{}", self.category, identifier),
            None => write!(f, "{}", self.category),
        }
    }
}
