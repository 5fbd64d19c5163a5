//! Document taxonomy: domains, categories, and classification results.
//!
//! The taxonomy has four fixed top-level domains. A domain is always derived
//! from the numeric prefix of a category code (`01` → Corporate, `02` → TAX,
//! `03` → Social, `04` → IP/IT); any other prefix maps to `Undefined`.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Taxonomy top level a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    Corporate,
    #[serde(rename = "TAX")]
    Tax,
    Social,
    #[serde(rename = "IP/IT")]
    IpIt,
    Undefined,
}

impl Domain {
    /// Derive the domain from a category code such as `"02.1"`.
    pub fn from_code(code: &str) -> Domain {
        let prefix = code.split('.').next().unwrap_or(code);
        match prefix {
            "01" => Domain::Corporate,
            "02" => Domain::Tax,
            "03" => Domain::Social,
            "04" => Domain::IpIt,
            _ => Domain::Undefined,
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Domain::Corporate => write!(f, "Corporate"),
            Domain::Tax => write!(f, "TAX"),
            Domain::Social => write!(f, "Social"),
            Domain::IpIt => write!(f, "IP/IT"),
            Domain::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Taxonomy assignment for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub code: String,
    pub domain: Domain,
}

/// Category chosen by the caller for a whole batch (manual mode).
///
/// The domain is not part of the selection; it is derived from the code when
/// the selection is stamped onto a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    pub category: String,
    pub code: String,
}

impl CategorySelection {
    /// Expand the selection into a full classification, deriving the domain
    /// from the category code's prefix.
    pub fn to_classification(&self) -> Classification {
        Classification {
            category: self.category.clone(),
            code: self.code.clone(),
            domain: Domain::from_code(&self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_from_code_prefixes() {
        assert_eq!(Domain::from_code("01.3"), Domain::Corporate);
        assert_eq!(Domain::from_code("02.1"), Domain::Tax);
        assert_eq!(Domain::from_code("03.2"), Domain::Social);
        assert_eq!(Domain::from_code("04.4"), Domain::IpIt);
    }

    #[test]
    fn domain_from_code_unknown_prefix() {
        assert_eq!(Domain::from_code("99.1"), Domain::Undefined);
        assert_eq!(Domain::from_code(""), Domain::Undefined);
        assert_eq!(Domain::from_code("liasse"), Domain::Undefined);
    }

    #[test]
    fn domain_from_code_without_separator() {
        assert_eq!(Domain::from_code("02"), Domain::Tax);
    }

    #[test]
    fn domain_display() {
        assert_eq!(Domain::Tax.to_string(), "TAX");
        assert_eq!(Domain::IpIt.to_string(), "IP/IT");
        assert_eq!(Domain::Corporate.to_string(), "Corporate");
    }

    #[test]
    fn domain_serde_names_match_display() {
        assert_eq!(serde_json::to_string(&Domain::Tax).unwrap(), "\"TAX\"");
        assert_eq!(serde_json::to_string(&Domain::IpIt).unwrap(), "\"IP/IT\"");
    }

    #[test]
    fn selection_to_classification_derives_domain() {
        let selection = CategorySelection {
            category: "CIT (IS)".to_string(),
            code: "02.1".to_string(),
        };
        let classification = selection.to_classification();
        assert_eq!(classification.category, "CIT (IS)");
        assert_eq!(classification.code, "02.1");
        assert_eq!(classification.domain, Domain::Tax);
    }
}
