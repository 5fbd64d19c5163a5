//! Filename classification.
//!
//! Classification is keyword-based: an ordered rule list is applied to the
//! lower-cased filename and the first matching rule wins. There is no
//! scoring and no combination of matches; files nothing matches land in a
//! fixed fallback bucket.
//!
//! The `Classifier` trait is the single classification seam for the whole
//! pipeline: both the simulated inline path and the confirmation service
//! receive the same injected instance, so the rule table exists exactly
//! once.

use crate::taxonomy::{Classification, Domain};

/// Maps a filename to a taxonomy entry. Implementations must be
/// deterministic: identical filenames yield identical results, independent
/// of call site.
pub trait Classifier: Send + Sync {
    fn classify(&self, filename: &str) -> Classification;
}

/// One ordered keyword rule: the rule matches when any of its keywords
/// occurs in the lower-cased filename.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    pub category: String,
    pub code: String,
    pub domain: Domain,
}

impl KeywordRule {
    fn new(keywords: &[&str], category: &str, code: &str, domain: Domain) -> Self {
        KeywordRule {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: category.to_string(),
            code: code.to_string(),
            domain,
        }
    }

    fn matches(&self, lowered_filename: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_filename.contains(keyword.as_str()))
    }
}

const FALLBACK_CATEGORY: &str = "Divers";
const FALLBACK_CODE: &str = "00.0";

/// Ordered keyword-match classifier with a fixed fallback bucket.
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    /// Classifier with a caller-supplied rule table. Order matters: earlier
    /// rules shadow later ones.
    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        KeywordClassifier { rules }
    }

    /// Built-in rule table covering the four due-diligence domains.
    fn default_rules() -> Vec<KeywordRule> {
        vec![
            // 01 Corporate
            KeywordRule::new(&["statut"], "Statuts", "01.1", Domain::Corporate),
            KeywordRule::new(&["kbis"], "Kbis", "01.2", Domain::Corporate),
            KeywordRule::new(
                &["assemblee", "proces-verbal", "proces_verbal"],
                "PV d'assemblée",
                "01.3",
                Domain::Corporate,
            ),
            KeywordRule::new(&["pacte"], "Pacte d'associés", "01.4", Domain::Corporate),
            // 02 TAX
            KeywordRule::new(&["liasse", "2065"], "CIT (IS)", "02.1", Domain::Tax),
            KeywordRule::new(&["tva", "ca3"], "VAT (TVA)", "02.2", Domain::Tax),
            KeywordRule::new(&["cvae", "cfe"], "CVAE / CFE", "02.3", Domain::Tax),
            KeywordRule::new(
                &["credit_impot", "credit-impot", "cir"],
                "Crédits d'impôt",
                "02.4",
                Domain::Tax,
            ),
            // 03 Social
            KeywordRule::new(
                &["contrat_travail", "contrat-de-travail", "cdi", "cdd"],
                "Contrats de travail",
                "03.1",
                Domain::Social,
            ),
            KeywordRule::new(
                &["paie", "bulletin", "salaire"],
                "Paie",
                "03.2",
                Domain::Social,
            ),
            KeywordRule::new(&["urssaf", "dsn"], "URSSAF / DSN", "03.3", Domain::Social),
            KeywordRule::new(
                &["accord", "convention"],
                "Accords collectifs",
                "03.4",
                Domain::Social,
            ),
            // 04 IP/IT
            KeywordRule::new(
                &["marque", "brevet", "inpi"],
                "Marques & brevets",
                "04.1",
                Domain::IpIt,
            ),
            KeywordRule::new(
                &["licence", "logiciel"],
                "Licences logicielles",
                "04.2",
                Domain::IpIt,
            ),
            KeywordRule::new(&["rgpd", "gdpr"], "RGPD", "04.3", Domain::IpIt),
            KeywordRule::new(&["domaine", "dns"], "Noms de domaine", "04.4", Domain::IpIt),
        ]
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        KeywordClassifier::with_rules(Self::default_rules())
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, filename: &str) -> Classification {
        let lowered = filename.to_lowercase();

        for rule in &self.rules {
            if rule.matches(&lowered) {
                return Classification {
                    category: rule.category.clone(),
                    code: rule.code.clone(),
                    domain: rule.domain,
                };
            }
        }

        Classification {
            category: FALLBACK_CATEGORY.to_string(),
            code: FALLBACK_CODE.to_string(),
            domain: Domain::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_tax_filing_by_keyword() {
        let classifier = KeywordClassifier::default();
        let result = classifier.classify("liasse_2023.pdf");
        assert_eq!(result.category, "CIT (IS)");
        assert_eq!(result.code, "02.1");
        assert_eq!(result.domain, Domain::Tax);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("LIASSE_2023.PDF").code, "02.1");
        assert_eq!(classifier.classify("Statuts-2021.docx").code, "01.1");
    }

    #[test]
    fn first_matching_rule_wins() {
        let classifier = KeywordClassifier::with_rules(vec![
            KeywordRule::new(&["report"], "First", "01.1", Domain::Corporate),
            KeywordRule::new(&["report"], "Second", "02.1", Domain::Tax),
        ]);
        assert_eq!(classifier.classify("report.pdf").category, "First");
    }

    #[test]
    fn unmatched_filename_gets_fallback_bucket() {
        let classifier = KeywordClassifier::default();
        let result = classifier.classify("photo_vacances.png");
        assert_eq!(result.category, "Divers");
        assert_eq!(result.code, "00.0");
        assert_eq!(result.domain, Domain::Undefined);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = KeywordClassifier::default();
        for filename in ["liasse_2023.pdf", "kbis.pdf", "bulletin_paie_01.pdf", "x.bin"] {
            let first = classifier.classify(filename);
            let second = classifier.classify(filename);
            assert_eq!(first, second, "{filename} classified inconsistently");
        }
    }

    #[test]
    fn default_rules_cover_all_four_domains() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("kbis.pdf").domain, Domain::Corporate);
        assert_eq!(classifier.classify("declaration_tva.pdf").domain, Domain::Tax);
        assert_eq!(classifier.classify("dsn_mars.pdf").domain, Domain::Social);
        assert_eq!(classifier.classify("depot_marque.pdf").domain, Domain::IpIt);
    }
}
