//! Detection and redaction of Singapore-style personal data.

use std::collections::BTreeMap;

use regex::Regex;

/// Pattern keys in the order they are applied.
pub const PII_KEYS: [&str; 3] = ["nric_fin", "phone", "email"];

const NRIC_FIN_PATTERN: &str = r"(?i)\b[STFGM]\d{7}[A-Z]\b";
const PHONE_PATTERN: &str = r"\b(?:\+65\s?)?(?:6|8|9)\d{7}\b";
const EMAIL_PATTERN: &str = r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub hits: BTreeMap<String, Vec<String>>,
}

impl Redaction {
    pub fn has_hits(&self) -> bool {
        !self.hits.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct PiiRedactor {
    patterns: Vec<(&'static str, Regex)>,
}

impl PiiRedactor {
    pub fn new() -> Result<Self, regex::Error> {
        let sources = [NRIC_FIN_PATTERN, PHONE_PATTERN, EMAIL_PATTERN];
        let mut patterns = Vec::with_capacity(PII_KEYS.len());
        for (key, source) in PII_KEYS.into_iter().zip(sources) {
            patterns.push((key, Regex::new(source)?));
        }
        Ok(Self { patterns })
    }

    /// Replaces each match with `[REDACTED_<KEY>]`. Later patterns see the
    /// output of earlier ones, so a redacted NRIC never counts as a phone.
    pub fn redact(&self, text: &str) -> Redaction {
        let mut current = text.to_string();
        let mut hits = BTreeMap::new();

        for (key, regex) in &self.patterns {
            let found: Vec<String> =
                regex.find_iter(&current).map(|matched| matched.as_str().to_string()).collect();
            if found.is_empty() {
                continue;
            }
            let token = format!("[REDACTED_{}]", key.to_uppercase());
            current = regex.replace_all(&current, token.as_str()).into_owned();
            hits.insert((*key).to_string(), found);
        }

        Redaction { text: current, hits }
    }
}
