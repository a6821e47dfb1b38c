use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Risk level a rulebook entry may assign. `OK` is synthesized by the
/// classifier and cannot be configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleRisk {
    #[serde(rename = "HIGH", alias = "high")]
    High,
    #[serde(rename = "MEDIUM", alias = "medium")]
    Medium,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Risk {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "OK")]
    Ok,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Ok => "OK",
        }
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RuleRisk> for Risk {
    fn from(value: RuleRisk) -> Self {
        match value {
            RuleRisk::High => Self::High,
            RuleRisk::Medium => Self::Medium,
        }
    }
}

/// One entry of the rulebook. Position in the rulebook is its identity for
/// matching purposes: the first matching rule wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub category: String,
    pub description: String,
    pub risk: RuleRisk,
    pub rationale: String,
    pub recommendation: String,
    #[serde(deserialize_with = "deserialize_reference")]
    pub reference: String,
}

/// Rulebooks cite statutes by section number as often as by name, so a
/// bare number is accepted and normalized to text. Floats keep their
/// decimal point (`22.0` stays `"22.0"`).
fn deserialize_reference<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ReferenceValue {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match ReferenceValue::deserialize(deserializer)? {
        ReferenceValue::Text(text) => text,
        ReferenceValue::Integer(number) => number.to_string(),
        ReferenceValue::Float(number) if number.is_finite() && number.fract() == 0.0 => {
            format!("{number:.1}")
        }
        ReferenceValue::Float(number) => number.to_string(),
    })
}
