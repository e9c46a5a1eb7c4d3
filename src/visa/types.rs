//! Visa dataset types and error definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The four visa categories the service carries data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisaType {
    Tourist,
    Study,
    Work,
    Medical,
}

impl VisaType {
    /// All variants, in display order.
    pub const ALL: [VisaType; 4] = [
        VisaType::Tourist,
        VisaType::Study,
        VisaType::Work,
        VisaType::Medical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisaType::Tourist => "tourist",
            VisaType::Study => "study",
            VisaType::Work => "work",
            VisaType::Medical => "medical",
        }
    }

    /// Lowercase keys of every visa type.
    pub fn valid_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }

    /// Human-facing descriptor used by the type listing.
    pub fn descriptor(self) -> VisaTypeDescriptor {
        let (name, description, icon) = match self {
            VisaType::Tourist => ("Tourist Visa", "For leisure travel and sightseeing", "🏖️"),
            VisaType::Study => (
                "Student Visa",
                "For educational purposes and academic programs",
                "🎓",
            ),
            VisaType::Work => (
                "Work Visa",
                "For employment and professional opportunities",
                "💼",
            ),
            VisaType::Medical => (
                "Medical Visa",
                "For healthcare treatment and medical procedures",
                "🏥",
            ),
        };
        VisaTypeDescriptor {
            key: self,
            name,
            description,
            icon,
        }
    }
}

impl fmt::Display for VisaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known visa type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid visa type '{0}'. Must be one of: tourist, study, work, medical")]
pub struct UnknownVisaType(pub String);

impl FromStr for VisaType {
    type Err = UnknownVisaType;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tourist" => Ok(VisaType::Tourist),
            "study" => Ok(VisaType::Study),
            "work" => Ok(VisaType::Work),
            "medical" => Ok(VisaType::Medical),
            _ => Err(UnknownVisaType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisaTypeDescriptor {
    pub key: VisaType,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Per-country visa entry.
///
/// Type-specific requirement fields vary between documents and are kept
/// verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryVisaInfo {
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub processing_time: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub fees: Value,
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

/// One visa document, as stored in `<visa_type>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisaDocument {
    /// Normalized country key → entry.
    #[serde(deserialize_with = "unique_country_keys")]
    pub countries: BTreeMap<String, CountryVisaInfo>,
    #[serde(default)]
    pub general_requirements: Value,
    #[serde(default)]
    pub common_fees: Value,
    #[serde(default)]
    pub processing_times: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_rights: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_categories: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular_treatments: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_requirements: Option<Value>,
}

impl VisaDocument {
    /// Parse a document and check that every country key is in normalized form.
    pub fn parse(visa_type: VisaType, content: &str) -> Result<Self, VisaError> {
        let document: VisaDocument =
            serde_json::from_str(content).map_err(|e| VisaError::Parse {
                visa_type,
                reason: e.to_string(),
            })?;

        if let Some(key) = document
            .countries
            .keys()
            .find(|key| normalize_country_key(key) != **key)
        {
            return Err(VisaError::Parse {
                visa_type,
                reason: format!("country key '{}' is not normalized", key),
            });
        }

        Ok(document)
    }

    /// Look up a country by free-text name.
    pub fn country(&self, name: &str) -> Option<&CountryVisaInfo> {
        self.countries.get(&normalize_country_key(name))
    }
}

/// Deserialize the `countries` object, rejecting a key that appears twice.
fn unique_country_keys<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, CountryVisaInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueKeys;

    impl<'de> Visitor<'de> for UniqueKeys {
        type Value = BTreeMap<String, CountryVisaInfo>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of country entries")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut countries = BTreeMap::new();
            while let Some((key, info)) = map.next_entry::<String, CountryVisaInfo>()? {
                if countries.contains_key(&key) {
                    return Err(de::Error::custom(format_args!(
                        "duplicate country key '{}'",
                        key
                    )));
                }
                countries.insert(key, info);
            }
            Ok(countries)
        }
    }

    deserializer.deserialize_map(UniqueKeys)
}

/// Map a free-text country name to a document key.
///
/// Lowercases, collapses each whitespace run into one underscore and turns
/// every hyphen into an underscore.
pub fn normalize_country_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c == '-' {
            key.push('_');
        } else {
            key.extend(c.to_lowercase());
        }
    }
    key
}

/// Errors that can occur while loading visa data.
#[derive(Debug, Error)]
pub enum VisaError {
    /// No backing file exists for the type.
    #[error("Visa data file not found for type: {0}")]
    NotFound(VisaType),

    /// Backing content is not a well-formed visa document.
    #[error("Invalid JSON format in visa data file for type: {visa_type}: {reason}")]
    Parse { visa_type: VisaType, reason: String },

    /// Any other storage failure.
    #[error("Failed to load visa data for type: {visa_type}: {source}")]
    Io {
        visa_type: VisaType,
        #[source]
        source: std::io::Error,
    },
}
