use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{WishlistError, WishlistResult};

/// One wishlist row. Every field is kept as text; `value` is only read as a
/// number when a message is rendered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Card {
    #[serde(deserialize_with = "trimmed_text")]
    pub name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub set_name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub year: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub value: String,
}

/// Replacement fields for an edit. An empty field keeps the stored value.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    #[serde(deserialize_with = "trimmed_text")]
    pub name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub set_name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub year: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub value: String,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        set_name: impl Into<String>,
        year: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Card {
            name: name.into().trim().to_string(),
            set_name: set_name.into().trim().to_string(),
            year: year.into().trim().to_string(),
            value: value.into().trim().to_string(),
        }
    }

    /// Row order used by the wishlist file.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.set_name.as_str(),
            self.year.as_str(),
            self.value.as_str(),
        ]
    }

    pub fn amount(&self) -> WishlistResult<f64> {
        self.value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| WishlistError::InvalidValue {
                name: self.name.clone(),
                value: self.value.clone(),
            })
    }

    pub fn validate(&self) -> WishlistResult<()> {
        if self.name.is_empty() {
            return Err(WishlistError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        check_storable("name", &self.name)?;
        check_storable("set_name", &self.set_name)?;
        check_storable("year", &self.year)?;
        check_storable("value", &self.value)
    }
}

impl CardPatch {
    pub fn validate(&self) -> WishlistResult<()> {
        check_storable("name", &self.name)?;
        check_storable("set_name", &self.set_name)?;
        check_storable("year", &self.year)?;
        check_storable("value", &self.value)
    }

    pub fn apply(&self, card: &mut Card) {
        for (target, replacement) in [
            (&mut card.name, &self.name),
            (&mut card.set_name, &self.set_name),
            (&mut card.year, &self.year),
            (&mut card.value, &self.value),
        ] {
            if !replacement.is_empty() {
                *target = replacement.clone();
            }
        }
    }
}

// The file format has no escaping.
fn check_storable(field: &'static str, text: &str) -> WishlistResult<()> {
    match text.chars().find(|c| matches!(c, ',' | '\n' | '\r')) {
        Some(c) => Err(WishlistError::InvalidField {
            field,
            reason: format!("must not contain {c:?}"),
        }),
        None => Ok(()),
    }
}

/// Accepts a JSON string or number and yields its trimmed text.
pub(crate) fn trimmed_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    })
}
