use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use validator::Validate;

use crate::error::CinemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnackCategory {
    Combo,
    Pipoca,
    Bebida,
    Doce,
}

impl FromStr for SnackCategory {
    type Err = CinemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "combo" => Ok(SnackCategory::Combo),
            "pipoca" => Ok(SnackCategory::Pipoca),
            "bebida" => Ok(SnackCategory::Bebida),
            "doce" => Ok(SnackCategory::Doce),
            other => Err(CinemaError::validation(format!("unknown snack category: {other:?}"))),
        }
    }
}

/// A non-negative amount in reais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, CinemaError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CinemaError::validation(format!("price must not be negative: {amount}")));
        }
        Ok(Price(amount))
    }

    /// Builds a price from an amount in centavos.
    pub fn from_cents(cents: u32) -> Self {
        Price(Decimal::new(i64::from(cents), 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = CinemaError;

    /// Accepts both `29.90` and `29,90`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replacen(',', ".", 1);
        let amount = Decimal::from_str(&normalized)
            .map_err(|_| CinemaError::validation(format!("price is not a number: {s:?}")))?;
        Price::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!("{:.2}", self.0.round_dp(2));
        write!(f, "R$ {}", text.replace('.', ","))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SnackDetails {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category: SnackCategory,
}

pub type NewSnack = SnackDetails;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnackItem {
    pub id: String,
    #[serde(flatten)]
    pub details: SnackDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SnackUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SnackCategory>,
}

impl SnackUpdate {
    pub fn replacing(details: SnackDetails) -> Self {
        SnackUpdate {
            name: Some(details.name),
            description: Some(details.description),
            price: Some(details.price),
            image_url: Some(details.image_url),
            category: Some(details.category),
        }
    }

    /// Trims the required text fields, so whitespace-only values fail validation.
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.name, &mut self.description].into_iter().flatten() {
            *field = field.trim().to_string();
        }
        self
    }

    pub fn apply_to(&self, details: &mut SnackDetails) {
        if let Some(name) = &self.name {
            details.name = name.clone();
        }
        if let Some(description) = &self.description {
            details.description = description.clone();
        }
        if let Some(price) = self.price {
            details.price = price;
        }
        if let Some(image_url) = &self.image_url {
            details.image_url = image_url.clone();
        }
        if let Some(category) = self.category {
            details.category = category;
        }
    }
}
