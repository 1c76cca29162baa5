//! Card input validation. Nothing here persists card data.

use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Clone, Deserialize)]
pub struct CardInput {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    /// Two- or four-digit year
    pub expiry_year: u32,
    pub cvv: String,
}

impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &"****")
            .field("holder_name", &self.holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

/// A card that passed validation. Holds the digits only for the duration of
/// the request that forwards them to the processor.
#[derive(Clone)]
pub struct ValidatedCard {
    pub number: String,
    pub holder_name: String,
    pub brand: &'static str,
    pub last4: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvv: String,
}

pub fn validate_card(input: &CardInput) -> Result<ValidatedCard> {
    validate_card_at(input, Utc::now().year() as u32, Utc::now().month())
}

fn validate_card_at(input: &CardInput, current_year: u32, current_month: u32) -> Result<ValidatedCard> {
    let number: String = input
        .number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !(13..=19).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("Número do cartão inválido".into()));
    }
    if !luhn_valid(&number) {
        return Err(AppError::BadRequest("Número do cartão inválido".into()));
    }

    let holder_name = input.holder_name.trim().to_string();
    if holder_name.is_empty() {
        return Err(AppError::BadRequest("Nome do titular é obrigatório".into()));
    }

    if !(1..=12).contains(&input.expiry_month) {
        return Err(AppError::BadRequest("Mês de validade inválido".into()));
    }
    let expiry_year = if input.expiry_year < 100 {
        2000 + input.expiry_year
    } else {
        input.expiry_year
    };
    if (expiry_year, input.expiry_month) < (current_year, current_month) {
        return Err(AppError::BadRequest("Cartão vencido".into()));
    }

    let cvv = input.cvv.trim().to_string();
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("CVV inválido".into()));
    }

    let last4 = number[number.len() - 4..].to_string();
    Ok(ValidatedCard {
        brand: detect_brand(&number),
        number,
        holder_name,
        last4,
        expiry_month: input.expiry_month,
        expiry_year,
        cvv,
    })
}

pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

const ELO_PREFIXES: &[&str] = &[
    "401178", "401179", "431274", "438935", "451416", "457393", "457631", "457632", "504175",
    "506699", "5067", "509", "627780", "636297", "636368", "650", "6516", "6550",
];

pub fn detect_brand(number: &str) -> &'static str {
    let prefix2: u32 = number.get(..2).and_then(|p| p.parse().ok()).unwrap_or(0);
    let prefix4: u32 = number.get(..4).and_then(|p| p.parse().ok()).unwrap_or(0);

    if ELO_PREFIXES.iter().any(|p| number.starts_with(p)) {
        "elo"
    } else if number.starts_with("606282") || number.starts_with("3841") {
        "hipercard"
    } else if prefix2 == 34 || prefix2 == 37 {
        "amex"
    } else if number.starts_with('4') {
        "visa"
    } else if (51..=55).contains(&prefix2) || (2221..=2720).contains(&prefix4) {
        "mastercard"
    } else if prefix2 == 36 || prefix2 == 38 || (3000..=3059).contains(&prefix4) {
        "diners"
    } else if number.starts_with("6011") || prefix2 == 65 {
        "discover"
    } else {
        "unknown"
    }
}
