use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::submit::SubmitRequest;
use crate::types::SaleCategory;

/// Raw `application/x-www-form-urlencoded` body of the submit form. Every
/// field is a string so a bad value becomes an inline message, not a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleForm {
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: String,
    pub password: Option<String>,
}

/// JSON body of `POST /api/sales`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleSubmission {
    pub player: String,
    pub category: SaleCategory,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub password: Option<String>,
}

impl SaleForm {
    pub fn into_request(self, admin_password: Option<&str>) -> Result<SubmitRequest> {
        check_password(admin_password, self.password.as_deref())?;
        let player = parse_player(&self.player)?;
        let category = self.category.parse::<SaleCategory>()?;
        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| AppError::Validation(format!("sales amount {:?} is not a number", self.amount)))?;
        Ok(SubmitRequest {
            player,
            category,
            amount: check_amount(amount)?,
            submitted_at: None,
        })
    }
}

impl SaleSubmission {
    pub fn into_request(self, admin_password: Option<&str>) -> Result<SubmitRequest> {
        check_password(admin_password, self.password.as_deref())?;
        Ok(SubmitRequest {
            player: parse_player(&self.player)?,
            category: self.category,
            amount: check_amount(self.amount)?,
            submitted_at: self.date,
        })
    }
}

fn check_password(expected: Option<&str>, given: Option<&str>) -> Result<()> {
    match expected {
        Some(expected) if given != Some(expected) => Err(AppError::Unauthorized),
        _ => Ok(()),
    }
}

fn parse_player(raw: &str) -> Result<String> {
    let player = raw.trim();
    if player.is_empty() {
        return Err(AppError::Validation("salesperson is required".to_string()));
    }
    Ok(player.to_string())
}

fn check_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::Validation(format!(
            "sales amount must be zero or more (got {amount})"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn form(player: &str, category: &str, amount: &str, password: Option<&str>) -> SaleForm {
        SaleForm {
            player: player.to_string(),
            category: category.to_string(),
            amount: amount.to_string(),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn valid_form_becomes_request() {
        let req = form("Harsh", "Full-Time", " 1500.25 ", None).into_request(None).unwrap();
        assert_eq!(req.player, "Harsh");
        assert_eq!(req.category, SaleCategory::FullTime);
        assert_eq!(req.amount, dec!(1500.25));
        assert!(req.submitted_at.is_none());
    }

    #[test]
    fn negative_or_garbage_amount_is_rejected() {
        for amount in ["-1", "-0.01", "abc", "NaN", "inf", ""] {
            let err = form("Harsh", "Hourly", amount, None).into_request(None).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{amount}");
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = form("Harsh", "Contract", "1", None).into_request(None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn gate_requires_matching_password() {
        assert!(matches!(
            form("Harsh", "Hourly", "1", None).into_request(Some("s3cret")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            form("Harsh", "Hourly", "1", Some("guess")).into_request(Some("s3cret")),
            Err(AppError::Unauthorized)
        ));
        assert!(form("Harsh", "Hourly", "1", Some("s3cret"))
            .into_request(Some("s3cret"))
            .is_ok());
    }

    #[test]
    fn json_submission_keeps_date() {
        let body = r#"{"player":"Laxmi","category":"Part-Time","amount":0,"date":"2025-05-01"}"#;
        let sub: SaleSubmission = serde_json::from_str(body).unwrap();
        let req = sub.into_request(None).unwrap();
        assert_eq!(req.category, SaleCategory::PartTime);
        assert_eq!(req.submitted_at, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(req.amount, Decimal::ZERO);
    }

    #[test]
    fn json_amount_keeps_cents_exact() {
        let body = r#"{"player":"Laxmi","category":"Hourly","amount":0.1}"#;
        let sub: SaleSubmission = serde_json::from_str(body).unwrap();
        assert_eq!(sub.into_request(None).unwrap().amount, dec!(0.1));

        let body = r#"{"player":"Laxmi","category":"Hourly","amount":-3}"#;
        let sub: SaleSubmission = serde_json::from_str(body).unwrap();
        assert!(matches!(sub.into_request(None), Err(AppError::Validation(_))));
    }
}
