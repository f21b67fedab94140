//! Core types shared by incomes and expenses.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Unexpected, Visitor},
};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    Error,
    database_id::DatabaseId,
    sanitize::clean_text,
    timezone::date_format,
};

/// Whether an entry is money coming in or going out.
///
/// Incomes and expenses have the same shape and only differ in the table they
/// are stored in and the cashbook column they are mirrored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
}

impl EntryKind {
    /// The table that holds entries of this kind.
    pub(crate) fn table(self) -> &'static str {
        match self {
            EntryKind::Income => "incomes",
            EntryKind::Expense => "expenses",
        }
    }

    /// The cashbook column that mirrors the amount of entries of this kind.
    pub(crate) fn cashbook_amount_column(self) -> &'static str {
        match self {
            EntryKind::Income => "in_amount",
            EntryKind::Expense => "out_amount",
        }
    }

    /// The cashbook column that links a cashbook row to an entry of this kind.
    pub(crate) fn cashbook_reference_column(self) -> &'static str {
        match self {
            EntryKind::Income => "fk_income_id",
            EntryKind::Expense => "fk_expense_id",
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Income => write!(f, "Income"),
            EntryKind::Expense => write!(f, "Expense"),
        }
    }
}

/// The currencies an entry may be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// British Pound
    GBP,
    /// US Dollar
    USD,
    /// Bangladeshi Taka
    BDT,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Currency; 3] = [Currency::GBP, Currency::USD, Currency::BDT];

    /// The ISO 4217 code, e.g. "GBP".
    pub fn code(self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::BDT => "BDT",
        }
    }

    /// The English name of the currency.
    pub fn name(self) -> &'static str {
        match self {
            Currency::GBP => "British Pound",
            Currency::USD => "US Dollar",
            Currency::BDT => "Bangladeshi Taka",
        }
    }

    /// The symbol placed before amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::GBP => "£",
            Currency::USD => "$",
            Currency::BDT => "৳",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == s.trim())
            .ok_or_else(|| {
                let codes = Currency::ALL.map(Currency::code).join(", ");
                Error::Validation(format!("Currency must be one of: {codes}"))
            })
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;

        code.parse()
            .map_err(|error: Error| FromSqlError::Other(error.to_string().into()))
    }
}

/// An income or expense as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// The ID of the entry within its table.
    pub id: DatabaseId,
    /// What the money was for.
    pub description: String,
    /// The amount, always positive.
    pub amount: f64,
    /// The currency of `amount`.
    pub currency: Currency,
    /// The calendar date the money moved.
    #[serde(with = "date_format")]
    pub date: Date,
    /// When the entry was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The wallet the entry is filed under.
    pub wallet_id: Option<DatabaseId>,
    /// The name of the wallet the entry is filed under.
    pub wallet_name: Option<String>,
}

/// The client supplied fields for creating or updating an entry.
///
/// All fields are optional at this stage so that missing values produce
/// validation messages instead of deserialization errors. Numbers may also be
/// sent as strings, which is what HTML forms do.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    /// What the money was for.
    pub description: Option<String>,
    /// The amount, must be positive.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<f64>,
    /// The currency code, e.g. "GBP".
    pub currency: Option<String>,
    /// The wallet to file the entry under.
    #[serde(default, alias = "walletId", deserialize_with = "deserialize_wallet_id")]
    pub wallet_id: Option<DatabaseId>,
    /// The date the money moved, defaults to today.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<Date>,
}

/// Read an amount from a number or a numeric string.
///
/// Text that is not a number becomes NaN, which validation then rejects.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(Some(f64::NAN))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            match value.trim() {
                "" => Ok(None),
                value => Ok(Some(value.parse().unwrap_or(f64::NAN))),
            }
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

/// Read a wallet ID from an integer or a string of digits. Blank means none.
fn deserialize_wallet_id<'de, D>(deserializer: D) -> Result<Option<DatabaseId>, D::Error>
where
    D: Deserializer<'de>,
{
    struct WalletIdVisitor;

    impl<'de> Visitor<'de> for WalletIdVisitor {
        type Value = Option<DatabaseId>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a wallet ID")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            DatabaseId::try_from(value)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            match value.trim() {
                "" => Ok(None),
                text => text
                    .parse()
                    .map(Some)
                    .map_err(|_| E::invalid_value(Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(WalletIdVisitor)
}

/// Read an optional `YYYY-MM-DD` date. Blank means none.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match text.trim() {
        "" => Ok(None),
        text => Date::parse(text, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(text), &"a date like 2025-01-31")),
    }
}

/// The fields of an entry after validation and cleaning.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidEntry {
    pub description: String,
    pub amount: f64,
    pub currency: Currency,
    pub wallet_id: Option<DatabaseId>,
    pub date: Date,
}

impl EntryForm {
    /// Check the fields of the form and clean the description.
    ///
    /// `today` is used when the form has no date. Whether the wallet exists is
    /// checked separately since that needs the database.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first invalid field.
    pub(crate) fn validate(&self, today: Date) -> Result<ValidEntry, Error> {
        let description = self
            .description
            .as_deref()
            .map(clean_text)
            .unwrap_or_default();

        if description.is_empty() {
            return Err(Error::Validation("Description is required".to_owned()));
        }

        let amount = match self.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => amount,
            _ => {
                return Err(Error::Validation(
                    "Valid positive amount is required".to_owned(),
                ));
            }
        };

        let currency = self
            .currency
            .as_deref()
            .unwrap_or_default()
            .parse::<Currency>()?;

        Ok(ValidEntry {
            description,
            amount,
            currency,
            wallet_id: self.wallet_id,
            date: self.date.unwrap_or(today),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{Currency, EntryForm, EntryKind};

    fn valid_form() -> EntryForm {
        EntryForm {
            description: Some("  Salary ".to_owned()),
            amount: Some(1200.0),
            currency: Some("GBP".to_owned()),
            wallet_id: None,
            date: None,
        }
    }

    #[test]
    fn validate_trims_and_defaults_date() {
        let entry = valid_form().validate(date!(2025 - 03 - 04)).unwrap();

        assert_eq!(entry.description, "Salary");
        assert_eq!(entry.date, date!(2025 - 03 - 04));
        assert_eq!(entry.currency, Currency::GBP);
    }

    #[test]
    fn validate_strips_script() {
        let form = EntryForm {
            description: Some("Rent<script>alert(1)</script>".to_owned()),
            ..valid_form()
        };

        let entry = form.validate(date!(2025 - 03 - 04)).unwrap();

        assert_eq!(entry.description, "Rent");
    }

    #[test]
    fn validate_rejects_blank_description() {
        let form = EntryForm {
            description: Some("   ".to_owned()),
            ..valid_form()
        };

        assert_eq!(
            form.validate(date!(2025 - 03 - 04)),
            Err(Error::Validation("Description is required".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_bad_amounts() {
        for amount in [None, Some(0.0), Some(-5.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let form = EntryForm {
                amount,
                ..valid_form()
            };

            assert_eq!(
                form.validate(date!(2025 - 03 - 04)),
                Err(Error::Validation(
                    "Valid positive amount is required".to_owned()
                )),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_unknown_currency() {
        let form = EntryForm {
            currency: Some("EUR".to_owned()),
            ..valid_form()
        };

        assert_eq!(
            form.validate(date!(2025 - 03 - 04)),
            Err(Error::Validation(
                "Currency must be one of: GBP, USD, BDT".to_owned()
            ))
        );
    }

    #[test]
    fn form_accepts_camel_case_wallet_id_and_date() {
        let form: EntryForm = serde_json::from_str(
            r#"{"description": "Tea", "amount": 2.5, "currency": "USD", "walletId": 3, "date": "2025-01-31"}"#,
        )
        .unwrap();

        assert_eq!(form.wallet_id, Some(3));
        assert_eq!(form.date, Some(date!(2025 - 01 - 31)));
    }

    #[test]
    fn form_accepts_numbers_as_strings() {
        let form: EntryForm = serde_json::from_str(
            r#"{"description": "Tea", "amount": "12.50", "currency": "USD", "walletId": "3"}"#,
        )
        .unwrap();

        assert_eq!(form.amount, Some(12.5));
        assert_eq!(form.wallet_id, Some(3));
    }

    #[test]
    fn junk_amount_fails_validation_not_parsing() {
        let form: EntryForm =
            serde_json::from_str(r#"{"description": "Tea", "amount": "lots", "currency": "USD"}"#)
                .unwrap();

        assert_eq!(
            form.validate(date!(2025 - 03 - 04)),
            Err(Error::Validation(
                "Valid positive amount is required".to_owned()
            ))
        );
    }

    #[test]
    fn html_form_fields_parse_with_blanks() {
        let form: EntryForm = serde_urlencoded::from_str(
            "description=Tea&amount=2.50&currency=GBP&wallet_id=&date=",
        )
        .unwrap();

        assert_eq!(form.amount, Some(2.5));
        assert_eq!(form.wallet_id, None);
        assert_eq!(form.date, None);

        let form: EntryForm =
            serde_urlencoded::from_str("description=Tea&amount=1&currency=GBP&date=2025-02-01")
                .unwrap();
        assert_eq!(form.date, Some(date!(2025 - 02 - 01)));
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(EntryKind::Income.to_string(), "Income");
        assert_eq!(EntryKind::Expense.to_string(), "Expense");
    }
}
