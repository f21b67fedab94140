//! Runtime settings stored in the `configurations` table.
//!
//! Settings missing from the database fall back to the server's
//! [SettingDefaults].

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::Query;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AppState, Error, SettingDefaults, ledger::Currency};

/// The setting holding the default number of rows per page.
pub const PAGINATE_ROWS: &str = "paginate_rows";
/// The setting holding the currency to preselect for new entries.
pub const DEFAULT_CURRENCY: &str = "default_currency";
/// The setting holding the JSON list of currencies offered to clients.
pub const CURRENCIES: &str = "currencies";

/// A currency as listed by the `currencies` setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// The ISO 4217 code, e.g. "GBP".
    pub code: String,
    /// The English name of the currency.
    pub name: String,
    /// The symbol placed before amounts.
    pub symbol: String,
}

impl From<Currency> for CurrencyInfo {
    fn from(currency: Currency) -> Self {
        Self {
            code: currency.code().to_owned(),
            name: currency.name().to_owned(),
            symbol: currency.symbol().to_owned(),
        }
    }
}

/// Create the configurations table.
pub fn create_configuration_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS configurations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            setting TEXT NOT NULL,
            deleted_at TEXT
        )",
        (),
    )?;

    Ok(())
}

/// Get the raw value of a live setting.
pub fn get_setting(name: &str, connection: &Connection) -> Result<Option<String>, Error> {
    connection
        .query_row(
            "SELECT setting FROM configurations WHERE name = ?1 AND deleted_at IS NULL",
            (name,),
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

/// Insert or replace a setting, undeleting it if needed.
#[cfg(test)]
pub(crate) fn set_setting(name: &str, setting: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO configurations (name, setting) VALUES (?1, ?2)
        ON CONFLICT(name) DO UPDATE SET setting = excluded.setting, deleted_at = NULL",
        (name, setting),
    )?;

    Ok(())
}

/// The default number of rows per page.
///
/// A missing setting, or one that is not a positive integer, gives the
/// server default.
pub fn get_paginate_rows(
    defaults: &SettingDefaults,
    connection: &Connection,
) -> Result<u64, Error> {
    let setting = get_setting(PAGINATE_ROWS, connection)?;

    Ok(setting
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&rows| rows > 0)
        .unwrap_or(defaults.paginate_rows))
}

/// The currency code to preselect for new entries.
pub fn get_default_currency(
    defaults: &SettingDefaults,
    connection: &Connection,
) -> Result<String, Error> {
    let setting = get_setting(DEFAULT_CURRENCY, connection)?;

    Ok(setting
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| defaults.default_currency.code().to_owned()))
}

/// The currencies offered to clients.
///
/// Falls back to the built-in currencies when the setting is missing or is
/// not a valid JSON list.
pub fn get_currencies(connection: &Connection) -> Result<Vec<CurrencyInfo>, Error> {
    let default_currencies = || -> Vec<CurrencyInfo> {
        Currency::ALL.into_iter().map(CurrencyInfo::from).collect()
    };

    let Some(setting) = get_setting(CURRENCIES, connection)? else {
        return Ok(default_currencies());
    };

    match serde_json::from_str(&setting) {
        Ok(currencies) => Ok(currencies),
        Err(error) => {
            tracing::warn!("Could not parse the currencies setting, using defaults: {error}");
            Ok(default_currencies())
        }
    }
}

/// The state needed to read settings.
#[derive(Debug, Clone)]
pub struct ConfigState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Fallbacks for settings missing from the database.
    pub setting_defaults: SettingDefaults,
}

impl FromRef<AppState> for ConfigState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            setting_defaults: state.setting_defaults.clone(),
        }
    }
}

/// The query string of a config request, e.g. `?name=paginate_rows&name=currencies`.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigQuery {
    /// The settings to look up.
    #[serde(default)]
    pub name: Vec<String>,
}

/// A route handler returning the requested settings as a JSON object keyed by
/// setting name.
pub async fn get_config_endpoint(
    State(state): State<ConfigState>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<Map<String, Value>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut settings = Map::new();

    for name in query.name {
        let value = match name.as_str() {
            PAGINATE_ROWS => Value::from(get_paginate_rows(&state.setting_defaults, &connection)?),
            DEFAULT_CURRENCY => {
                Value::from(get_default_currency(&state.setting_defaults, &connection)?)
            }
            CURRENCIES => serde_json::to_value(get_currencies(&connection)?)
                .map_err(|error| Error::JSONSerializationError(error.to_string()))?,
            other => get_setting(other, &connection)?
                .map(Value::from)
                .unwrap_or(Value::Null),
        };

        settings.insert(name, value);
    }

    Ok(Json(settings))
}
