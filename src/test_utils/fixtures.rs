use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppState, PaginationConfig, SettingDefaults,
    auth::{NewAdmin, PasswordHash, UserID, ValidatedPassword, create_admin},
    db::initialize,
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

/// Insert an admin with the password "test" and return their ID.
#[track_caller]
pub(crate) fn insert_test_admin(email: &str, connection: &Connection) -> UserID {
    create_admin(
        NewAdmin {
            user_name: "Test Admin".to_owned(),
            email: email.to_owned(),
            password_hash: PasswordHash::new(ValidatedPassword::new_unchecked("test"), 4)
                .expect("Could not hash password"),
        },
        connection,
    )
    .expect("Could not create test admin")
    .id
}

pub(crate) fn shared(connection: Connection) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(connection))
}

pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open in-memory SQLite database"),
        "42",
        "Etc/UTC",
        PaginationConfig::default(),
        SettingDefaults::default(),
    )
    .expect("Could not create app state")
}
