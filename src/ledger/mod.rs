//! Incomes and expenses, and the cashbook rows that mirror them.

pub(crate) mod core;
mod db;
mod endpoints;
mod form;
mod page;

pub use core::{Currency, Entry, EntryForm, EntryKind};
pub use db::{
    create_entry, create_entry_tables, delete_entry, get_entries_page, get_entry, restore_entry,
    update_entry,
};
pub use endpoints::{
    create_entry_endpoint, delete_entry_endpoint, get_entries_endpoint, get_entry_endpoint,
    restore_entry_endpoint, update_entry_endpoint,
};
pub use form::{
    create_entry_form_endpoint, get_edit_entry_page, get_new_entry_page,
    update_entry_form_endpoint,
};
pub use page::{get_expenses_page, get_incomes_page};
