//! The cashbook: one row per income or expense, written in the same
//! transaction as the entry it mirrors.

mod core;
mod endpoints;
mod page;
mod reconcile;

pub use core::{CashbookEntry, create_cashbook_table, get_cashbook_page};
pub(crate) use core::{delete_mirror, insert_mirror, restore_mirror, update_mirror};
pub use endpoints::{get_cashbook_endpoint, get_reconcile_endpoint};
pub use page::get_cashbook_view;
pub use reconcile::{ReconcileReport, reconcile_cashbook};
