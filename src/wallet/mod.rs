mod core;
mod endpoints;
mod form;
mod page;

pub use core::{
    MAX_WALLET_NAME_LENGTH, Wallet, WalletForm, create_wallet, create_wallet_table, delete_wallet,
    get_wallet, get_wallets, update_wallet,
};
pub use endpoints::{
    create_wallet_endpoint, delete_wallet_endpoint, get_wallet_endpoint, get_wallets_endpoint,
    update_wallet_endpoint,
};
pub use form::{
    create_wallet_form_endpoint, get_edit_wallet_page, get_new_wallet_page,
    update_wallet_form_endpoint,
};
pub use page::get_wallets_page;
