//! Application router configuration with public and protected route definitions.

use axum::{
    Extension, Router, middleware,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_api, get_log_in_page, get_log_out, post_log_in},
    cashbook::{get_cashbook_endpoint, get_cashbook_view, get_reconcile_endpoint},
    config::get_config_endpoint,
    content::{
        ContentKind, create_content_endpoint, delete_content_endpoint, get_content_endpoint,
        get_content_list_endpoint, select_content_endpoint, update_content_endpoint,
    },
    dashboard::{get_dashboard_endpoint, get_dashboard_page},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    ledger::{
        EntryKind, create_entry_endpoint, create_entry_form_endpoint, delete_entry_endpoint,
        get_edit_entry_page, get_entries_endpoint, get_entry_endpoint, get_expenses_page,
        get_incomes_page, get_new_entry_page, restore_entry_endpoint, update_entry_endpoint,
        update_entry_form_endpoint,
    },
    message::{
        count_unseen_messages_endpoint, create_message_endpoint, delete_message_endpoint,
        get_message_endpoint, get_messages_endpoint, update_message_endpoint,
    },
    not_found::get_404_not_found,
    portfolio::{get_article_page, get_home_page, get_more_content, get_project_page},
    wallet::{
        create_wallet_endpoint, create_wallet_form_endpoint, delete_wallet_endpoint,
        get_edit_wallet_page, get_new_wallet_page, get_wallet_endpoint, get_wallets_endpoint,
        get_wallets_page, update_wallet_endpoint, update_wallet_form_endpoint,
    },
};

/// The public and admin routes of one content kind.
fn content_routes(
    kind: ContentKind,
    list: &'static str,
    single: &'static str,
    select: &'static str,
    more: &'static str,
    state: &AppState,
) -> Router<AppState> {
    let public = Router::new()
        .route(more, get(get_more_content))
        .route(list, get(get_content_list_endpoint))
        .route(single, get(get_content_endpoint))
        .route(select, get(select_content_endpoint));

    let admin = Router::new()
        .route(list, post(create_content_endpoint))
        .route(
            single,
            put(update_content_endpoint).delete(delete_content_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    public.merge(admin).layer(Extension(kind))
}

/// The JSON routes of one entry kind, all of which need a logged in admin.
fn entry_routes(
    kind: EntryKind,
    list: &'static str,
    single: &'static str,
    restore: &'static str,
) -> Router<AppState> {
    Router::new()
        .route(list, get(get_entries_endpoint).post(create_entry_endpoint))
        .route(
            single,
            get(get_entry_endpoint)
                .put(update_entry_endpoint)
                .delete(delete_entry_endpoint),
        )
        .route(restore, post(restore_entry_endpoint))
        .layer(Extension(kind))
}

/// The dashboard pages for recording and editing one entry kind.
fn entry_form_routes(kind: EntryKind, new: &'static str, edit: &'static str) -> Router<AppState> {
    Router::new()
        .route(new, get(get_new_entry_page).post(create_entry_form_endpoint))
        .route(edit, get(get_edit_entry_page).post(update_entry_form_endpoint))
        .layer(Extension(kind))
}

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(endpoints::ROOT, get(get_home_page))
        .route(endpoints::ARTICLE_VIEW, get(get_article_page))
        .route(endpoints::PROJECT_VIEW, get(get_project_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::MESSAGES, post(create_message_endpoint));

    let protected_pages = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::CASHBOOK_VIEW, get(get_cashbook_view))
        .route(endpoints::WALLETS_VIEW, get(get_wallets_page))
        .route(endpoints::INCOMES_VIEW, get(get_incomes_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(
            endpoints::NEW_WALLET_VIEW,
            get(get_new_wallet_page).post(create_wallet_form_endpoint),
        )
        .route(
            endpoints::EDIT_WALLET_VIEW,
            get(get_edit_wallet_page).post(update_wallet_form_endpoint),
        )
        .merge(entry_form_routes(
            EntryKind::Income,
            endpoints::NEW_INCOME_VIEW,
            endpoints::EDIT_INCOME_VIEW,
        ))
        .merge(entry_form_routes(
            EntryKind::Expense,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::EDIT_EXPENSE_VIEW,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let protected_api = Router::new()
        .route(
            endpoints::WALLETS,
            get(get_wallets_endpoint).post(create_wallet_endpoint),
        )
        .route(
            endpoints::WALLET,
            get(get_wallet_endpoint)
                .put(update_wallet_endpoint)
                .delete(delete_wallet_endpoint),
        )
        .merge(entry_routes(
            EntryKind::Income,
            endpoints::INCOMES,
            endpoints::INCOME,
            endpoints::RESTORE_INCOME,
        ))
        .merge(entry_routes(
            EntryKind::Expense,
            endpoints::EXPENSES,
            endpoints::EXPENSE,
            endpoints::RESTORE_EXPENSE,
        ))
        .route(endpoints::CASHBOOK, get(get_cashbook_endpoint))
        .route(endpoints::CASHBOOK_RECONCILE, get(get_reconcile_endpoint))
        .route(endpoints::DASHBOARD_API, get(get_dashboard_endpoint))
        .route(endpoints::CONFIG, get(get_config_endpoint))
        .route(endpoints::MESSAGES, get(get_messages_endpoint))
        .route(
            endpoints::MESSAGES_COUNT,
            get(count_unseen_messages_endpoint),
        )
        .route(
            endpoints::MESSAGE,
            get(get_message_endpoint)
                .put(update_message_endpoint)
                .delete(delete_message_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    let content = content_routes(
        ContentKind::Article,
        endpoints::ARTICLES,
        endpoints::ARTICLE,
        endpoints::SELECT_ARTICLE,
        endpoints::MORE_ARTICLES,
        &state,
    )
    .merge(content_routes(
        ContentKind::Project,
        endpoints::PROJECTS,
        endpoints::PROJECT,
        endpoints::SELECT_PROJECT,
        endpoints::MORE_PROJECTS,
        &state,
    ));

    public_routes
        .merge(protected_pages)
        .merge(protected_api)
        .merge(content)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
