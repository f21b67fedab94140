//! The dashboard pages for recording and editing incomes and expenses.
//!
//! Each page posts its form back to its own URL with htmx. A saved entry
//! redirects to the list, a rejected one shows an alert above the form.

use axum::{
    Extension, Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    app_state::ListState,
    auth::UserID,
    config::get_default_currency,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        base, loading_spinner, stored_text,
    },
    ledger::{Currency, Entry, EntryForm, EntryKind, create_entry, get_entry, update_entry},
    navigation::NavBar,
    sanitize::editable_text,
    timezone::local_today,
    wallet::{Wallet, get_wallets},
};

/// The dashboard URLs for one kind of entry.
#[derive(Debug, Clone, Copy)]
pub(super) struct EntryViews {
    pub(super) title: &'static str,
    pub(super) noun: &'static str,
    pub(super) list: &'static str,
    pub(super) new: &'static str,
    pub(super) edit: &'static str,
    pub(super) api_item: &'static str,
}

impl EntryViews {
    pub(super) fn of(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Income => Self {
                title: "Incomes",
                noun: "income",
                list: endpoints::INCOMES_VIEW,
                new: endpoints::NEW_INCOME_VIEW,
                edit: endpoints::EDIT_INCOME_VIEW,
                api_item: endpoints::INCOME,
            },
            EntryKind::Expense => Self {
                title: "Expenses",
                noun: "expense",
                list: endpoints::EXPENSES_VIEW,
                new: endpoints::NEW_EXPENSE_VIEW,
                edit: endpoints::EDIT_EXPENSE_VIEW,
                api_item: endpoints::EXPENSE,
            },
        }
    }
}

/// What the form is prefilled with.
struct EntryFormValues<'a> {
    description: String,
    amount: Option<String>,
    currency: &'a str,
    wallet_id: Option<DatabaseId>,
    date: Date,
}

fn entry_form_view(
    kind: EntryKind,
    heading: &str,
    submit_url: &str,
    values: &EntryFormValues,
    wallets: &[Wallet],
    max_date: Date,
) -> Markup {
    let views = EntryViews::of(kind);
    let nav_bar = NavBar::new(views.list).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md"
            {
                h1 class="text-xl font-bold" { (heading) }

                div id="form-alert" {}

                form
                    hx-post=(submit_url)
                    hx-target-error="#form-alert"
                    hx-indicator="#indicator"
                    hx-disabled-elt="find button"
                    class="space-y-4"
                {
                    div
                    {
                        label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                        input
                            type="text"
                            name="description"
                            id="description"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(values.description);
                    }

                    div
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                        input
                            type="number"
                            name="amount"
                            id="amount"
                            min="0.01"
                            step="0.01"
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=[values.amount.as_deref()];
                    }

                    div
                    {
                        label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                        select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for currency in Currency::ALL {
                                option
                                    value=(currency.code())
                                    selected[currency.code() == values.currency]
                                {
                                    (currency.code()) " (" (currency.name()) ")"
                                }
                            }
                        }
                    }

                    div
                    {
                        label for="wallet_id" class=(FORM_LABEL_STYLE) { "Wallet" }
                        select name="wallet_id" id="wallet_id" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" selected[values.wallet_id.is_none()] { "No wallet" }

                            @for wallet in wallets {
                                option
                                    value=(wallet.id)
                                    selected[values.wallet_id == Some(wallet.id)]
                                {
                                    (stored_text(&wallet.name))
                                }
                            }
                        }
                    }

                    div
                    {
                        label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                        input
                            type="date"
                            name="date"
                            id="date"
                            max=(max_date)
                            required
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(values.date);
                    }

                    button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" { (loading_spinner()) }
                        " Save"
                    }
                }
            }
        }
    };

    base(heading, &content)
}

/// Renders the page for recording an income or expense.
pub async fn get_new_entry_page(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let views = EntryViews::of(kind);

    let page = local_today(&state.local_timezone).and_then(|today| {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let currency = get_default_currency(&state.setting_defaults, &connection)?;
        let wallets = get_wallets(user_id, &connection)?;
        let values = EntryFormValues {
            description: String::new(),
            amount: None,
            currency: &currency,
            wallet_id: None,
            date: today,
        };

        Ok(entry_form_view(
            kind,
            &format!("New {}", views.noun),
            views.new,
            &values,
            &wallets,
            today,
        ))
    });

    match page {
        Ok(page) => Html(page.into_string()).into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// Renders the page for editing an income or expense.
pub async fn get_edit_entry_page(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
) -> Response {
    let views = EntryViews::of(kind);

    let page = local_today(&state.local_timezone).and_then(|today| {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let entry = get_entry(kind, entry_id, user_id, &connection)?;
        let wallets = get_wallets(user_id, &connection)?;
        let values = EntryFormValues {
            description: editable_text(&entry.description),
            amount: Some(format!("{:.2}", entry.amount)),
            currency: entry.currency.code(),
            wallet_id: entry.wallet_id,
            date: entry.date,
        };

        Ok(entry_form_view(
            kind,
            &format!("Edit {}", views.noun),
            &format_endpoint(views.edit, entry_id),
            &values,
            &wallets,
            today.max(entry.date),
        ))
    });

    match page {
        Ok(page) => Html(page.into_string()).into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// Redirect htmx to the list of `kind`, or show why the entry was rejected.
fn saved_response(kind: EntryKind, result: Result<Entry, Error>) -> Response {
    match result {
        Ok(_) => (
            HxRedirect(EntryViews::of(kind).list.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// A route handler for the form on the new entry page.
pub async fn create_entry_form_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Response {
    let result = form.map_err(Error::from).and_then(|Form(form)| {
        let today = local_today(&state.local_timezone)?;
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_entry(kind, &form, user_id, today, &connection)
    });

    saved_response(kind, result)
}

/// A route handler for the form on the edit entry page.
pub async fn update_entry_form_endpoint(
    State(state): State<ListState>,
    Extension(kind): Extension<EntryKind>,
    Extension(user_id): Extension<UserID>,
    Path(entry_id): Path<DatabaseId>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Response {
    let result = form.map_err(Error::from).and_then(|Form(form)| {
        let today = local_today(&state.local_timezone)?;
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        update_entry(kind, entry_id, &form, user_id, today, &connection)
    });

    saved_response(kind, result)
}
