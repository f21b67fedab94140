//! Ends the admin's dashboard session.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::{HxRedirect, HxRequest};

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Clear the auth cookie and send the admin back to the log-in page.
///
/// htmx requests get an `HX-Redirect` so the whole page changes, not just the
/// element that made the request.
pub async fn get_log_out(HxRequest(is_htmx): HxRequest, jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    if is_htmx {
        (HxRedirect(endpoints::LOG_IN_VIEW.to_owned()), jar).into_response()
    } else {
        (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
    }
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::get};
    use axum_extra::extract::cookie::{Cookie, Key};
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{COOKIE_TOKEN, get_log_out},
        endpoints,
    };

    fn get_server() -> TestServer {
        let router = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(Key::from(&Sha512::digest("folio")));

        TestServer::try_new(router).expect("could not create test server")
    }

    #[track_caller]
    fn assert_token_cleared(cookie: Cookie<'static>) {
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[tokio::test]
    async fn link_redirects_to_log_in() {
        let response = get_server().get(endpoints::LOG_OUT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
        assert_token_cleared(response.cookie(COOKIE_TOKEN));
    }

    #[tokio::test]
    async fn htmx_gets_a_client_side_redirect() {
        let response = get_server()
            .get(endpoints::LOG_OUT)
            .add_header("hx-request", "true")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), endpoints::LOG_IN_VIEW);
        assert_token_cleared(response.cookie(COOKIE_TOKEN));
    }
}
