//! Route guards that check the auth cookie before a request reaches its
//! handler, and slide the cookie expiry forward on activity.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    app_state::AuthSessionState,
    auth::{
        build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
    timezone::get_local_offset,
};

/// How far the cookie expiry is pushed out on each authenticated request.
const ACTIVITY_EXTENSION: Duration = Duration::minutes(5);

/// Guard for full page routes.
///
/// Requests with a valid auth cookie run normally with the user ID inserted
/// as a request extension (`Extension(user_id): Extension<UserID>`). Anything
/// else is answered with a 303 redirect to the log-in page.
pub async fn auth_guard(
    State(state): State<AuthSessionState>,
    request: Request,
    next: Next,
) -> Response {
    run_guard(state, request, next, |url| {
        Redirect::to(url).into_response()
    })
    .await
}

/// Guard for API routes called from HTMX.
///
/// Same checks as [auth_guard], but an unauthenticated request gets a 200
/// response carrying an `HX-Redirect` header, since HTMX ignores ordinary
/// redirect statuses on AJAX requests.
pub async fn auth_guard_hx(
    State(state): State<AuthSessionState>,
    request: Request,
    next: Next,
) -> Response {
    run_guard(state, request, next, |url| {
        (HxRedirect(url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

async fn run_guard(
    state: AuthSessionState,
    request: Request,
    next: Next,
    reject: fn(&str) -> Response,
) -> Response {
    // Work out where to send an unauthenticated client before the request is
    // consumed. The redirect carries the original target so the client lands
    // back where they were headed after logging in.
    let log_in_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => {
            tracing::error!("Error getting local timezone. Redirecting to log in page.");
            return reject(&log_in_url);
        }
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return reject(&log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return reject(&log_in_url),
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    append_extended_cookie(response, jar, local_offset)
}

/// Copy the refreshed token cookie onto the handler's response.
///
/// If the expiry cannot be extended the existing cookie is sent back
/// unchanged rather than dropping the session.
fn append_extended_cookie(
    response: Response,
    jar: PrivateCookieJar,
    local_offset: time::UtcOffset,
) -> Response {
    let jar = match extend_auth_cookie_duration_if_needed(
        jar.clone(),
        ACTIVITY_EXTENSION,
        local_offset,
    ) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error:?}. Keeping old cookie.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();
    for (name, value) in jar.into_response().headers() {
        if name == SET_COOKIE {
            parts.headers.append(name, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod auth_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, SameSite},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        app_state::AuthSessionState,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, auth_guard, auth_guard_hx, set_auth_cookie},
        endpoints,
        timezone::get_local_offset,
        user::UserID,
    };

    const OVERVIEW_PAGE: &str = "/overview";
    const OVERVIEW_API: &str = "/api/overview";
    const SESSION_STUB: &str = "/session";

    async fn overview_stub() -> Html<&'static str> {
        Html("<h1>Your money at a glance</h1>")
    }

    /// Stand-in for the log-in handler: issues an auth cookie for user 1.
    async fn session_stub(
        State(state): State<AuthSessionState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let offset = get_local_offset(&state.local_timezone).unwrap();

        set_auth_cookie(jar, UserID::new(1), state.cookie_duration, offset)
    }

    fn guarded_server(cookie_duration: Duration) -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let mut state =
            AuthSessionState::new("beanstalk", "Etc/UTC", Arc::new(Mutex::new(connection)));
        state.cookie_duration = cookie_duration;

        let page_routes = Router::new()
            .route(OVERVIEW_PAGE, get(overview_stub))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));
        let api_routes = Router::new()
            .route(OVERVIEW_API, get(overview_stub))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

        let app = page_routes
            .merge(api_routes)
            .route(SESSION_STUB, post(session_stub))
            .with_state(state);

        TestServer::new(app)
    }

    fn expected_log_in_location(target: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", target)]).unwrap();
        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn valid_cookie_reaches_the_protected_page() {
        let server = guarded_server(DEFAULT_COOKIE_DURATION);
        let log_in_response = server.post(SESSION_STUB).await;
        log_in_response.assert_status_ok();

        server
            .get(OVERVIEW_PAGE)
            .add_cookie(log_in_response.cookie(COOKIE_TOKEN))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn guard_reissues_the_token_cookie() {
        let server = guarded_server(DEFAULT_COOKIE_DURATION);
        let log_in_response = server.post(SESSION_STUB).await;
        log_in_response.assert_status_ok();

        let response = server
            .get(OVERVIEW_PAGE)
            .add_cookies(log_in_response.cookies())
            .await;

        assert!(
            response.cookies().get(COOKIE_TOKEN).is_some(),
            "expected the guard to set a fresh token cookie"
        );
    }

    #[tokio::test]
    async fn activity_pushes_the_cookie_expiry_forward() {
        let server = guarded_server(Duration::seconds(5));
        let log_in_response = server.post(SESSION_STUB).await;
        log_in_response.assert_status_ok();
        let logged_in_at = OffsetDateTime::now_utc();

        let jar = log_in_response.cookies();
        assert_date_time_close(
            jar.get(COOKIE_TOKEN).unwrap().expires_datetime().unwrap(),
            logged_in_at + Duration::seconds(5),
        );

        let response = server.get(OVERVIEW_PAGE).add_cookies(jar).await;

        let refreshed = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            refreshed.expires_datetime().unwrap(),
            logged_in_at + Duration::minutes(5),
        );
        assert_eq!(refreshed.secure(), Some(true));
        assert_eq!(refreshed.http_only(), Some(true));
        assert_eq!(refreshed.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn missing_cookie_redirects_to_log_in() {
        let server = guarded_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(OVERVIEW_PAGE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(OVERVIEW_PAGE)
        );
    }

    #[tokio::test]
    async fn garbage_cookie_redirects_to_log_in() {
        let server = guarded_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(OVERVIEW_PAGE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "not-a-real-token")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(OVERVIEW_PAGE)
        );
    }

    #[tokio::test]
    async fn expired_cookie_redirects_to_log_in() {
        let server = guarded_server(Duration::minutes(-5));
        let log_in_response = server.post(SESSION_STUB).await;
        log_in_response.assert_status_ok();

        let response = server
            .get(OVERVIEW_PAGE)
            .add_cookie(log_in_response.cookie(COOKIE_TOKEN))
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_log_in_location(OVERVIEW_PAGE)
        );
    }

    #[tokio::test]
    async fn api_route_redirects_via_hx_header() {
        let server = guarded_server(DEFAULT_COOKIE_DURATION);
        let current_url = "/dashboard?period=month";

        let response = server
            .get(OVERVIEW_API)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            expected_log_in_location(current_url)
        );
    }
}
