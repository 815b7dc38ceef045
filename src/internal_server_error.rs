//! The 500 page shown when something goes wrong server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::endpoints;

pub async fn get_internal_server_error() -> Response {
    render_internal_server_error(
        "Something went wrong",
        "An unexpected error occurred. Please try again.",
    )
}

pub fn render_internal_server_error(description: &str, fix: &str) -> Response {
    let page = crate::html::error_view("Internal Server Error", "500", description, fix);

    (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
}

/// Redirect an htmx request to the 500 page.
pub fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::http::StatusCode;

    use crate::{endpoints, test_utils::assert_valid_html};

    use super::{get_internal_server_error, get_internal_server_error_redirect};

    #[tokio::test]
    async fn returns_internal_server_error_status_and_page() {
        let response = get_internal_server_error().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_valid_html(response).await;
    }

    #[test]
    fn redirect_sets_hx_redirect_header_and_see_other_status() {
        let response = get_internal_server_error_redirect();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("HX-Redirect").unwrap(),
            endpoints::INTERNAL_ERROR_VIEW
        );
    }
}
