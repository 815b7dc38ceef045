//! Alert system for displaying success and error messages to users.
//!
//! Alerts are returned as HTML fragments that htmx swaps into the
//! `#alert-container` element via `hx-target-error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_html(self) -> Markup {
        let (container_style, icon) = match self.alert_type {
            AlertType::Success => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg border \
                border-green-300 bg-green-50 text-green-800 \
                dark:border-green-800 dark:bg-gray-800 dark:text-green-400",
                "✓",
            ),
            AlertType::Error => (
                "flex items-start gap-3 p-4 mb-4 rounded-lg border \
                border-red-300 bg-red-50 text-red-800 \
                dark:border-red-800 dark:bg-gray-800 dark:text-red-400",
                "!",
            ),
        };

        html!(
            div class=(container_style) role="alert"
            {
                span class="font-bold" { (icon) }

                div class="flex-1 text-sm"
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty()
                    {
                        p { (self.details) }
                    }
                }

                button
                    type="button"
                    class="font-bold cursor-pointer"
                    aria-label="Dismiss"
                    onclick="document.getElementById('alert-container').classList.add('hidden');"
                {
                    "×"
                }
            }

            // The container starts out hidden, reveal it when an alert arrives.
            script
            {
                (PreEscaped(
                    "document.getElementById('alert-container').classList.remove('hidden');"
                ))
            }
        )
    }
}

/// Render `template` as an HTML fragment response with `status_code`.
#[inline]
pub fn render_alert(status_code: StatusCode, template: AlertTemplate) -> Response {
    (status_code, template.into_html()).into_response()
}
