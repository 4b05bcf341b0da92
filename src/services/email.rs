// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency alert emails via the SendGrid v3 API.
//!
//! Delivery is best-effort: every failure is logged and reported as `false`,
//! never as an error, so one bad recipient cannot abort an alert.

use crate::models::TrustedContact;
use chrono::Utc;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::time::Duration;

const SUBJECT: &str = "🚨 EMERGENCY ALERT - SafeHaven";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CONCURRENT_SENDS: usize = 10;

/// SendGrid mail client.
#[derive(Clone)]
pub struct EmailService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    sender_email: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl EmailService {
    pub fn new(base_url: String, api_key: Option<String>, sender_email: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            sender_email,
        }
    }

    /// Send one alert email. Returns `true` only when the provider accepts it.
    pub async fn send_alert_email(
        &self,
        recipient_email: &str,
        recipient_name: &str,
        sender_name: &str,
        location: Option<&str>,
    ) -> bool {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("SendGrid API key not configured");
            return false;
        };

        let html = render_alert_html(recipient_name, sender_name, location);
        let body = MailRequest {
            personalizations: [Personalization {
                to: [Address {
                    email: recipient_email,
                    name: Some(recipient_name),
                }],
            }],
            from: Address {
                email: &self.sender_email,
                name: Some("SafeHaven"),
            },
            subject: SUBJECT,
            content: [Content {
                content_type: "text/html",
                value: &html,
            }],
        };

        let url = format!("{}/v3/mail/send", self.base_url);
        let response = match self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(recipient = recipient_email, error = %e, "Failed to send alert email");
                return false;
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::debug!(recipient = recipient_email, status = %status, "Alert email accepted");
            true
        } else {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                recipient = recipient_email,
                status = %status,
                detail = %detail,
                "Email provider rejected alert"
            );
            false
        }
    }

    /// Email every contact, returning the addresses the provider accepted.
    ///
    /// Sends run concurrently (bounded), so the result is in completion order.
    pub async fn notify_contacts(
        &self,
        contacts: &[TrustedContact],
        sender_name: &str,
        location: Option<&str>,
    ) -> Vec<String> {
        let sends: Vec<_> = contacts
            .iter()
            .map(|contact| async move {
                self.send_alert_email(&contact.email, &contact.name, sender_name, location)
                    .await
                    .then(|| contact.email.clone())
            })
            .collect();
        stream::iter(sends)
            .buffer_unordered(MAX_CONCURRENT_SENDS)
            .filter_map(|sent| async move { sent })
            .collect()
            .await
    }
}

/// Render the alert email body. All interpolated values are escaped.
pub fn render_alert_html(recipient_name: &str, sender_name: &str, location: Option<&str>) -> String {
    let location_html = location
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("<p><strong>Location:</strong> {}</p>", html_escape(l)))
        .unwrap_or_default();
    let sent_at = Utc::now().format("%d/%m/%Y at %H:%M:%S");

    format!(
        r##"<html>
    <body style="font-family: Arial, sans-serif; padding: 20px; background-color: #fff5f5;">
        <div style="max-width: 600px; margin: 0 auto; background-color: white; padding: 30px; border-radius: 10px; border-left: 5px solid #dc2626;">
            <h1 style="color: #dc2626; margin-top: 0;">🚨 EMERGENCY ALERT</h1>
            <p style="font-size: 16px; line-height: 1.6;">Hello {recipient},</p>
            <p style="font-size: 16px; line-height: 1.6;"><strong>{sender}</strong> has sent an emergency alert through SafeHaven.</p>
            {location_html}
            <p style="font-size: 16px; line-height: 1.6; color: #dc2626; font-weight: bold;">Please get in touch immediately!</p>
            <hr style="border: none; border-top: 1px solid #e5e5e5; margin: 20px 0;">
            <p style="font-size: 14px; color: #666;">
                Sent {sent_at} UTC<br>
                This is an automatic alert from SafeHaven.
            </p>
        </div>
    </body>
</html>"##,
        recipient = html_escape(recipient_name),
        sender = html_escape(sender_name),
    )
}

fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
