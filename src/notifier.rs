use crate::models::ListingRecord;
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FOOTER_LIMIT: usize = 2048;

/// Rendered instead of an empty field value.
pub const NOT_PROVIDED: &str = "not provided";

const EMBED_COLOR: u32 = 0x03b2f8;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no alert destination configured")]
    NotConfigured,
    /// The wrapped error never carries the webhook URL, which embeds its secret token.
    #[error("webhook request failed: {0}")]
    Transport(reqwest::Error),
    #[error("webhook rejected message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub status: u16,
}

/// Announces one new listing to a human.
pub trait Notifier {
    fn notify(&self, listing: &ListingRecord) -> Result<Delivered, DeliveryError>;

    /// Whether a destination exists at all; when false `notify` never attempts delivery.
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookMessage {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// Builds the alert for one listing. Never produces an empty field value.
pub fn build_message(listing: &ListingRecord, username: &str) -> WebhookMessage {
    let price = or_not_provided(&listing.price);
    let link = or_not_provided(&listing.link);

    let title = truncate_chars(&format!("🚨 {}", or_not_provided(&listing.title)), TITLE_LIMIT);
    let description = truncate_chars(
        &format!("New listing found on OLX!\n**Price:** {}", price),
        DESCRIPTION_LIMIT,
    );

    let fields = vec![
        field("💰 Price", &price, true),
        field("💾 Capacity", listing.capacity.as_str(), true),
        field("📍 Location", &listing.location, true),
        field("📅 Added", &listing.date_added, true),
        field("🔗 Link", &format!("[Open listing]({})", link), false),
    ];

    let thumbnail = if listing.image_url.trim().is_empty() {
        None
    } else {
        Some(EmbedImage {
            url: listing.image_url.clone(),
        })
    };

    WebhookMessage {
        username: username.to_string(),
        embeds: vec![Embed {
            title,
            description,
            url: link,
            color: EMBED_COLOR,
            thumbnail,
            fields,
            footer: Some(EmbedFooter {
                text: truncate_chars(&format!("Listing ID: {}", listing.id), FOOTER_LIMIT),
            }),
            timestamp: Some(Utc::now().to_rfc3339()),
        }],
    }
}

fn field(name: &str, value: &str, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: truncate_chars(&or_not_provided(value), FIELD_VALUE_LIMIT),
        inline,
    }
}

fn or_not_provided(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

/// Cuts to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Posts embeds to a Discord-style webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
    username: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>, username: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.filter(|url| !url.trim().is_empty()),
            username: username.to_string(),
        })
    }
}

impl Notifier for DiscordNotifier {
    fn notify(&self, listing: &ListingRecord) -> Result<Delivered, DeliveryError> {
        let webhook_url = self
            .webhook_url
            .as_deref()
            .ok_or(DeliveryError::NotConfigured)?;

        let message = build_message(listing, &self.username);
        debug!("Posting alert for listing {}", listing.id);

        let response = self
            .client
            .post(webhook_url)
            .json(&message)
            .send()
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), 200),
            });
        }

        info!("✅ Sent alert for: {}", listing.title);
        Ok(Delivered {
            status: status.as_u16(),
        })
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}
