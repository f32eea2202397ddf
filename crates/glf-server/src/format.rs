//! Public projection of stored token records.
//!
//! Stored records carry bare file names. Responses rewrite them into full
//! URLs and, for single-token responses, add a marketplace-style attribute
//! list. Formatting never touches the stored record.

use chrono::{DateTime, Utc};
use glf_types::{TokenId, TokenRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public URL prefixes used when formatting tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUrls {
    pub image_base_path: String,
    pub image_full_route: String,
    pub image_preview_route: String,
    pub external_url_base: String,
}

impl PublicUrls {
    pub fn full_image(&self, file_name: &str) -> String {
        format!("{}{}{}", self.image_base_path, self.image_full_route, file_name)
    }

    /// Previews are always addressed as `<id>.jpg`.
    pub fn preview_image(&self, id: TokenId) -> String {
        format!("{}{}{}.jpg", self.image_base_path, self.image_preview_route, id)
    }

    pub fn external_url(&self, id: TokenId) -> String {
        format!("{}{}", self.external_url_base, id)
    }
}

/// One entry of a token's `attributes` list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    pub trait_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    pub value: Value,
}

/// A token as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub token_id: TokenId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    pub hashtags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Preview URL.
    pub image: String,
    /// Full-resolution image URL, if the token has an image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullimage: Option<String>,
    #[serde(with = "glf_types::timestamp::iso_millis")]
    pub date_created: DateTime<Utc>,
    #[serde(rename = "external_url")]
    pub external_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

/// Response body of the token listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenList {
    pub tokens: Vec<TokenView>,
    pub hashtags: Vec<String>,
}

/// Format a record for listings.
pub fn format_token(record: &TokenRecord, urls: &PublicUrls) -> TokenView {
    TokenView {
        token_id: record.token_id,
        name: record.name.clone(),
        artist: record.artist.clone(),
        hashtags: record.hashtags.clone(),
        description: record.description.clone(),
        owner: record.owner.clone(),
        tx_hash: record.tx_hash.clone(),
        image: urls.preview_image(record.token_id),
        fullimage: record.image.as_deref().map(|f| urls.full_image(f)),
        date_created: record.date_created,
        external_url: urls.external_url(record.token_id),
        attributes: None,
    }
}

/// Format a record for a single-token response, including `attributes`.
pub fn format_token_detail(record: &TokenRecord, urls: &PublicUrls) -> TokenView {
    let mut view = format_token(record, urls);
    view.attributes = Some(attributes(record));
    view
}

fn attributes(record: &TokenRecord) -> Vec<Attribute> {
    let mut attrs = vec![
        Attribute {
            trait_type: "Date of creation".into(),
            display_type: Some("date".into()),
            value: Value::from(record.created_at_secs()),
        },
        Attribute {
            trait_type: "Artist".into(),
            display_type: None,
            value: record.artist.clone().map_or(Value::Null, Value::from),
        },
    ];
    if !record.hashtags.is_empty() {
        attrs.push(Attribute {
            trait_type: "Tags".into(),
            display_type: None,
            value: Value::from(record.hashtags.join(" ")),
        });
    }
    attrs
}
