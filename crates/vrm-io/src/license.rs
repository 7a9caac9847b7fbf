//! License checkpoint.
//!
//! VRM files embed usage-rights metadata in `extensions.VRM.meta`. Before an
//! import proceeds the metadata is evaluated once and either approved or
//! turned into a list of items a person has to acknowledge. That outcome is a
//! policy decision, not a malformed file, so it is returned as a
//! [`LicenseStatus`] value instead of an error. Callers that have obtained
//! consent re-run the import with the check disabled.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use url::Url;
use vrm_core::json_path;

const META_PATH: [&str; 3] = ["extensions", "VRM", "meta"];

pub const LICENSE_NAME_KEY: &str = "licenseName";
pub const OTHER_PERMISSION_URL_KEY: &str = "otherPermissionUrl";
pub const OTHER_LICENSE_URL_KEY: &str = "otherLicenseUrl";

const VROID_HUB_HOST: &str = "hub.vroid.com";
const UV_LICENSE_HOST: &str = "uv-license.com";

/// Language used when rendering confirmation messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Language {
    #[default]
    English,
    Japanese,
}

/// A message carried in both supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedMessage {
    pub en: String,
    pub ja: String,
}

impl LocalizedMessage {
    pub fn new(en: impl Into<String>, ja: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ja: ja.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.en,
            Language::Japanese => &self.ja,
        }
    }
}

/// One finding that needs explicit consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseConfirmationItem {
    pub url: Option<String>,
    /// Metadata field that triggered the item.
    pub json_key: Option<String>,
    pub message: LocalizedMessage,
}

impl LicenseConfirmationItem {
    fn new(url: Option<String>, json_key: Option<&str>, message: LocalizedMessage) -> Self {
        Self {
            url,
            json_key: json_key.map(str::to_string),
            message,
        }
    }

    pub fn description(&self, language: Language) -> String {
        format!(
            "class=LicenseConfirmationRequired\nurl={}\njson_key={}\nmessage={}\n",
            self.url.as_deref().unwrap_or("None"),
            self.json_key.as_deref().unwrap_or("None"),
            self.message.get(language)
        )
    }
}

/// A row prepared for display by a host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseConfirmationRow {
    pub name: String,
    pub url: String,
    pub json_key: String,
    pub message: String,
}

/// Every confirmation item found in one document, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseConfirmationRequired {
    pub items: Vec<LicenseConfirmationItem>,
}

impl LicenseConfirmationRequired {
    pub fn description(&self, language: Language) -> String {
        self.items
            .iter()
            .map(|item| item.description(language))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn license_confirmations(&self, language: Language) -> Vec<LicenseConfirmationRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| LicenseConfirmationRow {
                name: format!("LicenseConfirmation{}", index),
                url: item.url.clone().unwrap_or_default(),
                json_key: item.json_key.clone().unwrap_or_default(),
                message: item.message.get(language).to_string(),
            })
            .collect()
    }
}

impl fmt::Display for LicenseConfirmationRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description(Language::English))
    }
}

/// Result of evaluating a document's license metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LicenseStatus {
    Approved,
    ConfirmationRequired(LicenseConfirmationRequired),
}

impl LicenseStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, LicenseStatus::Approved)
    }

    pub fn items(&self) -> &[LicenseConfirmationItem] {
        match self {
            LicenseStatus::Approved => &[],
            LicenseStatus::ConfirmationRequired(required) => &required.items,
        }
    }
}

/// `CC` followed somewhere by `ND`, ignoring case: the no-derivatives family.
fn is_no_derivatives_license(license_name: &str) -> bool {
    let upper = license_name.to_ascii_uppercase();
    upper.starts_with("CC") && upper[2..].contains("ND")
}

/// Last value of `key` in the query string, if any.
fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .filter(|(k, _)| k == key)
        .last()
        .map(|(_, v)| v.into_owned())
}

fn is_license_page(url: &Url, host: &str) -> bool {
    url.host_str() == Some(host) && url.path().ends_with("/license")
}

/// VRoid Hub license page. Returns false if `url` is not one.
fn check_vroid_hub_license(url: &Url, json_key: &str, items: &mut Vec<LicenseConfirmationItem>) -> bool {
    if !is_license_page(url, VROID_HUB_HOST) {
        return false;
    }
    if query_value(url, "modification").as_deref() == Some("disallow") {
        items.push(LicenseConfirmationItem::new(
            Some(url.as_str().to_string()),
            Some(json_key),
            LocalizedMessage::new(
                "This VRM is licensed by VRoid Hub License \"Alterations: No\".",
                "このVRMにはVRoid Hubの「改変: NG」ライセンスが設定されています。",
            ),
        ));
    }
    true
}

/// UV License page. Returns false if `url` is not one.
fn check_uv_license(url: &Url, json_key: &str, items: &mut Vec<LicenseConfirmationItem>) -> bool {
    if !is_license_page(url, UV_LICENSE_HOST) {
        return false;
    }
    if query_value(url, "remarks").as_deref() == Some("true") {
        items.push(LicenseConfirmationItem::new(
            Some(url.as_str().to_string()),
            Some(json_key),
            LocalizedMessage::new(
                "This VRM is licensed by UV License with \"Remarks\".",
                "このVRMには特記事項(Remarks)付きのUVライセンスが設定されています。",
            ),
        ));
    }
    true
}

/// Checks a license URL against the known providers.
///
/// Empty strings are ignored. A URL that does not parse, or that belongs to
/// no known provider, yields a generic "custom license" item.
pub fn validate_license_url(url_str: &str, json_key: &str, items: &mut Vec<LicenseConfirmationItem>) {
    if url_str.is_empty() {
        return;
    }
    match Url::parse(url_str) {
        Ok(url) => {
            if check_vroid_hub_license(&url, json_key, items) || check_uv_license(&url, json_key, items) {
                return;
            }
        }
        Err(err) => {
            tracing::debug!(url = url_str, error = %err, "license URL did not parse");
        }
    }
    items.push(LicenseConfirmationItem::new(
        Some(url_str.to_string()),
        Some(json_key),
        LocalizedMessage::new(
            "Is this VRM allowed to edited? Please check its copyright license.",
            "独自のライセンスが記載されています。",
        ),
    ));
}

/// Evaluates the license metadata of a parsed document.
pub fn validate_license(json: &Value) -> LicenseStatus {
    let meta_field = |key: &str| {
        let mut path = META_PATH.to_vec();
        path.push(key);
        json_path::get_str_or(json, &path, "").to_string()
    };
    let mut items = Vec::new();

    let license_name = meta_field(LICENSE_NAME_KEY);
    if is_no_derivatives_license(&license_name) {
        items.push(LicenseConfirmationItem::new(
            None,
            None,
            LocalizedMessage::new(
                format!(
                    "The VRM is licensed by \"{}\".\nNo derivative works are allowed.",
                    license_name
                ),
                format!(
                    "指定されたVRMは改変不可ライセンス「{}」が設定されています。\n改変することはできません。",
                    license_name
                ),
            ),
        ));
    }

    validate_license_url(
        &meta_field(OTHER_PERMISSION_URL_KEY),
        OTHER_PERMISSION_URL_KEY,
        &mut items,
    );

    if license_name == "Other" {
        let other_license_url = meta_field(OTHER_LICENSE_URL_KEY);
        if other_license_url.is_empty() {
            items.push(LicenseConfirmationItem::new(
                None,
                None,
                LocalizedMessage::new(
                    "The VRM selects \"Other\" license but no license url is found.",
                    "このVRMには「Other」ライセンスが指定されていますが、URLが設定されていません。",
                ),
            ));
        } else {
            validate_license_url(&other_license_url, OTHER_LICENSE_URL_KEY, &mut items);
        }
    }

    if items.is_empty() {
        LicenseStatus::Approved
    } else {
        tracing::info!(items = items.len(), "license confirmation required");
        LicenseStatus::ConfirmationRequired(LicenseConfirmationRequired { items })
    }
}
