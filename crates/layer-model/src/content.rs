//! Business profile data and the field-keyed content map.
//!
//! The [`ContentMap`] is the contract between business data and visual
//! layout: default layouts and designer frames both look content up by
//! [`FieldKey`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known semantic field keys.
pub mod fields {
    pub const LOGO: &str = "logo";
    pub const COMPANY_NAME: &str = "companyName";
    pub const FOOTER_COMPANY_NAME: &str = "footerCompanyName";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
    pub const WEBSITE: &str = "website";
    pub const ADDRESS: &str = "address";
    pub const CATEGORY: &str = "category";
    pub const SERVICES: &str = "services";
    pub const FOOTER_BACKGROUND: &str = "footerBackground";

    /// Every key the default layout can emit.
    pub const KNOWN: &[&str] = &[
        LOGO,
        COMPANY_NAME,
        FOOTER_COMPANY_NAME,
        PHONE,
        EMAIL,
        WEBSITE,
        ADDRESS,
        CATEGORY,
        SERVICES,
        FOOTER_BACKGROUND,
    ];

    /// Text fields painted inside the footer band.
    pub const FOOTER_TEXT: &[&str] = &[
        FOOTER_COMPANY_NAME,
        PHONE,
        EMAIL,
        WEBSITE,
        CATEGORY,
        ADDRESS,
        SERVICES,
    ];
}

/// A stable semantic key identifying what a layer shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key belongs to a text layer inside the footer band.
    pub fn is_footer_text(&self) -> bool {
        fields::FOOTER_TEXT.contains(&self.0.as_str())
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Business profile record supplied by the profile provider.
///
/// Every field is optional; absent or blank values produce no content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub services: Vec<String>,
    /// Logo image reference (URL or local URI).
    pub logo: Option<String>,
}

/// Field-keyed text content derived from a business profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentMap(BTreeMap<FieldKey, String>);

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<FieldKey>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl<K: Into<FieldKey>, V: Into<String>> FromIterator<(K, V)> for ContentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
