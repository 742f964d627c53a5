//! Item (marketplace listing) domain model.
//!
//! # Responsibility
//! - Define the persisted item record and its wire shape.
//! - Define drafts (items before identity assignment) and partial patches.
//!
//! # Invariants
//! - A persisted item always has a non-nil `id` and a `created_at`.
//! - `id` and `created_at` are never changed by a patch.
//! - `owner` is a plain account identifier string, not an enforced relation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Server-assigned item identifier.
pub type ItemId = Uuid;

/// Persisted marketplace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub owner: String,
    /// Unix epoch milliseconds, assigned at insertion.
    pub created_at: i64,
}

impl Item {
    /// Rejects records that could never have been persisted.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        validate_name(&self.name)
    }
}

/// Item submitted for creation; identity and timestamp are assigned later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    #[serde(default)]
    pub owner: String,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_name(&self.name)
    }
}

/// Validation errors for item drafts, identifiers and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    NilId,
    BlankId,
    MalformedId(String),
    EmptyPatch,
    ImmutableField(String),
    UnknownField(String),
    NonStringValue(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::NilId => write!(f, "item id must not be nil"),
            Self::BlankId => write!(f, "item id must not be blank"),
            Self::MalformedId(value) => write!(f, "malformed item id `{value}`"),
            Self::EmptyPatch => write!(f, "patch must set at least one field"),
            Self::ImmutableField(field) => write!(f, "field `{field}` is immutable"),
            Self::UnknownField(field) => write!(f, "unknown item field `{field}`"),
            Self::NonStringValue(field) => write!(f, "field `{field}` must be a string"),
        }
    }
}

impl Error for ItemValidationError {}

const MAX_ID_CHARS: usize = 128;

/// Resolves caller-supplied identifier text.
///
/// Blank, oversized or control-character input is malformed. Other text
/// that is not an assignable id resolves to `None`: no item can carry it.
pub fn resolve_item_id(value: &str) -> Result<Option<ItemId>, ItemValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::BlankId);
    }
    if trimmed.chars().count() > MAX_ID_CHARS || trimmed.chars().any(char::is_control) {
        return Err(ItemValidationError::MalformedId(
            trimmed.chars().take(MAX_ID_CHARS).collect(),
        ));
    }
    Ok(parse_item_id(trimmed).ok())
}

/// Parses an external identifier into an `ItemId`.
pub fn parse_item_id(value: &str) -> Result<ItemId, ItemValidationError> {
    let trimmed = value.trim();
    let id = Uuid::parse_str(trimmed)
        .map_err(|_| ItemValidationError::MalformedId(trimmed.to_string()))?;
    if id.is_nil() {
        return Err(ItemValidationError::NilId);
    }
    Ok(id)
}

/// Partial field update for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub owner: Option<String>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn image_url(mut self, value: impl Into<String>) -> Self {
        self.image_url = Some(value.into());
        self
    }

    pub fn owner(mut self, value: impl Into<String>) -> Self {
        self.owner = Some(value.into());
        self
    }

    /// Builds a patch from a wire-level field map.
    ///
    /// Keys use wire names (`name`, `description`, `imageURL`, `owner`).
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ItemValidationError> {
        let mut patch = Self::default();
        for (field, value) in fields {
            let slot = match field.as_str() {
                "name" => &mut patch.name,
                "description" => &mut patch.description,
                "imageURL" => &mut patch.image_url,
                "owner" => &mut patch.owner,
                "id" | "_id" | "createdAt" => {
                    return Err(ItemValidationError::ImmutableField(field.clone()));
                }
                _ => return Err(ItemValidationError::UnknownField(field.clone())),
            };
            let text = value
                .as_str()
                .ok_or_else(|| ItemValidationError::NonStringValue(field.clone()))?;
            *slot = Some(text.to_string());
        }
        patch.validate()?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.owner.is_none()
    }

    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.is_empty() {
            return Err(ItemValidationError::EmptyPatch);
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Writes every set field onto `item`; identity fields are untouched.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            item.description.clone_from(description);
        }
        if let Some(image_url) = &self.image_url {
            item.image_url.clone_from(image_url);
        }
        if let Some(owner) = &self.owner {
            item.owner.clone_from(owner);
        }
    }
}

fn validate_name(name: &str) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(())
}
