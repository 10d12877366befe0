//! Domain records and wire DTOs for the asset registry.
//!
//! The [`Asset`] record is serialized as the ledger value stored under its
//! `id`; the request types mirror the wire payloads of the contract
//! surface. Missing string fields decode to empty strings and a missing
//! timestamp to `None`, so incomplete payloads fail validation rather than
//! decoding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use formledger_ledger::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::validate::{is_valid, normalize};

/// An asset record.
///
/// Invariant: once created, `id` never changes; every other field may be
/// overwritten only through a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique ledger key of this asset.
    pub id: String,

    /// Kind of form this asset was captured from.
    pub type_form: String,

    /// Free-text description.
    pub description: String,

    /// When the asset was captured.
    pub timestamp: DateTime<Utc>,

    /// How the asset entered the registry.
    pub insertion_type: String,

    /// Content hash of the captured payload.
    pub hash: String,
}

/// Payload of a create request.
///
/// All six fields are required: the five strings must be non-empty after
/// space stripping and the timestamp must be present. Fields left out of
/// the payload decode to their empty form and are rejected by
/// [`into_asset`](Self::into_asset).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct CreateAssetRequest {
    /// Requested ledger key.
    #[serde(default)]
    #[builder(into)]
    pub id: String,

    /// Kind of form this asset was captured from.
    #[serde(default)]
    #[builder(into)]
    pub type_form: String,

    /// Free-text description.
    #[serde(default)]
    #[builder(into)]
    pub description: String,

    /// When the asset was captured.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// How the asset entered the registry.
    #[serde(default)]
    #[builder(into)]
    pub insertion_type: String,

    /// Content hash of the captured payload.
    #[serde(default)]
    #[builder(into)]
    pub hash: String,
}

impl CreateAssetRequest {
    /// Normalizes and validates the request, producing the record to store.
    ///
    /// Token fields (`id`, `type_form`, `insertion_type`, `hash`) are stored
    /// space-stripped; the free-text `description` is checked on its
    /// stripped form but stored as given.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidFields`](crate::RegistryError::InvalidFields)
    /// when any field is missing or empty after normalization.
    pub fn into_asset(self) -> crate::error::RegistryResult<Asset> {
        let id = normalize(&self.id);
        let type_form = normalize(&self.type_form);
        let insertion_type = normalize(&self.insertion_type);
        let hash = normalize(&self.hash);

        let Some(timestamp) = self.timestamp else {
            return Err(crate::error::RegistryError::InvalidFields);
        };
        let all_valid = is_valid(&id)
            && is_valid(&type_form)
            && is_valid(&normalize(&self.description))
            && is_valid(&insertion_type)
            && is_valid(&hash);
        if !all_valid {
            return Err(crate::error::RegistryError::InvalidFields);
        }

        Ok(Asset {
            id,
            type_form,
            description: self.description,
            timestamp,
            insertion_type,
            hash,
        })
    }
}

/// Payload of a patch request.
///
/// Every field is optional; `id` is path-supplied and immutable, so it does
/// not appear here. A field overwrites its counterpart on the stored asset
/// only when it is usable after normalization (non-empty string, or present
/// timestamp).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct PatchAssetRequest {
    /// Replacement form kind.
    #[serde(default)]
    #[builder(into)]
    pub type_form: Option<String>,

    /// Replacement description.
    #[serde(default)]
    #[builder(into)]
    pub description: Option<String>,

    /// Replacement capture time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Replacement insertion kind.
    #[serde(default)]
    #[builder(into)]
    pub insertion_type: Option<String>,

    /// Replacement content hash.
    #[serde(default)]
    #[builder(into)]
    pub hash: Option<String>,
}

impl PatchAssetRequest {
    /// Space-strips every string field, keeping `None`s as they are.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            type_form: self.type_form.as_deref().map(normalize),
            description: self.description.as_deref().map(normalize),
            timestamp: self.timestamp,
            insertion_type: self.insertion_type.as_deref().map(normalize),
            hash: self.hash.as_deref().map(normalize),
        }
    }

    /// Whether at least one field resolves to a usable value.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.usable(&self.type_form)
            || self.usable(&self.description)
            || self.timestamp.is_some()
            || self.usable(&self.insertion_type)
            || self.usable(&self.hash)
    }

    /// Builds the merged record: `current` with every usable field of this
    /// overlay replacing its counterpart. `current` itself is consumed, not
    /// mutated in place.
    #[must_use]
    pub fn apply_to(&self, current: Asset) -> Asset {
        Asset {
            id: current.id,
            type_form: self.pick(&self.type_form, current.type_form),
            description: self.pick(&self.description, current.description),
            timestamp: self.timestamp.unwrap_or(current.timestamp),
            insertion_type: self.pick(&self.insertion_type, current.insertion_type),
            hash: self.pick(&self.hash, current.hash),
        }
    }

    fn usable(&self, field: &Option<String>) -> bool {
        field.as_deref().is_some_and(is_valid)
    }

    fn pick(&self, field: &Option<String>, current: String) -> String {
        match field.as_deref() {
            Some(value) if is_valid(value) => value.to_string(),
            _ => current,
        }
    }
}

/// One past revision of an asset, as exposed on the wire.
///
/// The revision value is base64 since ledger history carries raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Identifier of the transaction that produced this revision.
    pub tx_id: String,

    /// When the mutation was committed.
    pub timestamp: DateTime<Utc>,

    /// Base64 of the value written by the mutation. Empty for deletions.
    pub value: String,

    /// Whether this revision removed the key.
    pub is_delete: bool,
}

impl From<HistoryEntry> for HistoryRecord {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            tx_id: entry.tx_id,
            timestamp: entry.timestamp,
            value: BASE64.encode(&entry.value),
            is_delete: entry.is_delete,
        }
    }
}
