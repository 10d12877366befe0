//! Serialized contract surface.
//!
//! [`AssetContract`] is the boundary the hosting runtime invokes: one
//! operation per lifecycle action, each taking and returning JSON payloads.
//! All domain work is delegated to [`AssetService`]; this layer only
//! decodes requests, encodes responses, and keeps the step names of its
//! failure messages stable.

use formledger_ledger::LedgerGateway;

use crate::{
    error::{RegistryError, RegistryResult},
    filter::Filter,
    service::AssetService,
    types::CreateAssetRequest,
    validate::validate_page_and_size,
};

/// JSON-in/JSON-out facade over the asset lifecycle.
#[derive(Debug, Clone)]
pub struct AssetContract<G> {
    service: AssetService<G>,
}

impl<G: LedgerGateway> AssetContract<G> {
    /// Creates the contract surface on top of the given gateway.
    pub fn new(gateway: G) -> Self {
        Self { service: AssetService::new(gateway) }
    }

    /// Returns the typed service underneath.
    pub fn service(&self) -> &AssetService<G> {
        &self.service
    }

    /// Creates an asset from an encoded creation request and returns the
    /// stored record, encoded.
    pub async fn create_asset(&self, encoded_request: &str) -> RegistryResult<String> {
        let request: CreateAssetRequest = serde_json::from_str(encoded_request)
            .map_err(|source| RegistryError::decode("the given value", source))?;

        let asset = self.service.create(request).await?;
        serde_json::to_string(&asset).map_err(|source| RegistryError::encode("the asset", source))
    }

    /// Returns the asset stored under `id`, encoded.
    pub async fn get_asset_by_id(&self, id: &str) -> RegistryResult<String> {
        let asset = self.service.get_by_id(id).await?;
        serde_json::to_string(&asset).map_err(|source| RegistryError::encode("the asset", source))
    }

    /// Patches the asset stored under `id` with an encoded sparse overlay
    /// and returns the merged record, encoded.
    pub async fn patch_asset(&self, encoded_patch: &[u8], id: &str) -> RegistryResult<String> {
        let asset = self.service.patch_payload(id, encoded_patch).await?;
        serde_json::to_string(&asset).map_err(|source| RegistryError::encode("the asset", source))
    }

    /// Deletes the asset stored under `id`.
    pub async fn delete_asset_by_id(&self, id: &str) -> RegistryResult<bool> {
        self.service.delete_by_id(id).await
    }

    /// Returns one page of the assets matching an encoded filter.
    ///
    /// `page` and `size` arrive as decimal strings; `page` is zero-indexed
    /// and `size` must be at least 1.
    pub async fn get_all_assets(
        &self,
        page: &str,
        size: &str,
        encoded_filter: &[u8],
    ) -> RegistryResult<String> {
        let (page, size) = validate_page_and_size(page, size)?;
        let filter: Filter = serde_json::from_slice(encoded_filter)
            .map_err(|source| RegistryError::decode("filter", source))?;

        let assets = self.service.get_all(page, size, &filter).await?;
        serde_json::to_string(&assets)
            .map_err(|source| RegistryError::encode("the asset page", source))
    }

    /// Returns every recorded revision of `id`, encoded.
    pub async fn get_history_asset_by_id(&self, id: &str) -> RegistryResult<String> {
        let records = self.service.history(id).await?;
        serde_json::to_string(&records)
            .map_err(|source| RegistryError::encode("the final result", source))
    }
}
