//! Remote read surface of the two registries.

use crate::errors::Result;
use async_trait::async_trait;
use land_types::{Address, AssetId, Coordinate, EstateId};

/// Parcels held by one address, as two parallel base-16 arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandHoldings {
    pub xs: Vec<String>,
    pub ys: Vec<String>,
}

/// Read-only view of the LAND (parcel) registry.
#[async_trait]
pub trait ParcelRegistry: Send + Sync {
    /// `landOf(address)`
    async fn land_of(&self, owner: &Address) -> Result<LandHoldings>;

    /// `encodeTokenId(x, y)`
    async fn encode_token_id(&self, coords: Coordinate) -> Result<AssetId>;

    /// `decodeTokenId(id)`
    async fn decode_token_id(&self, asset: &AssetId) -> Result<Coordinate>;

    /// `ownerOfLand(x, y)`
    async fn owner_of_land(&self, coords: Coordinate) -> Result<Address>;

    /// `landData(x, y)`; `None` when the ledger returned no value at all.
    async fn land_data(&self, coords: Coordinate) -> Result<Option<String>>;

    /// `isUpdateAuthorized(operator, id)`. Address comparison on the
    /// registry side is case-sensitive.
    async fn is_update_authorized(&self, operator: &Address, asset: &AssetId) -> Result<bool>;

    /// `updateOperator(id)`
    async fn update_operator(&self, asset: &AssetId) -> Result<Address>;

    /// `getApproved(id)`
    async fn get_approved(&self, asset: &AssetId) -> Result<Address>;
}

/// Read-only view of the Estate registry.
#[async_trait]
pub trait EstateRegistry: Send + Sync {
    async fn balance_of(&self, owner: &Address) -> Result<u64>;

    async fn token_of_owner_by_index(&self, owner: &Address, index: u64) -> Result<EstateId>;

    async fn owner_of(&self, estate: EstateId) -> Result<Address>;

    /// `getMetadata(id)`; `None` when the ledger returned no value at all.
    async fn get_metadata(&self, estate: EstateId) -> Result<Option<String>>;

    async fn get_estate_size(&self, estate: EstateId) -> Result<u64>;

    async fn estate_land_ids(&self, estate: EstateId, index: u64) -> Result<AssetId>;

    /// Estate holding the given LAND token, [`EstateId::NONE`] if none.
    async fn get_land_estate_id(&self, asset: &AssetId) -> Result<EstateId>;

    async fn is_update_authorized(&self, operator: &Address, estate: EstateId) -> Result<bool>;

    async fn get_approved(&self, estate: EstateId) -> Result<Address>;

    async fn update_operator(&self, estate: EstateId) -> Result<Address>;
}
