//! Query surface consumed by the rest of the application.

use crate::errors::Result;
use async_trait::async_trait;
use land_types::{Address, Coordinate, EstateId, MetadataRecord};

/// Ownership, containment and authorization queries over LAND and Estates.
///
/// Every method is read-only. Composite answers (an Estate's parcels, an
/// owner's Estates) are assembled from several reads and are not a
/// consistent snapshot of the ledger.
#[async_trait]
pub trait LandDataProvider: Send + Sync {
    /// Parcels held directly by `owner`.
    async fn get_land_of(&self, owner: &Address) -> Result<Vec<Coordinate>>;

    /// Estates held by `owner`, in registry index order.
    async fn get_estates_of(&self, owner: &Address) -> Result<Vec<EstateId>>;

    async fn get_land_data(&self, coords: Coordinate) -> Result<Option<MetadataRecord>>;

    async fn get_estate_data(&self, estate: EstateId) -> Result<Option<MetadataRecord>>;

    async fn get_land_owner(&self, coords: Coordinate) -> Result<Address>;

    async fn get_estate_owner(&self, estate: EstateId) -> Result<Address>;

    /// Address approved to transfer the parcel (zero address if none).
    async fn get_land_operator(&self, coords: Coordinate) -> Result<Address>;

    async fn get_estate_operator(&self, estate: EstateId) -> Result<Address>;

    /// Address allowed to update the parcel's metadata (zero address if none).
    async fn get_land_update_operator(&self, coords: Coordinate) -> Result<Address>;

    async fn get_estate_update_operator(&self, estate: EstateId) -> Result<Address>;

    /// Parcels contained in `estate`, in member index order.
    async fn get_land_of_estate(&self, estate: EstateId) -> Result<Vec<Coordinate>>;

    /// Estate containing the parcel, [`EstateId::NONE`] if it stands alone.
    async fn get_estate_id_of_land(&self, coords: Coordinate) -> Result<EstateId>;

    /// Whether `owner` may update the parcel.
    async fn is_update_authorized(&self, owner: &Address, coords: Coordinate) -> Result<bool>;

    /// Fails unless `owner` may update the parcel.
    async fn validate_authorization_of_parcel(&self, owner: &Address, coords: Coordinate)
        -> Result<()>;

    /// Fails unless `owner` may update every parcel. Checks run concurrently;
    /// when several fail, which failure is reported is unspecified.
    async fn validate_authorization(&self, owner: &Address, parcels: &[Coordinate]) -> Result<()>;
}
