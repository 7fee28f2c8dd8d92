//! Update-authorization branches.
//!
//! A parcel is checked either through the Estate that contains it or
//! directly against the LAND registry. The two checks normalize the caller
//! address differently: the LAND registry compares addresses
//! case-sensitively and is queried with the lowercase form, while the Estate
//! registry receives the address exactly as supplied. Keep them separate.

use crate::errors::*;
use land_registry::{EstateRegistry, ParcelRegistry};
use land_types::{Address, Coordinate, EstateId};
use tracing::debug;

/// Which registry decides whether an address may update a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationPath {
    /// The parcel belongs to this Estate; only the Estate registry is asked.
    ViaEstate(EstateId),
    /// The parcel stands alone; the LAND registry is asked.
    Direct,
}

impl AuthorizationPath {
    pub fn for_estate(estate: EstateId) -> Self {
        if estate.is_none() {
            AuthorizationPath::Direct
        } else {
            AuthorizationPath::ViaEstate(estate)
        }
    }
}

/// Estate branch. `owner` is passed through untouched.
pub async fn estate_update_authorized(
    estates: &dyn EstateRegistry,
    owner: &Address,
    estate: EstateId,
) -> Result<bool> {
    debug!(%owner, %estate, "checking update authorization via estate");
    estates
        .is_update_authorized(owner, estate)
        .await
        .map_err(|e| ResolverError::ledger("Unable to fetch Estate authorization", e))
}

/// Direct branch. The LAND registry is queried with `owner` lowercased.
pub async fn parcel_update_authorized(
    parcels: &dyn ParcelRegistry,
    owner: &Address,
    coords: Coordinate,
) -> Result<bool> {
    debug!(%owner, %coords, "checking update authorization on parcel");
    let check = async {
        let asset = parcels.encode_token_id(coords).await?;
        parcels
            .is_update_authorized(&owner.to_lowercase(), &asset)
            .await
    };
    check
        .await
        .map_err(|e| ResolverError::ledger("Unable to fetch LAND authorization", e))
}
