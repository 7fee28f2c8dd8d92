//! In-memory registries.
//!
//! Both stubs keep a journal of every call they receive and can be told to
//! reject a given method, which is what the resolver tests lean on.

use crate::errors::*;
use crate::traits::{EstateRegistry, LandHoldings, ParcelRegistry};
use async_trait::async_trait;
use land_types::{format_hex_component, Address, AssetId, Coordinate, EstateId};
use num_bigint::BigUint;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One recorded registry call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<StubCall>,
    failures: HashMap<&'static str, String>,
}

impl Journal {
    fn record(&mut self, method: &'static str, args: Vec<String>) -> Result<()> {
        self.calls.push(StubCall { method, args });
        match self.failures.get(method) {
            Some(message) => Err(RegistryError::Stub(message.clone())),
            None => Ok(()),
        }
    }

    fn count(&self, method: &str) -> usize {
        self.calls.iter().filter(|call| call.method == method).count()
    }
}

const HALF_BITS: u32 = 128;

/// LAND token id layout used by the stub: `x` in the high 128 bits and `y`
/// in the low 128 bits, both two's complement.
pub fn encode_asset_id(coords: Coordinate) -> AssetId {
    let half = |v: i64| BigUint::from(v as i128 as u128);
    AssetId::new((half(coords.x) << HALF_BITS) | half(coords.y))
}

/// Inverse of [`encode_asset_id`]; `None` for ids outside the grid.
pub fn decode_asset_id(asset: &AssetId) -> Option<Coordinate> {
    let word = asset.to_word().ok()?;
    let half = |bytes: &[u8]| -> Option<i64> {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        i64::try_from(u128::from_be_bytes(raw) as i128).ok()
    };
    Some(Coordinate::new(half(&word[..16])?, half(&word[16..])?))
}

#[derive(Debug, Clone)]
struct ParcelRecord {
    owner: Address,
    data: Option<String>,
    approved: Option<Address>,
    update_operator: Option<Address>,
}

#[derive(Debug, Default)]
struct ParcelState {
    parcels: BTreeMap<Coordinate, ParcelRecord>,
    journal: Journal,
}

/// In-memory LAND registry.
///
/// `is_update_authorized` compares address strings exactly, like the real
/// registry's case-sensitive check.
#[derive(Debug, Clone, Default)]
pub struct StubParcelRegistry {
    state: Arc<RwLock<ParcelState>>,
}

impl StubParcelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_parcel(&self, coords: Coordinate, owner: Address) {
        self.state.write().parcels.insert(
            coords,
            ParcelRecord {
                owner,
                data: None,
                approved: None,
                update_operator: None,
            },
        );
    }

    pub fn set_land_data(&self, coords: Coordinate, data: impl Into<String>) {
        if let Some(parcel) = self.state.write().parcels.get_mut(&coords) {
            parcel.data = Some(data.into());
        }
    }

    pub fn set_approved(&self, coords: Coordinate, operator: Address) {
        if let Some(parcel) = self.state.write().parcels.get_mut(&coords) {
            parcel.approved = Some(operator);
        }
    }

    pub fn set_update_operator(&self, coords: Coordinate, operator: Address) {
        if let Some(parcel) = self.state.write().parcels.get_mut(&coords) {
            parcel.update_operator = Some(operator);
        }
    }

    /// Make every later call to `method` fail with `message`.
    pub fn fail_on(&self, method: &'static str, message: impl Into<String>) {
        self.state
            .write()
            .journal
            .failures
            .insert(method, message.into());
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.state.read().journal.calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state.read().journal.count(method)
    }

    fn record(&self, method: &'static str, args: Vec<String>) -> Result<()> {
        self.state.write().journal.record(method, args)
    }

    fn parcel_for(&self, asset: &AssetId) -> Option<ParcelRecord> {
        let coords = decode_asset_id(asset)?;
        self.state.read().parcels.get(&coords).cloned()
    }
}

#[async_trait]
impl ParcelRegistry for StubParcelRegistry {
    async fn land_of(&self, owner: &Address) -> Result<LandHoldings> {
        self.record("landOf", vec![owner.to_string()])?;
        let state = self.state.read();
        let (xs, ys) = state
            .parcels
            .iter()
            .filter(|(_, parcel)| parcel.owner.same_account(owner))
            .map(|(coords, _)| (format_hex_component(coords.x), format_hex_component(coords.y)))
            .unzip();
        Ok(LandHoldings { xs, ys })
    }

    async fn encode_token_id(&self, coords: Coordinate) -> Result<AssetId> {
        self.record("encodeTokenId", vec![coords.to_string()])?;
        Ok(encode_asset_id(coords))
    }

    async fn decode_token_id(&self, asset: &AssetId) -> Result<Coordinate> {
        self.record("decodeTokenId", vec![asset.to_string()])?;
        decode_asset_id(asset)
            .ok_or_else(|| RegistryError::Stub(format!("token id {asset} is off the grid")))
    }

    async fn owner_of_land(&self, coords: Coordinate) -> Result<Address> {
        self.record("ownerOfLand", vec![coords.to_string()])?;
        Ok(self
            .state
            .read()
            .parcels
            .get(&coords)
            .map(|parcel| parcel.owner.clone())
            .unwrap_or_else(Address::zero))
    }

    async fn land_data(&self, coords: Coordinate) -> Result<Option<String>> {
        self.record("landData", vec![coords.to_string()])?;
        Ok(self
            .state
            .read()
            .parcels
            .get(&coords)
            .and_then(|parcel| parcel.data.clone()))
    }

    async fn is_update_authorized(&self, operator: &Address, asset: &AssetId) -> Result<bool> {
        self.record(
            "isUpdateAuthorized",
            vec![operator.to_string(), asset.to_string()],
        )?;
        let Some(parcel) = self.parcel_for(asset) else {
            return Ok(false);
        };
        let is_operator = |candidate: &Option<Address>| {
            candidate
                .as_ref()
                .is_some_and(|address| address.as_str() == operator.as_str())
        };
        Ok(parcel.owner.as_str() == operator.as_str()
            || is_operator(&parcel.approved)
            || is_operator(&parcel.update_operator))
    }

    async fn update_operator(&self, asset: &AssetId) -> Result<Address> {
        self.record("updateOperator", vec![asset.to_string()])?;
        Ok(self
            .parcel_for(asset)
            .and_then(|parcel| parcel.update_operator)
            .unwrap_or_else(Address::zero))
    }

    async fn get_approved(&self, asset: &AssetId) -> Result<Address> {
        self.record("getApproved", vec![asset.to_string()])?;
        Ok(self
            .parcel_for(asset)
            .and_then(|parcel| parcel.approved)
            .unwrap_or_else(Address::zero))
    }
}

#[derive(Debug, Clone)]
struct EstateRecord {
    owner: Address,
    metadata: Option<String>,
    lands: Vec<AssetId>,
    approved: Option<Address>,
    update_operator: Option<Address>,
}

#[derive(Debug, Default)]
struct EstateState {
    estates: BTreeMap<EstateId, EstateRecord>,
    journal: Journal,
}

impl EstateState {
    fn owned_by<'a>(&'a self, owner: &'a Address) -> impl Iterator<Item = EstateId> + 'a {
        self.estates
            .iter()
            .filter(move |(_, estate)| estate.owner.same_account(owner))
            .map(|(id, _)| *id)
    }
}

/// In-memory Estate registry. Address comparison ignores case.
#[derive(Debug, Clone, Default)]
pub struct StubEstateRegistry {
    state: Arc<RwLock<EstateState>>,
}

impl StubEstateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_estate(&self, id: EstateId, owner: Address, lands: Vec<AssetId>) {
        self.state.write().estates.insert(
            id,
            EstateRecord {
                owner,
                metadata: None,
                lands,
                approved: None,
                update_operator: None,
            },
        );
    }

    pub fn set_metadata(&self, id: EstateId, metadata: impl Into<String>) {
        if let Some(estate) = self.state.write().estates.get_mut(&id) {
            estate.metadata = Some(metadata.into());
        }
    }

    pub fn set_approved(&self, id: EstateId, operator: Address) {
        if let Some(estate) = self.state.write().estates.get_mut(&id) {
            estate.approved = Some(operator);
        }
    }

    pub fn set_update_operator(&self, id: EstateId, operator: Address) {
        if let Some(estate) = self.state.write().estates.get_mut(&id) {
            estate.update_operator = Some(operator);
        }
    }

    /// Make every later call to `method` fail with `message`.
    pub fn fail_on(&self, method: &'static str, message: impl Into<String>) {
        self.state
            .write()
            .journal
            .failures
            .insert(method, message.into());
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.state.read().journal.calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state.read().journal.count(method)
    }

    fn record(&self, method: &'static str, args: Vec<String>) -> Result<()> {
        self.state.write().journal.record(method, args)
    }

    fn estate(&self, id: EstateId) -> Option<EstateRecord> {
        self.state.read().estates.get(&id).cloned()
    }
}

#[async_trait]
impl EstateRegistry for StubEstateRegistry {
    async fn balance_of(&self, owner: &Address) -> Result<u64> {
        self.record("balanceOf", vec![owner.to_string()])?;
        Ok(self.state.read().owned_by(owner).count() as u64)
    }

    async fn token_of_owner_by_index(&self, owner: &Address, index: u64) -> Result<EstateId> {
        self.record(
            "tokenOfOwnerByIndex",
            vec![owner.to_string(), index.to_string()],
        )?;
        let state = self.state.read();
        let found = usize::try_from(index)
            .ok()
            .and_then(|i| state.owned_by(owner).nth(i));
        found.ok_or_else(|| RegistryError::Stub(format!("owner index {index} out of bounds")))
    }

    async fn owner_of(&self, estate: EstateId) -> Result<Address> {
        self.record("ownerOf", vec![estate.to_string()])?;
        self.estate(estate)
            .map(|record| record.owner)
            .ok_or_else(|| RegistryError::Stub(format!("estate {estate} does not exist")))
    }

    async fn get_metadata(&self, estate: EstateId) -> Result<Option<String>> {
        self.record("getMetadata", vec![estate.to_string()])?;
        Ok(self.estate(estate).and_then(|record| record.metadata))
    }

    async fn get_estate_size(&self, estate: EstateId) -> Result<u64> {
        self.record("getEstateSize", vec![estate.to_string()])?;
        Ok(self
            .estate(estate)
            .map(|record| record.lands.len() as u64)
            .unwrap_or_default())
    }

    async fn estate_land_ids(&self, estate: EstateId, index: u64) -> Result<AssetId> {
        self.record(
            "estateLandIds",
            vec![estate.to_string(), index.to_string()],
        )?;
        self.estate(estate)
            .and_then(|record| {
                usize::try_from(index)
                    .ok()
                    .and_then(|i| record.lands.get(i).cloned())
            })
            .ok_or_else(|| RegistryError::Stub(format!("estate {estate} has no land at {index}")))
    }

    async fn get_land_estate_id(&self, asset: &AssetId) -> Result<EstateId> {
        self.record("getLandEstateId", vec![asset.to_string()])?;
        Ok(self
            .state
            .read()
            .estates
            .iter()
            .find(|(_, estate)| estate.lands.contains(asset))
            .map(|(id, _)| *id)
            .unwrap_or(EstateId::NONE))
    }

    async fn is_update_authorized(&self, operator: &Address, estate: EstateId) -> Result<bool> {
        self.record(
            "isUpdateAuthorized",
            vec![operator.to_string(), estate.to_string()],
        )?;
        let Some(record) = self.estate(estate) else {
            return Ok(false);
        };
        let is_operator = |candidate: &Option<Address>| {
            candidate
                .as_ref()
                .is_some_and(|address| address.same_account(operator))
        };
        Ok(record.owner.same_account(operator)
            || is_operator(&record.approved)
            || is_operator(&record.update_operator))
    }

    async fn get_approved(&self, estate: EstateId) -> Result<Address> {
        self.record("getApproved", vec![estate.to_string()])?;
        Ok(self
            .estate(estate)
            .and_then(|record| record.approved)
            .unwrap_or_else(Address::zero))
    }

    async fn update_operator(&self, estate: EstateId) -> Result<Address> {
        self.record("updateOperator", vec![estate.to_string()])?;
        Ok(self
            .estate(estate)
            .and_then(|record| record.update_operator)
            .unwrap_or_else(Address::zero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: &str) -> Address {
        Address::parse(format!("0x{}", byte.repeat(20))).unwrap()
    }

    #[test]
    fn asset_id_layout_roundtrips_negative_coordinates() {
        for coords in [Coordinate::new(0, 0), Coordinate::new(-150, 150), Coordinate::new(3, -4)] {
            assert_eq!(decode_asset_id(&encode_asset_id(coords)), Some(coords));
        }
        assert_eq!(encode_asset_id(Coordinate::new(1, 2)).to_string(), "340282366920938463463374607431768211458");
    }

    #[tokio::test]
    async fn parcel_stub_is_case_sensitive() {
        let stub = StubParcelRegistry::new();
        let coords = Coordinate::new(1, 2);
        stub.insert_parcel(coords, address("aa"));

        let asset = stub.encode_token_id(coords).await.unwrap();
        assert!(stub.is_update_authorized(&address("aa"), &asset).await.unwrap());
        assert!(!stub.is_update_authorized(&address("AA"), &asset).await.unwrap());
    }

    #[tokio::test]
    async fn estate_stub_enumerates_owner_tokens_in_id_order() {
        let stub = StubEstateRegistry::new();
        stub.insert_estate(EstateId(9), address("bb"), vec![]);
        stub.insert_estate(EstateId(2), address("bb"), vec![]);
        stub.insert_estate(EstateId(5), address("cc"), vec![]);

        assert_eq!(stub.balance_of(&address("BB")).await.unwrap(), 2);
        assert_eq!(stub.token_of_owner_by_index(&address("bb"), 0).await.unwrap(), EstateId(2));
        assert_eq!(stub.token_of_owner_by_index(&address("bb"), 1).await.unwrap(), EstateId(9));
        assert!(stub.token_of_owner_by_index(&address("bb"), 2).await.is_err());
    }

    #[tokio::test]
    async fn injected_failure_is_recorded_and_returned() {
        let stub = StubEstateRegistry::new();
        stub.fail_on("getEstateSize", "node unreachable");

        let err = stub.get_estate_size(EstateId(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "node unreachable");
        assert_eq!(stub.call_count("getEstateSize"), 1);
    }
}
