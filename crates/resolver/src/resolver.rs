//! Registry-backed implementation of [`LandDataProvider`].

use crate::authorization::{self, AuthorizationPath};
use crate::errors::*;
use crate::provider::LandDataProvider;
use crate::settings::{RegistryAddresses, ResolverConfig};
use async_trait::async_trait;
use futures::future::try_join_all;
use land_registry::{
    CallTransport, EstateRegistry, EstateRegistryContract, JsonRpcTransport,
    LandRegistryContract, ParcelRegistry,
};
use land_types::{zip_hex_coordinates, Address, Coordinate, EstateId, MetadataRecord};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolution facade over the LAND and Estate registries.
///
/// Holds nothing but shared handles to the two registries, so it is cheap to
/// clone and safe to use from concurrent tasks.
#[derive(Clone)]
pub struct LandResolver {
    parcels: Arc<dyn ParcelRegistry>,
    estates: Arc<dyn EstateRegistry>,
}

impl LandResolver {
    pub fn new(parcels: Arc<dyn ParcelRegistry>, estates: Arc<dyn EstateRegistry>) -> Self {
        Self { parcels, estates }
    }

    /// Wire contract bindings for the configured network and provider.
    pub fn connect(config: &ResolverConfig) -> std::result::Result<Self, ConfigError> {
        let transport = JsonRpcTransport::new(&config.provider_url, config.request_timeout)
            .map_err(ConfigError::Provider)?;
        info!(
            network = %config.network,
            provider = %config.provider_url,
            "connecting LAND resolver"
        );
        Ok(Self::with_transport(Arc::new(transport), &config.addresses))
    }

    /// Contract bindings for `addresses`, all sharing one transport.
    pub fn with_transport(transport: Arc<dyn CallTransport>, addresses: &RegistryAddresses) -> Self {
        let parcels = LandRegistryContract::new(transport.clone(), addresses.land_registry.clone());
        let estates = EstateRegistryContract::new(transport, addresses.estate_registry.clone());
        Self::new(Arc::new(parcels), Arc::new(estates))
    }

    /// Decide which registry governs updates to the parcel.
    pub async fn authorization_path(&self, coords: Coordinate) -> Result<AuthorizationPath> {
        let estate = self.get_estate_id_of_land(coords).await?;
        let path = AuthorizationPath::for_estate(estate);
        debug!(%coords, ?path, "resolved authorization path");
        Ok(path)
    }
}

impl fmt::Debug for LandResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandResolver").finish_non_exhaustive()
    }
}

/// Map any upstream failure into the ledger-access error for `context`.
fn ledger<E: fmt::Display>(context: &'static str) -> impl FnOnce(E) -> ResolverError {
    move |err| {
        warn!(error = %err, "{context}");
        ResolverError::ledger(context, err)
    }
}

#[async_trait]
impl LandDataProvider for LandResolver {
    async fn get_land_of(&self, owner: &Address) -> Result<Vec<Coordinate>> {
        let holdings = self
            .parcels
            .land_of(owner)
            .await
            .map_err(ledger("Unable to fetch LANDs"))?;
        zip_hex_coordinates(&holdings.xs, &holdings.ys).map_err(ledger("Unable to fetch LANDs"))
    }

    async fn get_estates_of(&self, owner: &Address) -> Result<Vec<EstateId>> {
        let fetch = async {
            let balance = self.estates.balance_of(owner).await?;
            debug!(%owner, balance, "fetching estates of owner");
            try_join_all((0..balance).map(|index| self.estates.token_of_owner_by_index(owner, index)))
                .await
        };
        fetch
            .await
            .map_err(ledger("Unable to fetch Estate IDs of owner"))
    }

    async fn get_land_data(&self, coords: Coordinate) -> Result<Option<MetadataRecord>> {
        let raw = self
            .parcels
            .land_data(coords)
            .await
            .map_err(ledger("Unable to fetch LAND data"))?;
        Ok(raw.as_deref().and_then(land_metadata::decode))
    }

    async fn get_estate_data(&self, estate: EstateId) -> Result<Option<MetadataRecord>> {
        let raw = self
            .estates
            .get_metadata(estate)
            .await
            .map_err(ledger("Unable to fetch Estate data"))?;
        Ok(raw.as_deref().and_then(land_metadata::decode))
    }

    async fn get_land_owner(&self, coords: Coordinate) -> Result<Address> {
        self.parcels
            .owner_of_land(coords)
            .await
            .map_err(ledger("Unable to fetch LAND owner"))
    }

    async fn get_estate_owner(&self, estate: EstateId) -> Result<Address> {
        self.estates
            .owner_of(estate)
            .await
            .map_err(ledger("Unable to fetch Estate owner"))
    }

    async fn get_land_operator(&self, coords: Coordinate) -> Result<Address> {
        let fetch = async {
            let asset = self.parcels.encode_token_id(coords).await?;
            self.parcels.get_approved(&asset).await
        };
        fetch.await.map_err(ledger("Unable to fetch LAND operator"))
    }

    async fn get_estate_operator(&self, estate: EstateId) -> Result<Address> {
        self.estates
            .get_approved(estate)
            .await
            .map_err(ledger("Unable to fetch Estate operator"))
    }

    async fn get_land_update_operator(&self, coords: Coordinate) -> Result<Address> {
        let fetch = async {
            let asset = self.parcels.encode_token_id(coords).await?;
            self.parcels.update_operator(&asset).await
        };
        fetch
            .await
            .map_err(ledger("Unable to fetch LAND update operator"))
    }

    async fn get_estate_update_operator(&self, estate: EstateId) -> Result<Address> {
        self.estates
            .update_operator(estate)
            .await
            .map_err(ledger("Unable to fetch Estate update operator"))
    }

    async fn get_land_of_estate(&self, estate: EstateId) -> Result<Vec<Coordinate>> {
        let fetch = async {
            let size = self.estates.get_estate_size(estate).await?;
            debug!(%estate, size, "fetching LANDs of estate");
            try_join_all((0..size).map(|index| async move {
                let asset = self.estates.estate_land_ids(estate, index).await?;
                self.parcels.decode_token_id(&asset).await
            }))
            .await
        };
        fetch.await.map_err(ledger("Unable to fetch LANDs of Estate"))
    }

    async fn get_estate_id_of_land(&self, coords: Coordinate) -> Result<EstateId> {
        let fetch = async {
            let asset = self.parcels.encode_token_id(coords).await?;
            self.estates.get_land_estate_id(&asset).await
        };
        fetch
            .await
            .map_err(ledger("Unable to fetch Estate ID of LAND"))
    }

    async fn is_update_authorized(&self, owner: &Address, coords: Coordinate) -> Result<bool> {
        match self.authorization_path(coords).await? {
            AuthorizationPath::ViaEstate(estate) => {
                authorization::estate_update_authorized(self.estates.as_ref(), owner, estate).await
            }
            AuthorizationPath::Direct => {
                authorization::parcel_update_authorized(self.parcels.as_ref(), owner, coords).await
            }
        }
    }

    async fn validate_authorization_of_parcel(
        &self,
        owner: &Address,
        coords: Coordinate,
    ) -> Result<()> {
        if self.is_update_authorized(owner, coords).await? {
            Ok(())
        } else {
            warn!(%owner, %coords, "update not authorized");
            Err(ResolverError::unauthorized(owner, coords))
        }
    }

    async fn validate_authorization(&self, owner: &Address, parcels: &[Coordinate]) -> Result<()> {
        try_join_all(
            parcels
                .iter()
                .map(|coords| self.validate_authorization_of_parcel(owner, *coords)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Network;
    use land_registry::RegistryError;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        targets: Mutex<Vec<Address>>,
    }

    #[async_trait]
    impl CallTransport for RecordingTransport {
        async fn call(&self, to: &Address, _data: &[u8]) -> land_registry::Result<Vec<u8>> {
            self.targets.lock().push(to.clone());
            Err(RegistryError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
            })
        }
    }

    #[test]
    fn connect_accepts_network_defaults() {
        let config = ResolverConfig::for_network(Network::Ropsten).unwrap();
        assert!(LandResolver::connect(&config).is_ok());
    }

    #[test]
    fn connect_rejects_bad_provider_url() {
        let mut config = ResolverConfig::for_network(Network::Mainnet).unwrap();
        config.provider_url = "not a url".into();
        let err = LandResolver::connect(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Provider(_)));
    }

    #[tokio::test]
    async fn contract_calls_go_to_configured_registries() {
        let config = ResolverConfig::for_network(Network::Mainnet).unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let resolver = LandResolver::with_transport(transport.clone(), &config.addresses);

        let err = resolver.get_land_owner(Coordinate::new(1, 1)).await.unwrap_err();
        assert_eq!(
            err.message(),
            "Unable to fetch LAND owner: rpc error -32000: execution reverted"
        );
        resolver.get_estate_owner(EstateId(1)).await.unwrap_err();

        let targets = transport.targets.lock().clone();
        assert_eq!(
            targets,
            vec![
                config.addresses.land_registry.clone(),
                config.addresses.estate_registry.clone()
            ]
        );
    }
}
