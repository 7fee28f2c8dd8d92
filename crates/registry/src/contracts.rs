//! Registry bindings over a [`CallTransport`], normally a
//! [`JsonRpcTransport`](crate::rpc::JsonRpcTransport).

use crate::abi::{encode_call, AbiReader, Token};
use crate::errors::*;
use crate::rpc::CallTransport;
use crate::traits::{EstateRegistry, LandHoldings, ParcelRegistry};
use async_trait::async_trait;
use land_types::{format_hex_component, Address, AssetId, Coordinate, EstateId};
use std::sync::Arc;
use tracing::debug;

/// One deployed contract reachable through a shared transport.
#[derive(Debug, Clone)]
struct ContractHandle {
    transport: Arc<dyn CallTransport>,
    address: Address,
}

impl ContractHandle {
    async fn call(&self, signature: &'static str, args: &[Token]) -> Result<Vec<u8>> {
        debug!(contract = %self.address, method = signature, "registry read");
        self.transport
            .call(&self.address, &encode_call(signature, args))
            .await
    }

    /// Calls returning one `string`; empty return data means no value.
    async fn call_string(&self, signature: &'static str, args: &[Token]) -> Result<Option<String>> {
        let data = self.call(signature, args).await?;
        if data.is_empty() {
            return Ok(None);
        }
        AbiReader::new(&data).string(0).map(Some)
    }
}

/// LAND registry binding.
#[derive(Debug, Clone)]
pub struct LandRegistryContract {
    inner: ContractHandle,
}

impl LandRegistryContract {
    pub fn new(transport: Arc<dyn CallTransport>, address: Address) -> Self {
        Self {
            inner: ContractHandle { transport, address },
        }
    }

    pub fn address(&self) -> &Address {
        &self.inner.address
    }
}

#[async_trait]
impl ParcelRegistry for LandRegistryContract {
    async fn land_of(&self, owner: &Address) -> Result<LandHoldings> {
        let data = self
            .inner
            .call("landOf(address)", &[Token::Address(owner.clone())])
            .await?;
        let reader = AbiReader::new(&data);
        let hex = |values: Vec<i64>| -> Vec<String> {
            values.into_iter().map(format_hex_component).collect()
        };
        Ok(LandHoldings {
            xs: hex(reader.int_array(0)?),
            ys: hex(reader.int_array(1)?),
        })
    }

    async fn encode_token_id(&self, coords: Coordinate) -> Result<AssetId> {
        let data = self
            .inner
            .call(
                "encodeTokenId(int256,int256)",
                &[Token::Int(coords.x), Token::Int(coords.y)],
            )
            .await?;
        AbiReader::new(&data).asset(0)
    }

    async fn decode_token_id(&self, asset: &AssetId) -> Result<Coordinate> {
        let data = self
            .inner
            .call("decodeTokenId(uint256)", &[Token::asset(asset)?])
            .await?;
        let reader = AbiReader::new(&data);
        Ok(Coordinate::new(reader.int(0)?, reader.int(1)?))
    }

    async fn owner_of_land(&self, coords: Coordinate) -> Result<Address> {
        let data = self
            .inner
            .call(
                "ownerOfLand(int256,int256)",
                &[Token::Int(coords.x), Token::Int(coords.y)],
            )
            .await?;
        AbiReader::new(&data).address(0)
    }

    async fn land_data(&self, coords: Coordinate) -> Result<Option<String>> {
        self.inner
            .call_string(
                "landData(int256,int256)",
                &[Token::Int(coords.x), Token::Int(coords.y)],
            )
            .await
    }

    async fn is_update_authorized(&self, operator: &Address, asset: &AssetId) -> Result<bool> {
        let data = self
            .inner
            .call(
                "isUpdateAuthorized(address,uint256)",
                &[Token::Address(operator.clone()), Token::asset(asset)?],
            )
            .await?;
        AbiReader::new(&data).bool(0)
    }

    async fn update_operator(&self, asset: &AssetId) -> Result<Address> {
        let data = self
            .inner
            .call("updateOperator(uint256)", &[Token::asset(asset)?])
            .await?;
        AbiReader::new(&data).address(0)
    }

    async fn get_approved(&self, asset: &AssetId) -> Result<Address> {
        let data = self
            .inner
            .call("getApproved(uint256)", &[Token::asset(asset)?])
            .await?;
        AbiReader::new(&data).address(0)
    }
}

/// Estate registry binding.
#[derive(Debug, Clone)]
pub struct EstateRegistryContract {
    inner: ContractHandle,
}

impl EstateRegistryContract {
    pub fn new(transport: Arc<dyn CallTransport>, address: Address) -> Self {
        Self {
            inner: ContractHandle { transport, address },
        }
    }

    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    async fn estate_word(&self, signature: &'static str, args: &[Token]) -> Result<EstateId> {
        let data = self.inner.call(signature, args).await?;
        let value = AbiReader::new(&data).uint(0)?;
        EstateId::from_biguint(&value)
            .ok_or_else(|| RegistryError::malformed(format!("estate id {value} exceeds 64 bits")))
    }
}

#[async_trait]
impl EstateRegistry for EstateRegistryContract {
    async fn balance_of(&self, owner: &Address) -> Result<u64> {
        let data = self
            .inner
            .call("balanceOf(address)", &[Token::Address(owner.clone())])
            .await?;
        AbiReader::new(&data).u64(0)
    }

    async fn token_of_owner_by_index(&self, owner: &Address, index: u64) -> Result<EstateId> {
        self.estate_word(
            "tokenOfOwnerByIndex(address,uint256)",
            &[Token::Address(owner.clone()), Token::uint(index)],
        )
        .await
    }

    async fn owner_of(&self, estate: EstateId) -> Result<Address> {
        let data = self
            .inner
            .call("ownerOf(uint256)", &[Token::uint(estate.as_u64())])
            .await?;
        AbiReader::new(&data).address(0)
    }

    async fn get_metadata(&self, estate: EstateId) -> Result<Option<String>> {
        self.inner
            .call_string("getMetadata(uint256)", &[Token::uint(estate.as_u64())])
            .await
    }

    async fn get_estate_size(&self, estate: EstateId) -> Result<u64> {
        let data = self
            .inner
            .call("getEstateSize(uint256)", &[Token::uint(estate.as_u64())])
            .await?;
        AbiReader::new(&data).u64(0)
    }

    async fn estate_land_ids(&self, estate: EstateId, index: u64) -> Result<AssetId> {
        let data = self
            .inner
            .call(
                "estateLandIds(uint256,uint256)",
                &[Token::uint(estate.as_u64()), Token::uint(index)],
            )
            .await?;
        AbiReader::new(&data).asset(0)
    }

    async fn get_land_estate_id(&self, asset: &AssetId) -> Result<EstateId> {
        self.estate_word("getLandEstateId(uint256)", &[Token::asset(asset)?])
            .await
    }

    async fn is_update_authorized(&self, operator: &Address, estate: EstateId) -> Result<bool> {
        let data = self
            .inner
            .call(
                "isUpdateAuthorized(address,uint256)",
                &[Token::Address(operator.clone()), Token::uint(estate.as_u64())],
            )
            .await?;
        AbiReader::new(&data).bool(0)
    }

    async fn get_approved(&self, estate: EstateId) -> Result<Address> {
        let data = self
            .inner
            .call("getApproved(uint256)", &[Token::uint(estate.as_u64())])
            .await?;
        AbiReader::new(&data).address(0)
    }

    async fn update_operator(&self, estate: EstateId) -> Result<Address> {
        let data = self
            .inner
            .call("updateOperator(uint256)", &[Token::uint(estate.as_u64())])
            .await?;
        AbiReader::new(&data).address(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::selector;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Transport answering each selector with fixed return data.
    #[derive(Debug, Default)]
    struct CannedTransport {
        replies: Mutex<HashMap<[u8; 4], Vec<u8>>>,
        sent: Mutex<Vec<(Address, Vec<u8>)>>,
    }

    impl CannedTransport {
        fn reply(&self, signature: &str, data: Vec<u8>) {
            self.replies.lock().insert(selector(signature), data);
        }

        fn sent(&self) -> Vec<(Address, Vec<u8>)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl CallTransport for CannedTransport {
        async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
            self.sent.lock().push((to.clone(), data.to_vec()));
            let mut key = [0u8; 4];
            key.copy_from_slice(&data[..4]);
            self.replies.lock().get(&key).cloned().ok_or(RegistryError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
            })
        }
    }

    fn words(tokens: &[Token]) -> Vec<u8> {
        encode_call("", tokens)[4..].to_vec()
    }

    fn string_reply(text: &str) -> Vec<u8> {
        let mut data = words(&[Token::uint(32), Token::uint(text.len() as u64)]);
        let mut padded = text.as_bytes().to_vec();
        padded.resize(padded.len().div_ceil(32) * 32, 0);
        data.extend_from_slice(&padded);
        data
    }

    fn contract_address() -> Address {
        Address::parse("0xF87E31492Faf9A91B02Ee0dEAAd50d51d56D5d4d").unwrap()
    }

    fn land(transport: &Arc<CannedTransport>) -> LandRegistryContract {
        LandRegistryContract::new(transport.clone(), contract_address())
    }

    fn estates(transport: &Arc<CannedTransport>) -> EstateRegistryContract {
        EstateRegistryContract::new(transport.clone(), contract_address())
    }

    #[tokio::test]
    async fn land_of_reads_two_int_arrays_as_hex() {
        let transport = Arc::new(CannedTransport::default());
        transport.reply(
            "landOf(address)",
            words(&[
                Token::uint(64),
                Token::uint(160),
                Token::uint(2),
                Token::Int(-1),
                Token::Int(3),
                Token::uint(2),
                Token::Int(7),
                Token::Int(-9),
            ]),
        );

        let owner = Address::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let holdings = land(&transport).land_of(&owner).await.unwrap();
        assert_eq!(
            holdings,
            LandHoldings {
                xs: vec!["-0x1".into(), "0x3".into()],
                ys: vec!["0x7".into(), "-0x9".into()],
            }
        );

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, contract_address());
        assert_eq!(sent[0].1, encode_call("landOf(address)", &[Token::Address(owner)]));
    }

    #[tokio::test]
    async fn decode_token_id_reads_signed_pair() {
        let transport = Arc::new(CannedTransport::default());
        transport.reply(
            "decodeTokenId(uint256)",
            words(&[Token::Int(-150), Token::Int(150)]),
        );

        let asset = AssetId::from_word(&[0x11; 32]);
        let coords = land(&transport).decode_token_id(&asset).await.unwrap();
        assert_eq!(coords, Coordinate::new(-150, 150));
        assert_eq!(&transport.sent()[0].1[4..], &[0x11; 32][..]);
    }

    #[tokio::test]
    async fn land_data_empty_return_is_none() {
        let transport = Arc::new(CannedTransport::default());
        let contract = land(&transport);
        transport.reply("landData(int256,int256)", Vec::new());
        assert_eq!(contract.land_data(Coordinate::new(0, 0)).await.unwrap(), None);

        transport.reply(
            "landData(int256,int256)",
            string_reply("0,\"Genesis Plaza\",\"\""),
        );
        assert_eq!(
            contract.land_data(Coordinate::new(0, 0)).await.unwrap().as_deref(),
            Some("0,\"Genesis Plaza\",\"\"")
        );
    }

    #[tokio::test]
    async fn estate_id_of_land_is_read_as_u64() {
        let transport = Arc::new(CannedTransport::default());
        let contract = estates(&transport);
        let asset = AssetId::from_word(&[0x01; 32]);

        transport.reply("getLandEstateId(uint256)", words(&[Token::uint(7)]));
        assert_eq!(contract.get_land_estate_id(&asset).await.unwrap(), EstateId(7));

        transport.reply("getLandEstateId(uint256)", words(&[Token::uint(0)]));
        assert!(contract.get_land_estate_id(&asset).await.unwrap().is_none());

        transport.reply("getLandEstateId(uint256)", vec![0xff; 32]);
        let err = contract.get_land_estate_id(&asset).await.unwrap_err();
        assert!(matches!(err, RegistryError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn node_errors_pass_through() {
        let transport = Arc::new(CannedTransport::default());
        let err = estates(&transport).balance_of(&contract_address()).await.unwrap_err();
        assert_eq!(err.to_string(), "rpc error -32000: execution reverted");
    }
}
