//! Bindings to the LAND and Estate registries.
//!
//! The resolver only talks to the registries through the [`ParcelRegistry`]
//! and [`EstateRegistry`] traits. Two implementations ship here: contract
//! bindings that issue `eth_call` requests over JSON-RPC, and in-memory stubs
//! for tests and offline use.

pub mod abi;
pub mod contracts;
pub mod errors;
pub mod rpc;
pub mod stub;
pub mod traits;

pub use contracts::{EstateRegistryContract, LandRegistryContract};
pub use errors::*;
pub use rpc::{CallTransport, JsonRpcTransport};
pub use stub::{StubCall, StubEstateRegistry, StubParcelRegistry};
pub use traits::*;
