//! Chain access - RPC provider management and receipt polling

mod provider;

pub use provider::ChainProvider;
