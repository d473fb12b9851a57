//! Transaction request shapes and the submission path

mod request;
mod submit;

pub use request::{FeeDescriptor, TransferRequest, TxKind};
pub use submit::{Broadcaster, WalletClient};
