//! VNPay gateway protocol module.
//!
//! Implements the gateway's signature scheme: canonical parameter
//! serialization, HMAC-SHA512 request signing, and callback verification.
//!
//! # Module Structure
//!
//! - `params` - ParamSet, the canonical parameter mapping
//! - `signer` - VnpaySigner for signing and verification
//! - `callback` - typed callback accessors and the IPN reply contract

mod callback;
mod params;
mod signer;

pub use callback::{GatewayCallback, NotifyReply, NotifyStatus, RESPONSE_CODE_SUCCESS};
pub use params::ParamSet;
pub use signer::{
    VnpaySigner, PARAM_PREFIX, SECURE_HASH_PARAM, SECURE_HASH_TYPE, SECURE_HASH_TYPE_PARAM,
};
