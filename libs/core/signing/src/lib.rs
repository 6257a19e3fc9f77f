// [libs/core/signing/src/lib.rs]
//! Request canonicalization, ephemeral keypair generation, and the
//! signing-header adapter used by the registration handshake.

mod adapter;
mod canonical;
mod keypair;

pub use adapter::{sign_request, SignedHeaders};
pub use canonical::{canonical_body_json, canonical_query_string, percent_encode_value};
pub use keypair::Keypair;
