// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DEVICE POOL DOMAIN MODELS
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE CONTRATOS DE DISPOSITIVO Y SHARDING
 * =================================================================
 */

mod device;
mod shard;

pub use device::{DeviceRecord, ProvisionedDevice};
pub use shard::shard_of;
