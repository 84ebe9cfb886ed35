//! The host environment of the command-line driver.

use imv_eval::HostEnvironment;
use imv_types::{host_error, EvalResult};

/// A host backed by the operating system.
///
/// There is no world to select entities from, so entity lookups fail with
/// the default host errors; the origin is `(0, 0, 0)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn random_unit(&self) -> EvalResult<f64> {
        let mut bytes = [0u8; 8];
        getrandom::fill(&mut bytes)
            .map_err(|err| host_error(format!("system randomness unavailable: {err}")))?;
        // 53 random mantissa bits give a uniform double in [0, 1).
        let bits = u64::from_le_bytes(bytes) >> 11;
        Ok(bits as f64 / (1u64 << 53) as f64)
    }
}
