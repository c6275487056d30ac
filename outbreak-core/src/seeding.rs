use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::catalog::RegionId;

/// Derive a per-region seed from the session seed via domain-separated
/// HMAC-SHA256, so draws are stable per region id regardless of catalog order.
#[must_use]
pub fn derive_region_seed(session_seed: u64, region: &RegionId) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&session_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(b"outbreak.province.");
    mac.update(region.as_str().as_bytes());
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Seeded RNG stream for a single region.
#[must_use]
pub fn region_rng(session_seed: u64, region: &RegionId) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(derive_region_seed(session_seed, region))
}
