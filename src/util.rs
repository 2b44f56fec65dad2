use rand::rngs::OsRng;
use rand::RngCore;

/// Random lowercase hex string built from `len_bytes` bytes of OS entropy.
/// The result is `2 * len_bytes` characters long.
///
/// Panics if the OS random source fails; there is nothing sensible to
/// fall back to.
pub fn generate_hex(len_bytes: usize) -> String {
    let mut bytes = vec![0u8; len_bytes];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
