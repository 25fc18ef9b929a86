//! Random `nonceStr` generation for JS-SDK signatures.
//!
//! The nonce is an alphanumeric string ([A-Za-z0-9]) drawn from the thread-local
//! CSPRNG provided by `rand`.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the `nonceStr` embedded in every `wx.config` payload.
pub const NONCE_STR_LENGTH: usize = 16;

/// WeChat rejects nonceStr values longer than 32 characters.
pub const MAX_NONCE_STR_LENGTH: usize = 32;

/// Generate an alphanumeric nonce of the given length (allowed 1..=32).
///
/// Out-of-range lengths fall back to [`NONCE_STR_LENGTH`].
pub fn generate_nonce(len: usize) -> String {
    let len = if len == 0 || len > MAX_NONCE_STR_LENGTH {
        NONCE_STR_LENGTH
    } else {
        len
    };
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Nonce of the default length.
pub fn nonce_str() -> String {
    generate_nonce(NONCE_STR_LENGTH)
}
