/// Process-level helpers shared by `main` and tests.
///
/// IMPORTANT:
/// - No leaderboard logic should live here.

use rustls::crypto::{CryptoProvider, ring};

/// Installs the `ring` provider as the process-wide rustls default.
///
/// rustls >= 0.23 requires an explicit CryptoProvider before any TLS
/// client (including reqwest's) is built. Only the first call
/// installs; later calls return false and change nothing.
pub fn install_crypto_provider() -> bool {
    CryptoProvider::install_default(ring::default_provider()).is_ok()
}
