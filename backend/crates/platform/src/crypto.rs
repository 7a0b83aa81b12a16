//! Cryptographic Utilities

use rand::Rng;

/// Generate a string of `len` random decimal digits
///
/// Each call draws from a freshly seeded thread-local generator.
pub fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
