use rand::{thread_rng, Rng};

/// URL-safe alphabet, 64 symbols (6 bits each).
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub const KEY_LENGTH: usize = 10;

/// Generate a random paste id.
pub fn generate_key() -> String {
    let mut rng = thread_rng();
    (0..KEY_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
