//! Pre-shared swarm key generation.

use rand::RngCore;

const PSK_VERSION: &str = "/key/swarm/psk/1.0.0/";
const PSK_ENCODING: &str = "/base16/";

/// Generate a fresh 256-bit pre-shared swarm key in the standard textual
/// format: version line, encoding line, then the key as hex.
pub fn generate_swarm_key() -> String {
    let mut key = [0u8; 32];
    rand::rng().fill_bytes(&mut key);
    format!("{PSK_VERSION}\n{PSK_ENCODING}\n{}", hex::encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swarm_key_format() {
        let key = generate_swarm_key();
        let lines: Vec<&str> = key.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines.first(), Some(&PSK_VERSION));
        assert_eq!(lines.get(1), Some(&PSK_ENCODING));

        let hex_part = lines.get(2).unwrap();
        assert_eq!(hex_part.len(), 64);
        assert_eq!(hex::decode(hex_part).unwrap().len(), 32);
    }

    #[test]
    fn test_swarm_keys_are_unique() {
        assert_ne!(generate_swarm_key(), generate_swarm_key());
    }
}
