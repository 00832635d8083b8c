//! Random nickname generation.
//!
//! Generated nicknames stay within the 9-character limit that RFC 1459
//! servers enforce, so they are safe defaults on any network.

use rand::RngExt;

/// Longest nickname every server accepts.
pub const SAFE_NICK_LEN: usize = 9;

const ADJECTIVES: &[&str] = &[
    "Red", "Shy", "Odd", "Big", "Sly", "Hot", "Icy", "Raw", "Dry", "Wet", "Old", "New", "Fat",
    "Zen", "Mad", "Fun",
];

const NOUNS: &[&str] = &[
    "Crab", "Reef", "Kelp", "Claw", "Tide", "Wave", "Sand", "Clam", "Eel", "Ray", "Cod", "Koi",
    "Gull", "Surf", "Pier", "Buoy",
];

/// Generate a nickname like `ShyCrab42`.
pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let adj = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let num: u8 = rng.random_range(0..100);
    format!("{}{}{:02}", adj, noun, num)
}

/// Derive a replacement for a nickname the server refused: the first
/// characters of `nick` followed by two random digits, capped at
/// [`SAFE_NICK_LEN`].
pub fn fallback_nickname(nick: &str) -> String {
    let stem: String = nick.chars().take(SAFE_NICK_LEN - 2).collect();
    let stem = if stem.is_empty() { "crab".to_string() } else { stem };
    let num: u8 = rand::rng().random_range(0..100);
    format!("{}{:02}", stem, num)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_nick_fits_limit() {
        for _ in 0..200 {
            let nick = generate_nickname();
            assert!(nick.len() <= SAFE_NICK_LEN, "{nick}");
            assert!(nick.chars().next().unwrap().is_ascii_alphabetic());
            assert!(!nick.contains(' '));
        }
    }

    #[test]
    fn test_fallback_keeps_stem() {
        let nick = fallback_nickname("crabline_bot");
        assert!(nick.starts_with("crablin"), "{nick}");
        assert_eq!(nick.len(), SAFE_NICK_LEN);
        assert!(nick[7..].chars().all(|c| c.is_ascii_digit()));

        let short = fallback_nickname("ab");
        assert!(short.starts_with("ab"));
        assert_eq!(short.len(), 4);

        assert!(fallback_nickname("").starts_with("crab"));
    }
}
