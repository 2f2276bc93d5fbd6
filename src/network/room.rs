// Room code generation and validation
// Codes are shared out-of-band (voice, chat), so the alphabet drops the
// characters people misread: 0, 1, I, O.

use std::fmt;

use rand::Rng;

/// Game-type tag prepended to every room code
pub const ROOM_PREFIX: &str = "C4-";

/// Number of random characters after the prefix
pub const ROOM_CODE_LEN: usize = 6;

/// Characters a room code may contain (no 0, 1, I, O)
pub const ROOM_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// A shareable room identifier, e.g. `C4-7K9QWM`.
///
/// Uniqueness is the broker's problem: a collision is rejected at
/// registration time, never resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Generate a fresh room code
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_ALPHABET[rng.gen_range(0..ROOM_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}{}", ROOM_PREFIX, suffix))
    }

    /// Parse user input into a room code.
    ///
    /// Input is trimmed and uppercased, and the `C4-` prefix may be omitted.
    /// Returns `None` if the result is not exactly a prefix plus
    /// `ROOM_CODE_LEN` alphabet characters.
    pub fn parse(input: &str) -> Option<Self> {
        let cleaned = input.trim().to_ascii_uppercase();
        let suffix = cleaned.strip_prefix(ROOM_PREFIX).unwrap_or(&cleaned);

        if suffix.len() != ROOM_CODE_LEN {
            return None;
        }
        if !suffix.bytes().all(|b| ROOM_ALPHABET.contains(&b)) {
            return None;
        }

        Some(Self(format!("{}{}", ROOM_PREFIX, suffix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let id = RoomId::generate();
        let s = id.as_str();
        assert!(s.starts_with(ROOM_PREFIX));
        assert_eq!(s.len(), ROOM_PREFIX.len() + ROOM_CODE_LEN);
    }

    #[test]
    fn test_generated_code_avoids_ambiguous_chars() {
        for _ in 0..200 {
            let id = RoomId::generate();
            let suffix = &id.as_str()[ROOM_PREFIX.len()..];
            for c in suffix.chars() {
                assert!(!"01IO".contains(c), "ambiguous char {} in {}", c, id);
            }
        }
    }

    #[test]
    fn test_parse_accepts_prefixed_and_bare_input() {
        let full = RoomId::parse("C4-7K9QWM").unwrap();
        let bare = RoomId::parse("7k9qwm").unwrap();
        assert_eq!(full, bare);
        assert_eq!(full.as_str(), "C4-7K9QWM");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = RoomId::parse("  c4-abcdef \n").unwrap();
        assert_eq!(id.as_str(), "C4-ABCDEF");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(RoomId::parse("").is_none());
        assert!(RoomId::parse("C4-").is_none());
        assert!(RoomId::parse("C4-ABCDE").is_none()); // too short
        assert!(RoomId::parse("C4-ABCDEFG").is_none()); // too long
        assert!(RoomId::parse("C4-ABCDE0").is_none()); // excluded char
        assert!(RoomId::parse("C4-ABCDEI").is_none());
        assert!(RoomId::parse("C4-AB CDE").is_none());
    }

    #[test]
    fn test_generate_round_trips_through_parse() {
        let id = RoomId::generate();
        assert_eq!(RoomId::parse(id.as_str()).unwrap(), id);
    }
}
