//! Room codes: four characters from `[A-Z0-9]`.

use std::fmt::{self, Write};

use rand::Rng;

use crate::RoomError;

/// The 36 symbols a room code is drawn from.
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A short code identifying a live room.
///
/// Codes are minted only by the [`RoomRegistry`](crate::RoomRegistry);
/// anything a client submits goes through [`RoomCode::parse`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode([u8; RoomCode::LEN]);

impl RoomCode {
    /// Number of characters in a code.
    pub const LEN: usize = 4;

    /// Parses a client-supplied code. Matching is exact: lowercase letters
    /// and surrounding whitespace are rejected.
    pub fn parse(s: &str) -> Result<Self, RoomError> {
        let bytes: [u8; Self::LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| RoomError::InvalidCode(s.to_owned()))?;
        if !bytes.iter().all(|b| ALPHABET.contains(b)) {
            return Err(RoomError::InvalidCode(s.to_owned()));
        }
        Ok(Self(bytes))
    }

    /// Draws four independent, uniformly distributed symbols.
    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; Self::LEN];
        for b in &mut bytes {
            *b = ALPHABET[rng.random_range(0..ALPHABET.len())];
        }
        Self(bytes)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            f.write_char(char::from(b))?;
        }
        Ok(())
    }
}

impl serde::Serialize for RoomCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl std::str::FromStr for RoomCode {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_uppercase_and_digits() {
        let code = RoomCode::parse("AB12").unwrap();
        assert_eq!(code.to_string(), "AB12");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(RoomCode::parse("ABC").is_err());
        assert!(RoomCode::parse("ABCDE").is_err());
        assert!(RoomCode::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_symbols_outside_alphabet() {
        assert!(RoomCode::parse("ab12").is_err());
        assert!(RoomCode::parse("AB-1").is_err());
        assert!(RoomCode::parse(" AB1").is_err());
        // Four bytes, but not four ASCII symbols.
        assert!(RoomCode::parse("ÄB1").is_err());
    }

    #[test]
    fn test_random_codes_stay_in_alphabet() {
        let mut rng = rand::rng();
        for _ in 0..1_000 {
            let code = RoomCode::random(&mut rng).to_string();
            assert_eq!(code.len(), RoomCode::LEN);
            assert!(code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_random_codes_cover_letters_and_digits() {
        let mut rng = rand::rng();
        let text: String = (0..500).map(|_| RoomCode::random(&mut rng).to_string()).collect();
        assert!(text.bytes().any(|b| b.is_ascii_digit()));
        assert!(text.bytes().any(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let code = RoomCode::parse("QW7E").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"QW7E\"");
    }

    #[test]
    fn test_from_str_matches_parse() {
        let code: RoomCode = "Z9Z9".parse().unwrap();
        assert_eq!(code, RoomCode::parse("Z9Z9").unwrap());
    }
}
