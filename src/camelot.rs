use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pitch class names (0 = C ... 11 = B).
pub const KEY_NAMES: [&str; 12] = [
    "C", "C♯/D♭", "D", "D♯/E♭", "E", "F", "F♯/G♭", "G", "G♯/A♭", "A", "A♯/B♭", "B",
];

/// Wheel ring: A = minor (inner), B = major (outer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ring {
    A,
    B,
}

impl Ring {
    fn as_char(self) -> char {
        match self {
            Ring::A => 'A',
            Ring::B => 'B',
        }
    }
}

/// A position on the Camelot wheel: hour 1-12 plus ring letter, e.g. "8A".
///
/// Serializes as its string form so track dumps read the way DJs write keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CamelotPosition {
    pub number: u8,
    pub ring: Ring,
}

impl CamelotPosition {
    /// Map a pitch class (0-11) and mode (1 = major, 0 = minor) to its wheel
    /// position. Out-of-range key or mode yields None ("Unknown").
    pub fn from_key_mode(key: i64, mode: i64) -> Option<Self> {
        let number = match (key, mode) {
            (0, 1) => 8,   // C Major
            (0, 0) => 5,   // C Minor
            (1, 1) => 3,   // C#/Db Major
            (1, 0) => 12,  // C#/Db Minor
            (2, 1) => 10,  // D Major
            (2, 0) => 7,   // D Minor
            (3, 1) => 5,   // D#/Eb Major
            (3, 0) => 2,   // D#/Eb Minor
            (4, 1) => 12,  // E Major
            (4, 0) => 9,   // E Minor
            (5, 1) => 7,   // F Major
            (5, 0) => 4,   // F Minor
            (6, 1) => 2,   // F#/Gb Major
            (6, 0) => 11,  // F#/Gb Minor
            (7, 1) => 9,   // G Major
            (7, 0) => 6,   // G Minor
            (8, 1) => 4,   // G#/Ab Major
            (8, 0) => 1,   // G#/Ab Minor
            (9, 1) => 11,  // A Major
            (9, 0) => 8,   // A Minor
            (10, 1) => 6,  // A#/Bb Major
            (10, 0) => 3,  // A#/Bb Minor
            (11, 1) => 1,  // B Major
            (11, 0) => 10, // B Minor
            _ => return None,
        };
        let ring = if mode == 1 { Ring::B } else { Ring::A };
        Some(Self { number, ring })
    }

    /// True if the two positions sit on neighboring hours (wheel wraps, so
    /// 12 and 1 are adjacent).
    pub fn adjacent_number(self, other: Self) -> bool {
        self.number == (other.number % 12) + 1 || (self.number % 12) + 1 == other.number
    }

    /// Same hour, opposite ring: relative major/minor pair (e.g. 8A and 8B).
    pub fn is_relative(self, other: Self) -> bool {
        self.number == other.number && self.ring != other.ring
    }
}

impl fmt::Display for CamelotPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.ring.as_char())
    }
}

impl FromStr for CamelotPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 || !s.is_ascii() {
            return Err(format!("invalid Camelot position: {s:?}"));
        }
        let (num_part, ring_part) = s.split_at(s.len() - 1);
        let number: u8 = num_part
            .parse()
            .map_err(|_| format!("invalid Camelot number: {s:?}"))?;
        if !(1..=12).contains(&number) {
            return Err(format!("Camelot number out of range: {s:?}"));
        }
        let ring = match ring_part {
            "A" | "a" => Ring::A,
            "B" | "b" => Ring::B,
            _ => return Err(format!("invalid Camelot ring: {s:?}")),
        };
        Ok(Self { number, ring })
    }
}

impl TryFrom<String> for CamelotPosition {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CamelotPosition> for String {
    fn from(c: CamelotPosition) -> Self {
        c.to_string()
    }
}

/// Human-readable key name, e.g. "A Minor" or "C♯/D♭ Major".
/// Out-of-range key or mode yields None.
pub fn key_name(key: i64, mode: i64) -> Option<String> {
    if !(0..=11).contains(&key) {
        return None;
    }
    let mode_name = match mode {
        1 => "Major",
        0 => "Minor",
        _ => return None,
    };
    Some(format!("{} {}", KEY_NAMES[key as usize], mode_name))
}
