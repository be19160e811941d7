//! CONFIGURE-mode key decoding
//!
//! During calibration the operator nudges each wheel by hand until it shows
//! zero. Keys come in pairs per wheel, odd keys step forward:
//!
//! | Key | Action |
//! |-----|--------|
//! | `1` / `2` | units forward / reverse |
//! | `3` / `4` | tens forward / reverse |
//! | `5` / `6` | hundreds forward / reverse |
//! | `s` | commit calibration |

/// One of the three digit wheels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Hundreds,
    Tens,
    Units,
}

/// A decoded CONFIGURE-mode key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogKey {
    /// Step one motor a single half-step
    Step { axis: Axis, reverse: bool },
    /// Finish calibration
    Commit,
    /// Any other byte
    Other,
}

impl JogKey {
    /// Decode a raw byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'1' => Self::step(Axis::Units, false),
            b'2' => Self::step(Axis::Units, true),
            b'3' => Self::step(Axis::Tens, false),
            b'4' => Self::step(Axis::Tens, true),
            b'5' => Self::step(Axis::Hundreds, false),
            b'6' => Self::step(Axis::Hundreds, true),
            b's' => JogKey::Commit,
            _ => JogKey::Other,
        }
    }

    const fn step(axis: Axis, reverse: bool) -> Self {
        JogKey::Step { axis, reverse }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_keys() {
        assert_eq!(
            JogKey::from_byte(b'1'),
            JogKey::Step {
                axis: Axis::Units,
                reverse: false
            }
        );
        assert_eq!(
            JogKey::from_byte(b'4'),
            JogKey::Step {
                axis: Axis::Tens,
                reverse: true
            }
        );
        assert_eq!(
            JogKey::from_byte(b'5'),
            JogKey::Step {
                axis: Axis::Hundreds,
                reverse: false
            }
        );
    }

    #[test]
    fn test_commit_is_lowercase_only() {
        assert_eq!(JogKey::from_byte(b's'), JogKey::Commit);
        assert_eq!(JogKey::from_byte(b'S'), JogKey::Other);
    }

    #[test]
    fn test_other_bytes() {
        for byte in [b'0', b'7', b'\n', b'\r', b' ', 0xFF] {
            assert_eq!(JogKey::from_byte(byte), JogKey::Other);
        }
    }
}
