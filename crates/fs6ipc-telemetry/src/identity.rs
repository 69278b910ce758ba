/// Version identity advertised through the handshake offsets.
///
/// Clients check `0x3304` (FSUIPC version, BCD, high word, with a build
/// letter in the low word) and `0x3308` (simulator code) before reading
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeIdentity {
    /// FSUIPC version as BCD, e.g. `0x7505` for 7.505.
    pub fsuipc_version: u16,
    /// Build letter, `a` = 1 .. `z` = 26, 0 for none.
    pub build_letter: u16,
    /// Simulator version code reported at `0x3308`.
    pub fs_version: u16,
}

impl HandshakeIdentity {
    pub const DEFAULT_FSUIPC_VERSION: u16 = 0x7505;
    /// MSFS 2024.
    pub const DEFAULT_FS_VERSION: u16 = 14;

    /// The 32-bit value stored at `0x3304`.
    pub fn version_word(&self) -> u32 {
        (u32::from(self.fsuipc_version) << 16) | u32::from(self.build_letter)
    }

    /// Build an identity from loosely formatted strings, falling back to the
    /// default for every part that does not parse.
    pub fn from_strings(fsuipc_version: &str, build_letter: &str, fs_version: &str) -> Self {
        let defaults = Self::default();
        Self {
            fsuipc_version: parse_fsuipc_version(fsuipc_version)
                .unwrap_or(defaults.fsuipc_version),
            build_letter: parse_build_letter(build_letter).unwrap_or(defaults.build_letter),
            fs_version: fs_version
                .trim()
                .parse()
                .unwrap_or(defaults.fs_version),
        }
    }

    /// Human readable `major.minor` form, e.g. `7.505`.
    pub fn version_label(&self) -> String {
        let v = self.fsuipc_version;
        format!(
            "{}.{}{}{}",
            v >> 12,
            (v >> 8) & 0xF,
            (v >> 4) & 0xF,
            v & 0xF
        )
    }
}

impl Default for HandshakeIdentity {
    fn default() -> Self {
        Self {
            fsuipc_version: Self::DEFAULT_FSUIPC_VERSION,
            build_letter: 0,
            fs_version: Self::DEFAULT_FS_VERSION,
        }
    }
}

/// Parse `"7.505"` (digits read as BCD) or `"0x7505"` (literal hex).
pub fn parse_fsuipc_version(value: &str) -> Option<u16> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).ok();
    }
    let digits: String = s.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(&digits, 16).ok()
}

/// Parse a build letter (`a`..`z` -> 1..26) or a number clamped to 0..26.
pub fn parse_build_letter(value: &str) -> Option<u16> {
    let s = value.trim();
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(u16::from(c.to_ascii_lowercase() as u8 - b'a' + 1));
        }
    }
    s.parse::<i64>().ok().map(|n| n.clamp(0, 26) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_word() {
        let identity = HandshakeIdentity::default();
        assert_eq!(identity.version_word(), 0x7505_0000);
        assert_eq!(identity.version_label(), "7.505");
    }

    #[test]
    fn parses_dotted_and_hex_versions() {
        assert_eq!(parse_fsuipc_version("7.505"), Some(0x7505));
        assert_eq!(parse_fsuipc_version("0x4960"), Some(0x4960));
        assert_eq!(parse_fsuipc_version("6.1"), Some(0x61));
        assert_eq!(parse_fsuipc_version(""), None);
        assert_eq!(parse_fsuipc_version("vX"), None);
    }

    #[test]
    fn parses_build_letters() {
        assert_eq!(parse_build_letter("a"), Some(1));
        assert_eq!(parse_build_letter("Z"), Some(26));
        assert_eq!(parse_build_letter("40"), Some(26));
        assert_eq!(parse_build_letter("-2"), Some(0));
        assert_eq!(parse_build_letter(""), None);
        assert_eq!(parse_build_letter("ab"), None);
    }

    #[test]
    fn from_strings_falls_back_per_part() {
        let identity = HandshakeIdentity::from_strings("7.123", "garbage", "12");
        assert_eq!(identity.fsuipc_version, 0x7123);
        assert_eq!(identity.build_letter, 0);
        assert_eq!(identity.fs_version, 12);
        assert_eq!(identity.version_word(), 0x7123_0000);
    }
}
