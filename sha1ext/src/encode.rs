pub mod hex {
    /// Converts a single ASCII hex digit into its value.
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|v| v as u8)
    }

    /// Converts a single pair of hex digits into a byte.
    /// If there are unnatural hex chars given, returns None.
    pub fn decode_pair(hi: u8, lo: u8) -> Option<u8> {
        nibble(hi).zip(nibble(lo)).map(|(v1, v2)| v1 << 4 | v2)
    }

    /// Converts bytes to a lowercase hex string.
    pub fn to_hex(bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(2 * bytes.len());
        for i in bytes {
            hex.push_str(&format!("{:02x}", *i));
        }
        hex
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x0f, 0xff]), "0fff");
        assert_eq!(to_hex(&[0xff, 0xff]), "ffff");
    }
}
