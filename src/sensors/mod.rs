pub mod mmc5603;

pub use mmc5603::{Mmc5603, RegisterMap, MMC5603NJ, RAW_BLOCK_LEN};

/// Swap the two bytes of a 16-bit value
pub fn byte_swap(data: u16) -> u16 {
    data.rotate_left(8)
}

/// Render a raw register block as space-separated hex
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_swap() {
        assert_eq!(byte_swap(0x1234), 0x3412);
        assert_eq!(byte_swap(0x00FF), 0xFF00);
        assert_eq!(byte_swap(byte_swap(0xBEEF)), 0xBEEF);
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x10, 0x0A, 0xFF]), "10 0A FF");
        assert_eq!(hex(&[]), "");
    }
}
