//! # CRC-32 Implementation
//!
//! CRC-32 (Ethernet / IEEE 802.3) checksum protecting the persisted
//! calibration record.
//!
//! **Polynomial**: 0x04C11DB7 (reflected: 0xEDB88320)
//! **Initial Value**: 0xFFFFFFFF
//! **Final XOR**: 0xFFFFFFFF

/// Reflected CRC-32 polynomial
const CRC32_POLY: u32 = 0xEDB8_8320;

/// Precomputed CRC32 lookup table for fast calculation
const CRC32_TABLE: [u32; 256] = generate_crc32_table();

/// Generate CRC32 lookup table at compile time
const fn generate_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;

        while j < 8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the CRC-32 checksum of `data` using the lookup table
///
/// # Examples
///
/// ```
/// use stick_cal::calibration::crc::crc32;
///
/// assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
/// ```
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;

    for &byte in data {
        crc = (crc >> 8) ^ CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize];
    }

    crc ^ 0xFFFF_FFFF
}

/// Bitwise CRC-32, used to cross-check the table
#[cfg(test)]
fn crc32_slow(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;

    for &byte in data {
        crc ^= byte as u32;

        for _ in 0..8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(crc32(&[]), 0x0000_0000);
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard check value for CRC-32/ISO-HDLC
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_lookup_table_matches_slow() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x00; 256],
            vec![0xFF; 260],
            (0..=255u8).collect::<Vec<_>>(),
        ];

        for data in test_data.iter() {
            assert_eq!(crc32(data), crc32_slow(data), "CRC mismatch for {} bytes", data.len());
        }
    }

    #[test]
    fn test_crc32_changes_with_data() {
        let data1 = [0x00, 0x08, 0x00, 0x08];
        let data2 = [0x00, 0x08, 0x01, 0x08];

        assert_ne!(crc32(&data1), crc32(&data2), "CRC should change when data changes");
    }

    #[test]
    fn test_crc32_of_erased_flash_is_not_erased_word() {
        // An erased page must never look like a valid record
        assert_ne!(crc32(&[0xFF; 256]), 0xFFFF_FFFF);
    }
}
