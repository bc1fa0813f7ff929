use chrono::Utc;
use rand::{thread_rng, Rng, RngCore};

/// 24 lowercase hex chars: 4-byte big-endian unix seconds followed by 8 random bytes.
pub fn new_object_id() -> String {
    let mut bytes = [0u8; 12];
    let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    thread_rng().fill_bytes(&mut bytes[4..]);
    hex::encode(bytes)
}

pub fn new_otp() -> String {
    format!("{:06}", thread_rng().gen_range(0..1_000_000u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_are_24_hex_chars_and_unique() {
        let a = new_object_id();
        let b = new_object_id();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = new_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
