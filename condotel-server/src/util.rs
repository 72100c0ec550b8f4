//! Shared utility functions for condotel-server

/// Single-use check-in token, minted once when a booking is confirmed
pub fn generate_check_in_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_check_in_token();
        let b = generate_check_in_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
