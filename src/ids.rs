use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Total length of generated order/item/payment/payout identifiers,
/// including the prefix and both separators.
const EXTERNAL_ID_LEN: usize = 14;

/// Generates an external identifier of the form `PREFIX-TTTTT-XXXX`, where
/// `TTTTT` is the last five digits of the unix timestamp and `XXXX` is random
/// uppercase alphanumeric padding sized so the whole identifier is
/// `EXTERNAL_ID_LEN` characters.
///
/// The scheme is intentionally not collision-proof; rows are keyed by UUID
/// and these identifiers exist for humans and external references.
fn generate_external_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string();
    let ts_tail: String = timestamp
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let random_len = EXTERNAL_ID_LEN.saturating_sub(prefix.len() + ts_tail.len() + 2);
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(random_len)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();

    format!("{}-{}-{}", prefix, ts_tail, random)
}

/// Order numbers: `ORD-12345-XXXX`
pub fn generate_order_number() -> String {
    generate_external_id("ORD")
}

/// Order item numbers: `ITM-12345-XXXX`
pub fn generate_item_number() -> String {
    generate_external_id("ITM")
}

/// Payment numbers: `PMT-12345-XXXX`
pub fn generate_payment_number() -> String {
    generate_external_id("PMT")
}

/// Payout numbers: `PAY-12345-XXXX`
pub fn generate_payout_number() -> String {
    generate_external_id("PAY")
}

/// Product identifiers use a different shape: `pr-` followed by eight random
/// alphanumerics (mixed case).
pub fn generate_product_id() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("pr-{}", random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_ids_have_fixed_shape() {
        for id in [
            generate_order_number(),
            generate_item_number(),
            generate_payment_number(),
            generate_payout_number(),
        ] {
            assert_eq!(id.len(), EXTERNAL_ID_LEN, "unexpected length for {}", id);
            let parts: Vec<&str> = id.split('-').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[1].len(), 5);
            assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
            assert!(parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn prefixes_match_record_kind() {
        assert!(generate_order_number().starts_with("ORD-"));
        assert!(generate_item_number().starts_with("ITM-"));
        assert!(generate_payment_number().starts_with("PMT-"));
        assert!(generate_payout_number().starts_with("PAY-"));
    }

    #[test]
    fn product_ids_use_short_prefix() {
        let id = generate_product_id();
        assert!(id.starts_with("pr-"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
