use super::*;
use chrono::NaiveDate;

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

fn promo(percent: i64) -> Promotion {
    Promotion {
        id: 1,
        condotel_id: 1,
        discount_percent: dec(percent),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        is_active: true,
    }
}

fn voucher(kind: VoucherKind, value: i64) -> Voucher {
    Voucher {
        id: 1,
        code: "WELCOME".to_string(),
        kind: kind.as_db().to_string(),
        value: dec(value),
        usage_count: 0,
        max_usage: 100,
        is_active: true,
    }
}

#[test]
fn test_plain_stay() {
    // rate=1,000,000/night, 3 nights, no promo/voucher/add-ons
    let q = quote(dec(1_000_000), 3, None, None, &[]);
    assert_eq!(q.room_subtotal, dec(3_000_000));
    assert_eq!(q.total, dec(3_000_000));
}

#[test]
fn test_promotion_percentage() {
    let p = promo(10);
    let q = quote(dec(1_000_000), 3, Some(&p), None, &[]);
    assert_eq!(q.promo_discount, dec(300_000));
    assert_eq!(q.total, dec(2_700_000));
}

#[test]
fn test_amount_voucher_clamps_at_zero() {
    // Voucher larger than the room subtotal never drives the price negative
    let v = voucher(VoucherKind::Amount, 5_000_000);
    let q = quote(dec(500_000), 2, None, Some(&v), &[]);
    assert_eq!(q.voucher_discount, dec(1_000_000));
    assert_eq!(q.total, dec(0));
}

#[test]
fn test_percent_voucher_applies_after_promotion() {
    let p = promo(10);
    let v = voucher(VoucherKind::Percent, 20);
    // room 2,000,000 -> promo -200,000 -> 1,800,000 -> voucher -360,000
    let q = quote(dec(1_000_000), 2, Some(&p), Some(&v), &[]);
    assert_eq!(q.voucher_discount, dec(360_000));
    assert_eq!(q.total, dec(1_440_000));
}

#[test]
fn test_addons_added_after_clamp() {
    let v = voucher(VoucherKind::Amount, 9_999_999);
    let addons = vec![
        AddonLine {
            service_id: 1,
            quantity: 2,
            unit_price: dec(150_000),
        },
        AddonLine {
            service_id: 2,
            quantity: 1,
            unit_price: dec(200_000),
        },
    ];
    let q = quote(dec(500_000), 1, None, Some(&v), &addons);
    assert_eq!(q.addons_total, dec(500_000));
    // Room clamped to zero, add-ons still charged in full
    assert_eq!(q.total, dec(500_000));
}

#[test]
fn test_total_rounds_to_whole_vnd() {
    let v = voucher(VoucherKind::Percent, 33);
    let q = quote(dec(1_000_001), 1, None, Some(&v), &[]);
    assert_eq!(q.total, q.total.round_dp(0));
}
