use crate::constants::BASE_CURRENCY;
use crate::types::{NormalizedItem, RawCatalogEntry};
use serde_json::Value;

/// Rounds to two decimals, the precision every displayed price uses.
///
/// Works on the exact binary value of `value` (`m * 2^e`), not on
/// `value * 100.0`, so 0.424999... stays 0.42. Exact ties go away from zero.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let bits = value.abs().to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };
    if exp >= 0 {
        // Already a whole number
        return value;
    }

    let shift = (-exp) as u32;
    let cents = if shift > 120 {
        // Far below half a cent
        0
    } else {
        let scaled = u128::from(mantissa) * 100;
        let denom = 1u128 << shift;
        let (whole, rem) = (scaled / denom, scaled % denom);
        if rem * 2 >= denom {
            whole + 1
        } else {
            whole
        }
    };

    let rounded = cents as f64 / 100.0;
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

/// Reads a JSON number or a numeric string; anything else is `None`.
fn as_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn as_count(value: Option<&Value>) -> Option<u64> {
    let n = as_number(value)?;
    (n >= 0.0 && n.fract() == 0.0).then_some(n as u64)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_image(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Array(images) => non_empty_str(images.first()),
        v @ Value::String(_) => non_empty_str(Some(v)),
        _ => None,
    }
}

/// Converts one raw catalog entry into a priced item.
///
/// Entries without a positive `offers.lowPrice` are unlisted and yield `None`.
pub fn normalize_item(
    raw: &RawCatalogEntry,
    usd_to_target: f64,
    weapon_slug: &str,
) -> Option<NormalizedItem> {
    let offers = raw.get("offers");
    let low_price_usd = as_number(offers.and_then(|o| o.get("lowPrice")))?;
    if low_price_usd <= 0.0 {
        return None;
    }

    let full_name = raw
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    let mut parts = full_name.split('|').map(str::trim);
    let weapon = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| weapon_slug.to_uppercase());
    let skin_name = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| full_name.clone());

    Some(NormalizedItem {
        weapon,
        weapon_slug: weapon_slug.to_string(),
        skin_name,
        item_url: non_empty_str(raw.get("url")),
        image_url: first_image(raw.get("image")),
        low_price_usd,
        high_price_usd: as_number(offers.and_then(|o| o.get("highPrice"))),
        low_price_azn: round2(low_price_usd * usd_to_target),
        offer_count: as_count(offers.and_then(|o| o.get("offerCount"))),
        source_currency: non_empty_str(offers.and_then(|o| o.get("priceCurrency")))
            .unwrap_or_else(|| BASE_CURRENCY.to_string()),
        full_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_a_listed_skin() {
        let raw = json!({
            "name": "AK-47 | Redline",
            "offers": {"lowPrice": 8.5, "offerCount": 12, "priceCurrency": "USD"}
        });

        let item = normalize_item(&raw, 1.7, "ak-47").unwrap();

        assert_eq!(item.weapon, "AK-47");
        assert_eq!(item.weapon_slug, "ak-47");
        assert_eq!(item.full_name, "AK-47 | Redline");
        assert_eq!(item.skin_name, "Redline");
        assert_eq!(item.low_price_usd, 8.5);
        assert_eq!(item.low_price_azn, 14.45);
        assert_eq!(item.offer_count, Some(12));
        assert_eq!(item.high_price_usd, None);
        assert_eq!(item.item_url, None);
        assert_eq!(item.image_url, None);
        assert_eq!(item.source_currency, "USD");
    }

    #[test]
    fn unpriced_entries_are_dropped() {
        for offers in [
            json!({"lowPrice": 0}),
            json!({"lowPrice": -3.2}),
            json!({"lowPrice": "n/a"}),
            json!({"lowPrice": null}),
            json!({"lowPrice": true}),
            json!({}),
        ] {
            let raw = json!({"name": "AWP | Dragon Lore", "offers": offers});
            assert!(normalize_item(&raw, 1.7, "awp").is_none(), "{raw}");
        }
        assert!(normalize_item(&json!({"name": "AWP | Safari Mesh"}), 1.7, "awp").is_none());
        assert!(normalize_item(&Value::Null, 1.7, "awp").is_none());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let raw = json!({
            "name": "Glock-18 | Candy Apple",
            "offers": {"lowPrice": "2.10", "highPrice": "9.99", "offerCount": "40"}
        });
        let item = normalize_item(&raw, 1.7, "glock-18").unwrap();
        assert_eq!(item.low_price_usd, 2.1);
        assert_eq!(item.low_price_azn, 3.57);
        assert_eq!(item.high_price_usd, Some(9.99));
        assert_eq!(item.offer_count, Some(40));
    }

    #[test]
    fn name_without_separator_falls_back() {
        let raw = json!({"name": "  Souvenir Package ", "offers": {"lowPrice": 1}});
        let item = normalize_item(&raw, 2.0, "mp9").unwrap();
        assert_eq!(item.weapon, "Souvenir Package");
        assert_eq!(item.skin_name, "Souvenir Package");
        assert_eq!(item.full_name, "Souvenir Package");

        let nameless = json!({"offers": {"lowPrice": 1}});
        let item = normalize_item(&nameless, 2.0, "mp9").unwrap();
        assert_eq!(item.weapon, "MP9");
        assert_eq!(item.skin_name, "");
    }

    #[test]
    fn optional_fields_pass_through_or_null() {
        let raw = json!({
            "name": "M4A4 | Howl",
            "url": "https://market.test/items/m4a4-howl",
            "image": ["https://cdn.test/howl.png", "https://cdn.test/howl-2.png"],
            "offers": {
                "lowPrice": 4.0,
                "highPrice": "unknown",
                "offerCount": 2.5,
                "priceCurrency": "EUR"
            }
        });
        let item = normalize_item(&raw, 1.7, "m4a4").unwrap();
        assert_eq!(item.item_url.as_deref(), Some("https://market.test/items/m4a4-howl"));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.test/howl.png"));
        assert_eq!(item.high_price_usd, None);
        assert_eq!(item.offer_count, None);
        assert_eq!(item.source_currency, "EUR");
    }

    #[test]
    fn target_price_is_rounded_product() {
        for (usd, rate) in [(0.03, 1.7), (11.76, 1.7), (0.005, 1.0), (123.456, 1.6995)] {
            let raw = json!({"name": "P90 | Asiimov", "offers": {"lowPrice": usd}});
            let item = normalize_item(&raw, rate, "p90").unwrap();
            assert_eq!(item.low_price_azn, round2(usd * rate));
        }
    }

    #[test]
    fn rounds_the_exact_decimal_value() {
        // 0.25 * 1.7 is 0.42499999999999998890 as a double
        assert_eq!(round2(0.25 * 1.7), 0.42);
        assert_eq!(round2(0.35 * 1.7), 0.59);
        assert_eq!(round2(0.65 * 1.7), 1.1);
        // 0.125 is exact, so it is a true tie and goes up
        assert_eq!(round2(0.125 * 1.0), 0.13);
        assert_eq!(round2(8.5 * 1.7), 14.45);
        assert_eq!(round2(0.05 * 1.7), 0.09);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(1e-300), 0.0);
        assert_eq!(round2(765.0), 765.0);

        let raw = json!({"name": "MP7 | Army Recon", "offers": {"lowPrice": 0.25}});
        let item = normalize_item(&raw, 1.7, "mp7").unwrap();
        assert_eq!(item.low_price_azn, 0.42);
    }

    #[test]
    fn serializes_with_display_field_names() {
        let raw = json!({"name": "AK-47 | Redline", "offers": {"lowPrice": 8.5}});
        let item = normalize_item(&raw, 1.7, "ak-47").unwrap();
        let v = serde_json::to_value(&item).unwrap();
        for key in [
            "weapon", "weaponSlug", "fullName", "skinName", "itemUrl", "imageUrl",
            "lowPriceUsd", "highPriceUsd", "lowPriceAzn", "offerCount", "sourceCurrency",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert!(v["itemUrl"].is_null());
    }
}
