//! Shared helpers for handlers.

use axum::http::HeaderMap;

use crate::models::PaymentRecord;

/// Client IP for rate limiting.
///
/// Tries `x-forwarded-for` first (first hop only), then `x-real-ip`.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Escape one CSV field: quote it when it contains a comma, quote or line
/// break, doubling any inner quotes.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

const PAYMENTS_CSV_HEADER: &str = "order_id,created_at,customer_name,customer_email,amount_cents,payment_method,status,card_brand,card_last4,holder_name";

/// Render payment records as CSV, header row first.
pub fn payments_csv(records: &[PaymentRecord]) -> String {
    let mut out = String::from(PAYMENTS_CSV_HEADER);
    out.push('\n');

    for r in records {
        let fields = [
            r.order_id.clone(),
            r.created_at.to_string(),
            r.customer_name.clone(),
            r.customer_email.clone(),
            r.amount_cents.to_string(),
            r.payment_method.clone(),
            r.status.clone(),
            r.card_brand.clone().unwrap_or_default(),
            r.card_last4.clone().unwrap_or_default(),
            r.holder_name.clone().unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("Silva, Ana"), "\"Silva, Ana\"");
        assert_eq!(csv_field("o \"mestre\""), "\"o \"\"mestre\"\"\"");
        assert_eq!(csv_field("linha\nquebrada"), "\"linha\nquebrada\"");
    }

    #[test]
    fn test_payments_csv() {
        let records = vec![PaymentRecord {
            order_id: "o1".into(),
            created_at: 1_700_000_000,
            customer_name: "Silva, Ana".into(),
            customer_email: "ana@example.com".into(),
            amount_cents: 4990,
            payment_method: "cartao".into(),
            status: "pago".into(),
            card_brand: Some("visa".into()),
            card_last4: Some("1111".into()),
            holder_name: Some("ANA SILVA".into()),
        }];

        let csv = payments_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], PAYMENTS_CSV_HEADER);
        assert_eq!(
            lines[1],
            "o1,1700000000,\"Silva, Ana\",ana@example.com,4990,cartao,pago,visa,1111,ANA SILVA"
        );
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("10.0.0.2"));

        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }
}
