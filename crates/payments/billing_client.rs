use anyhow::Result;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Payment-provider webhook envelope: `{ eventId, eventType, data }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEvent {
    pub event_id: String,
    pub event_type: String,
    pub data: serde_json::Value,
}

/// Entitlement fields carried in the event's `data` object. Every field is
/// optional at the wire level; the ingestor decides what is required per
/// event type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEventData {
    pub account_id: Option<Uuid>,
    pub credits: Option<i32>,
    pub tier: Option<String>,
    pub subscription_id: Option<String>,
    pub renews_at: Option<DateTime<Utc>>,
}

impl BillingEvent {
    pub fn parse_data(&self) -> Result<BillingEventData> {
        let data = serde_json::from_value(self.data.clone())?;
        Ok(data)
    }
}

/// Verifies provider webhook signatures. Signature header format:
/// `t=<unix_ts>,v1=<hex hmac-sha256 of "<ts>.<body>">`.
pub struct BillingClient {
    webhook_secret: String,
}

impl BillingClient {
    pub fn new(webhook_secret: String) -> Self {
        Self { webhook_secret }
    }

    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<BillingEvent> {
        let mut timestamp: Option<String> = None;
        let mut signature: Option<String> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest.to_string());
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest.to_string());
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in billing-signature"))?;
        let signature =
            signature.ok_or_else(|| anyhow::anyhow!("missing v1 in billing-signature"))?;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature)?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid webhook signature");
        }

        let event: BillingEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let client = BillingClient::new("whsec_test".to_string());
        let payload = br#"{"eventId":"evt_1","eventType":"payment.completed","data":{"accountId":"123e4567-e89b-12d3-a456-426614174000","credits":5}}"#;
        let header = format!("t=1700000000,v1={}", sign("whsec_test", "1700000000", payload));

        let event = client
            .verify_webhook_signature(payload, &header)
            .expect("valid signature should verify");
        assert_eq!(event.event_id, "evt_1");
        assert_eq!(event.event_type, "payment.completed");

        let data = event.parse_data().unwrap();
        assert_eq!(data.credits, Some(5));
        assert!(data.account_id.is_some());
    }

    #[test]
    fn rejects_wrong_secret() {
        let client = BillingClient::new("whsec_test".to_string());
        let payload = br#"{"eventId":"evt_1","eventType":"payment.completed","data":{}}"#;
        let header = format!("t=1700000000,v1={}", sign("whsec_other", "1700000000", payload));

        assert!(client.verify_webhook_signature(payload, &header).is_err());
    }

    #[test]
    fn rejects_tampered_payload() {
        let client = BillingClient::new("whsec_test".to_string());
        let payload = br#"{"eventId":"evt_1","eventType":"payment.completed","data":{"credits":5}}"#;
        let header = format!("t=1700000000,v1={}", sign("whsec_test", "1700000000", payload));
        let tampered = br#"{"eventId":"evt_1","eventType":"payment.completed","data":{"credits":500}}"#;

        assert!(client.verify_webhook_signature(tampered, &header).is_err());
    }

    #[test]
    fn rejects_missing_signature_parts() {
        let client = BillingClient::new("whsec_test".to_string());
        let payload = br#"{"eventId":"evt_1","eventType":"payment.completed","data":{}}"#;

        assert!(client.verify_webhook_signature(payload, "t=1700000000").is_err());
        assert!(client.verify_webhook_signature(payload, "v1=deadbeef").is_err());
    }
}
