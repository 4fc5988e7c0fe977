use std::sync::Arc;

use anyhow::Result as AnyResult;
use chrono::Utc;
use crates::{
    domain::{
        entities::processed_events::InsertProcessedEventEntity,
        repositories::billing_events::BillingEventRepository,
        value_objects::{
            billing_events::{IngestOutcome, LedgerEffect},
            enums::{account_statuses::AccountStatus, account_tiers::AccountTier},
        },
    },
    payments::billing_client::{BillingClient, BillingEvent},
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[cfg_attr(test, mockall::automock)]
pub trait BillingGateway: Send + Sync {
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<BillingEvent>;
}

impl BillingGateway for BillingClient {
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<BillingEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    // The dedup row was not committed, so the provider's retry is legitimate.
    #[error("internal server error")]
    Store(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::InvalidSignature => StatusCode::BAD_REQUEST,
            WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

/// Applies each provider event exactly once. The dedup row and the ledger
/// effect commit in one transaction; everything that can go wrong at the
/// event level (unknown type, malformed data) is recorded and acknowledged
/// so the provider's retry policy never amplifies into a delivery storm.
pub struct BillingWebhookUseCase<E, G>
where
    E: BillingEventRepository + Send + Sync + 'static,
    G: BillingGateway + Send + Sync + 'static,
{
    event_repo: Arc<E>,
    billing_client: Arc<G>,
}

impl<E, G> BillingWebhookUseCase<E, G>
where
    E: BillingEventRepository + Send + Sync + 'static,
    G: BillingGateway + Send + Sync + 'static,
{
    pub fn new(event_repo: Arc<E>, billing_client: Arc<G>) -> Self {
        Self {
            event_repo,
            billing_client,
        }
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> UseCaseResult<IngestOutcome> {
        let event = self
            .billing_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "billing webhook: signature verification failed");
                WebhookError::InvalidSignature
            })?;

        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            "billing webhook: event verified"
        );

        self.ingest(event).await
    }

    pub async fn ingest(&self, event: BillingEvent) -> UseCaseResult<IngestOutcome> {
        let (effect, applied_effect) = Self::effect_for_event(&event);

        let insert_event = InsertProcessedEventEntity {
            id: event.event_id.clone(),
            account_id: effect.account_id(),
            raw_payload: event.data.clone(),
            applied_effect: applied_effect.clone(),
            received_at: Utc::now(),
        };

        let outcome = self
            .event_repo
            .apply_once(insert_event, effect)
            .await
            .map_err(|err| {
                error!(
                    event_id = %event.event_id,
                    db_error = ?err,
                    "billing webhook: failed to apply event"
                );
                WebhookError::Store(err)
            })?;

        match outcome {
            IngestOutcome::Applied => {
                info!(
                    event_id = %event.event_id,
                    applied_effect = %applied_effect,
                    "billing webhook: event applied"
                );
            }
            IngestOutcome::Duplicate => {
                debug!(
                    event_id = %event.event_id,
                    "billing webhook: duplicate delivery ignored"
                );
            }
        }

        Ok(outcome)
    }

    /// Maps a verified event to its ledger mutation. Event-level problems
    /// degrade to `LedgerEffect::None` so the dedup row is still written and
    /// the delivery is acknowledged.
    fn effect_for_event(event: &BillingEvent) -> (LedgerEffect, String) {
        let data = match event.parse_data() {
            Ok(data) => data,
            Err(err) => {
                warn!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    error = %err,
                    "billing webhook: malformed event data"
                );
                return (LedgerEffect::None, format!("skipped: malformed data ({err})"));
            }
        };

        match event.event_type.as_str() {
            "payment.completed" => match (data.account_id, data.credits) {
                (Some(account_id), Some(credits)) if credits > 0 => (
                    LedgerEffect::Refill {
                        account_id,
                        amount: credits,
                    },
                    format!("refilled {credits} credits"),
                ),
                _ => {
                    warn!(
                        event_id = %event.event_id,
                        "billing webhook: payment.completed missing accountId or credits"
                    );
                    (
                        LedgerEffect::None,
                        "skipped: payment.completed missing accountId or credits".to_string(),
                    )
                }
            },
            "subscription.created" | "subscription.renewed" => {
                Self::entitlement_effect(event, &data, AccountStatus::Active, data.credits)
            }
            "subscription.canceled" => {
                Self::entitlement_effect(event, &data, AccountStatus::Canceled, None)
            }
            "subscription.expired" => {
                Self::entitlement_effect(event, &data, AccountStatus::Expired, None)
            }
            "subscription.paused" => {
                Self::entitlement_effect(event, &data, AccountStatus::Paused, None)
            }
            other => {
                debug!(
                    event_id = %event.event_id,
                    "billing webhook: unhandled event type {other}"
                );
                (LedgerEffect::None, format!("ignored: {other}"))
            }
        }
    }

    fn entitlement_effect(
        event: &BillingEvent,
        data: &crates::payments::billing_client::BillingEventData,
        status: AccountStatus,
        refill: Option<i32>,
    ) -> (LedgerEffect, String) {
        let Some(account_id) = data.account_id else {
            warn!(
                event_id = %event.event_id,
                event_type = %event.event_type,
                "billing webhook: subscription event missing accountId"
            );
            return (
                LedgerEffect::None,
                format!("skipped: {} missing accountId", event.event_type),
            );
        };

        let tier = data
            .tier
            .as_deref()
            .map(AccountTier::from_str)
            .unwrap_or(AccountTier::Subscription);
        let refill = refill.filter(|credits| *credits > 0);

        let applied_effect = match refill {
            Some(credits) => format!("entitlement {tier}/{status}, refilled {credits} credits"),
            None => format!("entitlement {tier}/{status}"),
        };

        (
            LedgerEffect::UpsertEntitlement {
                account_id,
                tier,
                status,
                external_subscription_id: data.subscription_id.clone(),
                renews_at: data.renews_at,
                refill,
            },
            applied_effect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::billing_events::MockBillingEventRepository;
    use serde_json::json;
    use uuid::Uuid;

    fn payment_event(event_id: &str, account_id: Uuid, credits: i32) -> BillingEvent {
        BillingEvent {
            event_id: event_id.to_string(),
            event_type: "payment.completed".to_string(),
            data: json!({ "accountId": account_id, "credits": credits }),
        }
    }

    #[tokio::test]
    async fn payment_completed_refills_credits_once() {
        let account_id = Uuid::new_v4();

        let mut event_repo = MockBillingEventRepository::new();
        event_repo
            .expect_apply_once()
            .withf(move |event, effect| {
                event.id == "evt_1"
                    && *effect
                        == LedgerEffect::Refill {
                            account_id,
                            amount: 10,
                        }
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(IngestOutcome::Applied) }));

        let usecase =
            BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(MockBillingGateway::new()));

        let outcome = usecase
            .ingest(payment_event("evt_1", account_id, 10))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Applied);
    }

    #[tokio::test]
    async fn redelivered_event_reports_duplicate() {
        let account_id = Uuid::new_v4();

        let mut event_repo = MockBillingEventRepository::new();
        event_repo
            .expect_apply_once()
            .returning(|_, _| Box::pin(async { Ok(IngestOutcome::Duplicate) }));

        let usecase =
            BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(MockBillingGateway::new()));

        let outcome = usecase
            .ingest(payment_event("evt_1", account_id, 10))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Duplicate);
    }

    #[tokio::test]
    async fn subscription_renewed_upserts_entitlement_with_refill() {
        let account_id = Uuid::new_v4();

        let mut event_repo = MockBillingEventRepository::new();
        event_repo
            .expect_apply_once()
            .withf(move |_, effect| {
                matches!(
                    effect,
                    LedgerEffect::UpsertEntitlement {
                        account_id: id,
                        tier: AccountTier::Subscription,
                        status: AccountStatus::Active,
                        external_subscription_id: Some(sub),
                        refill: Some(30),
                        ..
                    } if *id == account_id && sub == "sub_42"
                )
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(IngestOutcome::Applied) }));

        let usecase =
            BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(MockBillingGateway::new()));

        let event = BillingEvent {
            event_id: "evt_2".to_string(),
            event_type: "subscription.renewed".to_string(),
            data: json!({
                "accountId": account_id,
                "credits": 30,
                "tier": "subscription",
                "subscriptionId": "sub_42",
            }),
        };

        let outcome = usecase.ingest(event).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Applied);
    }

    #[tokio::test]
    async fn subscription_canceled_sets_status_without_refill() {
        let account_id = Uuid::new_v4();

        let mut event_repo = MockBillingEventRepository::new();
        event_repo
            .expect_apply_once()
            .withf(move |_, effect| {
                matches!(
                    effect,
                    LedgerEffect::UpsertEntitlement {
                        account_id: id,
                        status: AccountStatus::Canceled,
                        refill: None,
                        ..
                    } if *id == account_id
                )
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(IngestOutcome::Applied) }));

        let usecase =
            BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(MockBillingGateway::new()));

        let event = BillingEvent {
            event_id: "evt_3".to_string(),
            event_type: "subscription.canceled".to_string(),
            data: json!({ "accountId": account_id }),
        };

        let outcome = usecase.ingest(event).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Applied);
    }

    #[tokio::test]
    async fn unknown_event_type_is_recorded_without_effect() {
        let mut event_repo = MockBillingEventRepository::new();
        event_repo
            .expect_apply_once()
            .withf(|event, effect| {
                event.applied_effect == "ignored: invoice.finalized"
                    && *effect == LedgerEffect::None
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(IngestOutcome::Applied) }));

        let usecase =
            BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(MockBillingGateway::new()));

        let event = BillingEvent {
            event_id: "evt_4".to_string(),
            event_type: "invoice.finalized".to_string(),
            data: json!({}),
        };

        let outcome = usecase.ingest(event).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Applied);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_ingest() {
        let event_repo = MockBillingEventRepository::new();

        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("invalid webhook signature")));

        let usecase = BillingWebhookUseCase::new(Arc::new(event_repo), Arc::new(gateway));

        let result = usecase.handle_webhook(b"{}", "t=0,v1=bad").await;
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }
}
