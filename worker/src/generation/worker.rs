use anyhow::Result;
use crates::domain::{
    entities::generation_jobs::GenerationJobEntity,
    repositories::{
        generation::GenerationClient, generation_job::GenerationJobRepository,
        ledger::LedgerRepository,
    },
    value_objects::enums::generation_kinds::GenerationKind,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

pub async fn run(
    job_repo: Arc<dyn GenerationJobRepository + Send + Sync>,
    ledger_repo: Arc<dyn LedgerRepository + Send + Sync>,
    generator: Arc<dyn GenerationClient + Send + Sync>,
    poll_interval: Duration,
) -> Result<()> {
    info!("generation: starting worker loop");
    loop {
        match job_repo.claim_next().await {
            Ok(Some(job)) => {
                info!(job_id = %job.id, attempts = job.attempts, "generation: processing job");
                if let Err(e) =
                    process_generation_job(&job_repo, &ledger_repo, &generator, &job).await
                {
                    error!(
                        job_id = %job.id,
                        error = %e,
                        "generation: failed to process job"
                    );
                }
            }
            Ok(None) => {
                tokio::time::sleep(poll_interval).await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "generation: error claiming next job"
                );
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

async fn process_generation_job(
    job_repo: &Arc<dyn GenerationJobRepository + Send + Sync>,
    ledger_repo: &Arc<dyn LedgerRepository + Send + Sync>,
    generator: &Arc<dyn GenerationClient + Send + Sync>,
    job: &GenerationJobEntity,
) -> Result<()> {
    let Some(kind) = GenerationKind::from_str(&job.type_) else {
        warn!(
            job_id = %job.id,
            kind = %job.type_,
            "generation: unknown job kind"
        );
        fail_and_refund(job_repo, ledger_repo, job, "unknown generation kind").await?;
        return Ok(());
    };

    match generator.generate(kind, job.payload.clone()).await {
        Ok(output) => {
            let applied = job_repo.mark_succeeded(job.id, &output.result_ref).await?;
            if applied {
                info!(
                    job_id = %job.id,
                    result_ref = %output.result_ref,
                    "generation: job succeeded"
                );
            } else {
                // The job was already failed out by another path (e.g. a
                // timeout sweep); the late success is dropped.
                warn!(
                    job_id = %job.id,
                    "generation: stale success, job already terminal"
                );
            }
        }
        Err(err) => {
            error!(
                job_id = %job.id,
                error = %err,
                "generation: external generation call failed"
            );
            fail_and_refund(job_repo, ledger_repo, job, &err.to_string()).await?;
        }
    }

    Ok(())
}

/// One refund per failed job: the refund is issued only when this caller wins
/// the processing -> failed transition.
async fn fail_and_refund(
    job_repo: &Arc<dyn GenerationJobRepository + Send + Sync>,
    ledger_repo: &Arc<dyn LedgerRepository + Send + Sync>,
    job: &GenerationJobEntity,
    error_message: &str,
) -> Result<()> {
    let applied = job_repo.mark_failed(job.id, error_message).await?;
    if !applied {
        warn!(
            job_id = %job.id,
            "generation: stale failure, job already terminal"
        );
        return Ok(());
    }

    let refunded = ledger_repo.refund_credits(job.account_id, 1).await?;
    if refunded {
        info!(
            job_id = %job.id,
            account_id = %job.account_id,
            "generation: job failed, credit restored"
        );
    } else {
        error!(
            job_id = %job.id,
            account_id = %job.account_id,
            "generation: refund found no account row"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        repositories::{
            generation::MockGenerationClient, generation_job::MockGenerationJobRepository,
            ledger::MockLedgerRepository,
        },
        value_objects::{enums::job_statuses::JobStatus, generation::GenerationOutput},
    };
    use mockall::predicate::eq;
    use serde_json::json;
    use uuid::Uuid;

    fn processing_job(kind: &str) -> GenerationJobEntity {
        let now = Utc::now();
        GenerationJobEntity {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            type_: kind.to_string(),
            payload: json!({"theme": "evening"}),
            status: JobStatus::Processing.to_string(),
            attempts: 1,
            result_ref: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn successful_generation_marks_job_succeeded_without_refund() {
        let job = processing_job("song");
        let job_id = job.id;

        let mut job_repo = MockGenerationJobRepository::new();
        let ledger_repo = MockLedgerRepository::new();
        let mut generator = MockGenerationClient::new();

        generator.expect_generate().returning(|_, _| {
            Box::pin(async {
                Ok(GenerationOutput {
                    result_ref: "audio/abc123.mp3".to_string(),
                })
            })
        });

        job_repo
            .expect_mark_succeeded()
            .with(eq(job_id), eq("audio/abc123.mp3"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let job_repo: Arc<dyn GenerationJobRepository + Send + Sync> = Arc::new(job_repo);
        let ledger_repo: Arc<dyn LedgerRepository + Send + Sync> = Arc::new(ledger_repo);
        let generator: Arc<dyn GenerationClient + Send + Sync> = Arc::new(generator);

        process_generation_job(&job_repo, &ledger_repo, &generator, &job)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_generation_marks_job_failed_and_refunds_once() {
        let job = processing_job("prayer");
        let job_id = job.id;
        let account_id = job.account_id;

        let mut job_repo = MockGenerationJobRepository::new();
        let mut ledger_repo = MockLedgerRepository::new();
        let mut generator = MockGenerationClient::new();

        generator
            .expect_generate()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("provider timeout")) }));

        job_repo
            .expect_mark_failed()
            .withf(move |id, error| *id == job_id && error.contains("provider timeout"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        ledger_repo
            .expect_refund_credits()
            .with(eq(account_id), eq(1))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let job_repo: Arc<dyn GenerationJobRepository + Send + Sync> = Arc::new(job_repo);
        let ledger_repo: Arc<dyn LedgerRepository + Send + Sync> = Arc::new(ledger_repo);
        let generator: Arc<dyn GenerationClient + Send + Sync> = Arc::new(generator);

        process_generation_job(&job_repo, &ledger_repo, &generator, &job)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stale_failure_does_not_refund() {
        let job = processing_job("song");

        let mut job_repo = MockGenerationJobRepository::new();
        let ledger_repo = MockLedgerRepository::new();
        let mut generator = MockGenerationClient::new();

        generator
            .expect_generate()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("provider timeout")) }));

        // Job already failed out elsewhere: the transition does not apply and
        // no refund may be issued.
        job_repo
            .expect_mark_failed()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let job_repo: Arc<dyn GenerationJobRepository + Send + Sync> = Arc::new(job_repo);
        let ledger_repo: Arc<dyn LedgerRepository + Send + Sync> = Arc::new(ledger_repo);
        let generator: Arc<dyn GenerationClient + Send + Sync> = Arc::new(generator);

        process_generation_job(&job_repo, &ledger_repo, &generator, &job)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_kind_fails_the_job_without_calling_the_generator() {
        let job = processing_job("interpretive_dance");
        let account_id = job.account_id;

        let mut job_repo = MockGenerationJobRepository::new();
        let mut ledger_repo = MockLedgerRepository::new();
        let generator = MockGenerationClient::new();

        job_repo
            .expect_mark_failed()
            .withf(|_, error| error.contains("unknown generation kind"))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        ledger_repo
            .expect_refund_credits()
            .with(eq(account_id), eq(1))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let job_repo: Arc<dyn GenerationJobRepository + Send + Sync> = Arc::new(job_repo);
        let ledger_repo: Arc<dyn LedgerRepository + Send + Sync> = Arc::new(ledger_repo);
        let generator: Arc<dyn GenerationClient + Send + Sync> = Arc::new(generator);

        process_generation_job(&job_repo, &ledger_repo, &generator, &job)
            .await
            .unwrap();
    }
}
