//! The outreach loop: fetch, filter, process, decide.

use super::{Dispatcher, OutreachRunner, Pacer, Qualifier, RunState, filter_page, next_window};
use crate::config::RunConfig;
use crate::retry::with_retry_using;
use crate::types::{Candidate, Event, RunOutcome, RunResult};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// How processing of one page ended
enum PageEnd {
    Exhausted,
    Cancelled,
}

impl OutreachRunner {
    /// Walk the lead list until the target is met, data runs out, a fetch
    /// fails, or `cancel` fires
    pub(super) async fn drive(&self, config: &RunConfig, cancel: &CancellationToken) -> RunResult {
        let started_at = Utc::now();
        let mut state = RunState::new(config.initial_start_count);
        let mut pacer = Pacer::new(
            self.sleeper.clone(),
            self.settings.seed,
            self.settings.page_delay_min_secs,
            self.settings.page_delay_max_secs,
        );
        let qualifier = Qualifier::new(self.oracle.clone());
        let dispatcher = Dispatcher::new(self.directory.clone(), self.settings.unqualified_policy);

        self.emit_event(Event::RunStarted {
            lead_list_id: config.lead_list_id.clone(),
            total_leads: config.total_leads,
            start: state.cursor,
        });

        let outcome = loop {
            if cancel.is_cancelled() {
                break RunOutcome::Cancelled;
            }

            let Some(window) = next_window(&state, config, self.settings.page_cap) else {
                break RunOutcome::Completed;
            };

            tracing::info!(offset = window.offset, size = window.size, "fetching lead batch");
            let backoff = &pacer;
            let page = match with_retry_using(
                &self.settings.fetch_retry,
                move |delay| backoff.wait(delay, cancel),
                || {
                    self.directory
                        .search(window.offset, window.size, &config.lead_list_id)
                },
            )
            .await
            {
                Ok(page) => page,
                Err(_) if cancel.is_cancelled() => break RunOutcome::Cancelled,
                Err(e) => {
                    tracing::error!(
                        offset = window.offset,
                        error = %e,
                        "lead batch fetch failed, aborting run"
                    );
                    break RunOutcome::Aborted {
                        reason: e.to_string(),
                    };
                }
            };
            state.pages_fetched += 1;

            if page.is_empty() {
                tracing::info!(offset = window.offset, "no more leads found");
                self.emit_event(Event::PageFetched {
                    offset: window.offset,
                    requested: window.size,
                    received: 0,
                    available: 0,
                });
                break RunOutcome::Completed;
            }

            let filtered = filter_page(page);
            state.skipped += filtered.skipped;
            tracing::info!(
                received = filtered.received,
                available = filtered.available.len(),
                skipped = filtered.skipped,
                "lead batch filtered"
            );
            self.emit_event(Event::PageFetched {
                offset: window.offset,
                requested: window.size,
                received: filtered.received,
                available: filtered.available.len() as u32,
            });

            let page_end = self
                .process_page(
                    config,
                    &filtered.available,
                    &mut state,
                    &qualifier,
                    &dispatcher,
                    &mut pacer,
                    cancel,
                )
                .await;

            // A partly processed page is fetched again on resume; contacted
            // candidates come back as pending and are skipped.
            if let PageEnd::Cancelled = page_end {
                break RunOutcome::Cancelled;
            }
            let Some(cursor) = state.cursor.checked_add(window.size) else {
                tracing::warn!(
                    offset = window.offset,
                    size = window.size,
                    "lead list offset range exhausted"
                );
                state.cursor = u32::MAX;
                break RunOutcome::Completed;
            };
            state.cursor = cursor;

            if state.target_reached(config.total_leads) {
                break RunOutcome::Completed;
            }
            if filtered.received < window.size {
                tracing::info!(
                    received = filtered.received,
                    requested = window.size,
                    "short page, lead list exhausted"
                );
                break RunOutcome::Completed;
            }

            let delay = pacer.page_delay();
            tracing::debug!(delay_secs = delay.as_secs(), "waiting before next page");
            if !pacer.wait(delay, cancel).await {
                break RunOutcome::Cancelled;
            }
        };

        match &outcome {
            RunOutcome::Completed => tracing::info!(
                processed = state.processed,
                sent = state.sent,
                skipped = state.skipped,
                unqualified = state.unqualified,
                errors = state.errors.len(),
                "outreach run completed"
            ),
            RunOutcome::Aborted { reason } => tracing::error!(
                processed = state.processed,
                sent = state.sent,
                reason = %reason,
                "outreach run aborted"
            ),
            RunOutcome::Cancelled => tracing::warn!(
                processed = state.processed,
                sent = state.sent,
                "outreach run cancelled"
            ),
        }

        self.emit_event(Event::RunFinished {
            outcome: outcome.clone(),
            processed: state.processed,
            sent: state.sent,
        });

        state.into_result(outcome, started_at)
    }

    /// Qualify and contact the available candidates of one page, in order
    #[allow(clippy::too_many_arguments)]
    async fn process_page(
        &self,
        config: &RunConfig,
        available: &[Candidate],
        state: &mut RunState,
        qualifier: &Qualifier,
        dispatcher: &Dispatcher,
        pacer: &mut Pacer,
        cancel: &CancellationToken,
    ) -> PageEnd {
        for (index, candidate) in available.iter().enumerate() {
            if state.target_reached(config.total_leads) {
                tracing::info!("reached target number of leads");
                break;
            }
            if cancel.is_cancelled() {
                return PageEnd::Cancelled;
            }

            tracing::debug!(
                person_id = %candidate.person_id,
                full_name = %candidate.full_name,
                "processing candidate"
            );

            match qualifier.qualify(config, candidate).await {
                Ok(verdict) if !verdict.qualified => {
                    tracing::debug!(person_id = %candidate.person_id, "candidate not qualified");
                    dispatcher
                        .handle_unqualified(&config.lead_list_id, candidate)
                        .await;
                    state.record_unqualified();
                    self.emit_event(Event::CandidateUnqualified {
                        person_id: candidate.person_id.clone(),
                    });
                    continue;
                }
                Ok(verdict) => match dispatcher.dispatch(candidate, &verdict.message).await {
                    Ok(_) => {
                        tracing::debug!(person_id = %candidate.person_id, "invitation sent");
                        state.record_sent();
                        self.emit_event(Event::InvitationSent {
                            person_id: candidate.person_id.clone(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(person_id = %candidate.person_id, error = %e, "contact failed");
                        self.record_failure(state, candidate, e.to_string());
                    }
                },
                Err(e) => {
                    tracing::warn!(person_id = %candidate.person_id, error = %e, "qualification failed");
                    self.record_failure(state, candidate, e.to_string());
                }
            }

            // Unqualified candidates skip the delay; sends and failures are paced
            let more_on_page = index + 1 < available.len();
            if more_on_page && !state.target_reached(config.total_leads) {
                let delay = pacer.action_delay(config);
                tracing::debug!(delay_secs = delay.as_secs(), "waiting before next candidate");
                if !pacer.wait(delay, cancel).await {
                    return PageEnd::Cancelled;
                }
            }
        }
        PageEnd::Exhausted
    }

    fn record_failure(&self, state: &mut RunState, candidate: &Candidate, error: String) {
        state.record_failure(candidate.person_id.clone(), error.clone());
        self.emit_event(Event::CandidateFailed {
            person_id: candidate.person_id.clone(),
            error,
        });
    }
}
