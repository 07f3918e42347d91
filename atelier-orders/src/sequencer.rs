//! Persistence sequencer
//!
//! Saving an aggregate is a fixed sequence of phases: header first,
//! then detail lines, the recomputed total, payments, workshop
//! assignments, and resource requirements, with cache invalidation at
//! the end. Phases run strictly in order; writes within a phase fan
//! out concurrently and the first failure drops its in-flight
//! siblings. The phases read the aggregate and buffer what the server
//! assigns; the aggregate adopts that state only once every phase has
//! succeeded. A failure stops the sequence, rolls back a header this
//! save created, and reports the phase it happened in.

use crate::aggregate::{OrderAggregate, OrderIdentity};
use crate::diff::ChildPlan;
use crate::error::{SaveError, SavePhase, SaveResult};
use crate::rollback;
use crate::totals;
use crate::validate;
use atelier_client::{CacheInvalidator, CacheScope, Notifier, OrderApi, Resource};
use futures::future::try_join_all;
use futures::try_join;
use shared::models::{
    DetailFields, DetailWrite, OrderUpdate, PaymentFields, PaymentWrite, RequirementFields,
    RequirementWrite, WorkshopFields, WorkshopWrite,
};
use shared::{ProviderError, ProviderResult};
use std::sync::Arc;
use uuid::Uuid;

/// Summary of a completed save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub order_id: i64,
    /// Version after the last header write; the next save must present it
    pub version: i64,
    pub total_amount: f64,
    pub created: bool,
}

struct PhaseFailure {
    phase: SavePhase,
    source: ProviderError,
    /// Header id when this save created it, for rollback
    created_header: Option<i64>,
}

/// Server-assigned state buffered while the phases run. Folded into
/// the aggregate only once the whole sequence has succeeded, so a
/// failed save leaves the aggregate exactly as it was.
struct SaveSync {
    report: SaveReport,
    created_details: Vec<(Uuid, i64)>,
    updated_details: Vec<i64>,
    created_payments: Vec<(Uuid, i64)>,
    updated_payments: Vec<i64>,
    created_workshops: Vec<(Uuid, i64)>,
    created_requirements: Vec<(Uuid, i64)>,
}

impl SaveSync {
    fn apply(self, aggregate: &mut OrderAggregate) -> SaveReport {
        aggregate.set_persisted(self.report.order_id, self.report.version);

        for (token, id) in self.created_details {
            aggregate.details.absorb_created(token, id);
        }
        for id in self.updated_details {
            aggregate.details.absorb_updated(id);
        }
        aggregate.details.absorb_deleted();

        for (token, id) in self.created_payments {
            aggregate.payments.absorb_created(token, id);
        }
        for id in self.updated_payments {
            aggregate.payments.absorb_updated(id);
        }
        aggregate.payments.absorb_deleted();

        for (token, id) in self.created_workshops {
            aggregate.workshops.absorb_created(token, id);
        }
        aggregate.workshops.absorb_deleted();

        for (token, id) in self.created_requirements {
            aggregate.requirements.absorb_created(token, id);
        }
        aggregate.requirements.absorb_deleted();

        self.report
    }
}

/// Runs the save sequence and reports outcomes to the user
pub struct OrderSaveService {
    api: OrderApi,
    cache: Arc<dyn CacheInvalidator>,
    notifier: Arc<dyn Notifier>,
}

impl OrderSaveService {
    pub fn new(
        api: OrderApi,
        cache: Arc<dyn CacheInvalidator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    /// Validate and persist the aggregate.
    ///
    /// The phases treat the aggregate as read-only input. Only after
    /// all of them succeed does it adopt the server state: temp rows
    /// carry their server ids, snapshots are refreshed, and the
    /// version matches the server. A failed save leaves the aggregate
    /// exactly as it was, so a rolled-back create retries as a fresh
    /// create, and an edit that failed partway keeps its loaded
    /// version, which the next save reports as the version conflict
    /// with its reload prompt.
    pub async fn save(&self, aggregate: &mut OrderAggregate) -> SaveResult<SaveReport> {
        // 1. Validate before touching the network
        if let Err(e) = validate::validate_aggregate(aggregate) {
            self.notifier.error(&save_failure_message(&e), None);
            return Err(e);
        }

        aggregate.draft = aggregate.draft.clone().normalized();
        tracing::debug!(creating = aggregate.is_new(), "Saving order aggregate");

        // 2. Run the phase sequence
        match self.run_phases(aggregate).await {
            Ok(sync) => {
                // 3. Every phase landed; the aggregate adopts the result
                let report = sync.apply(aggregate);

                // 4. Drop stale caches and confirm
                self.invalidate_caches(report.order_id);
                self.notifier.success(if report.created {
                    "Order created"
                } else {
                    "Order saved"
                });
                tracing::info!(
                    order_id = report.order_id,
                    created = report.created,
                    total = report.total_amount,
                    "Order saved"
                );
                Ok(report)
            }
            Err(failure) => {
                // 5. Unwind a header this save created, then report
                let rollback =
                    rollback::roll_back_created_header(&self.api, failure.created_header).await;
                let detail = failure.source.to_string();
                let error = SaveError::Phase {
                    phase: failure.phase,
                    rollback,
                    source: failure.source,
                };
                tracing::error!(phase = %failure.phase, error = %error, "Order save failed");
                self.notifier
                    .error(&save_failure_message(&error), Some(detail.as_str()));
                Err(error)
            }
        }
    }

    async fn run_phases(&self, aggregate: &OrderAggregate) -> Result<SaveSync, PhaseFailure> {
        let created = aggregate.is_new();

        // 1. Create or update the order header
        let header = match aggregate.identity() {
            OrderIdentity::New => {
                self.api
                    .create_order(&aggregate.draft)
                    .await
                    .map_err(|e| PhaseFailure {
                        phase: SavePhase::Header,
                        source: e,
                        created_header: None,
                    })?
            }
            OrderIdentity::Persisted { id, version } => {
                let update = OrderUpdate {
                    fields: aggregate.draft.clone(),
                    version,
                };
                self.api
                    .update_order(id, &update)
                    .await
                    .map_err(|e| PhaseFailure {
                        phase: SavePhase::Header,
                        source: e,
                        created_header: None,
                    })?
            }
        };
        let order_id = header.id;
        let mut version = header.version;

        let created_header = if created { Some(order_id) } else { None };
        let fail = |phase: SavePhase, source: ProviderError| PhaseFailure {
            phase,
            source,
            created_header,
        };

        // 2. Write new and changed detail lines
        let plan = aggregate.details.plan();
        let created_details = self
            .write_details(order_id, &plan)
            .await
            .map_err(|e| fail(SavePhase::DetailWrites, e))?;
        let updated_details: Vec<i64> = plan.updates.into_iter().map(|(id, _)| id).collect();

        // 3. Delete removed detail lines
        let removed = aggregate.details.removed_ids();
        try_join_all(removed.iter().map(|id| self.api.delete_detail(*id)))
            .await
            .map_err(|e| fail(SavePhase::DetailDeletes, e))?;

        // 4. Re-derive the total from the lines that actually persisted
        let header = totals::store_total(&self.api, order_id, version)
            .await
            .map_err(|e| fail(SavePhase::TotalUpdate, e))?;
        let total_amount = header.total_amount;
        version = header.version;

        // 5. Write new and changed payments
        let plan = aggregate.payments.plan();
        let created_payments = self
            .write_payments(order_id, &plan)
            .await
            .map_err(|e| fail(SavePhase::PaymentWrites, e))?;
        let updated_payments: Vec<i64> = plan.updates.into_iter().map(|(id, _)| id).collect();

        // 6. Delete removed payments
        let removed = aggregate.payments.removed_ids();
        try_join_all(removed.iter().map(|id| self.api.delete_payment(*id)))
            .await
            .map_err(|e| fail(SavePhase::PaymentDeletes, e))?;

        // 7. Rewrite workshop assignments
        let plan = aggregate.workshops.plan();
        let created_workshops = self
            .write_workshops(order_id, &plan)
            .await
            .map_err(|e| fail(SavePhase::WorkshopWrites, e))?;

        // 8. Delete removed workshop assignments
        let removed = aggregate.workshops.removed_ids();
        try_join_all(removed.iter().map(|id| self.api.delete_workshop(*id)))
            .await
            .map_err(|e| fail(SavePhase::WorkshopDeletes, e))?;

        // 9. Rewrite resource requirements and drop removed ones
        let plan = aggregate.requirements.plan();
        let created_requirements = self
            .sync_requirements(order_id, &plan, aggregate.requirements.removed_ids())
            .await
            .map_err(|e| fail(SavePhase::RequirementSync, e))?;

        Ok(SaveSync {
            report: SaveReport {
                order_id,
                version,
                total_amount,
                created,
            },
            created_details,
            updated_details,
            created_payments,
            updated_payments,
            created_workshops,
            created_requirements,
        })
    }

    async fn write_details(
        &self,
        order_id: i64,
        plan: &ChildPlan<DetailFields>,
    ) -> ProviderResult<Vec<(Uuid, i64)>> {
        let creates = plan.creates.iter().map(|(token, fields)| {
            let token = *token;
            let write = DetailWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                let record = self.api.create_detail(&write).await?;
                Ok::<_, ProviderError>((token, record.id))
            }
        });
        let updates = plan.updates.iter().map(|(id, fields)| {
            let id = *id;
            let write = DetailWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                self.api.update_detail(id, &write).await?;
                Ok::<_, ProviderError>(())
            }
        });

        let (created, _) = try_join!(try_join_all(creates), try_join_all(updates))?;
        Ok(created)
    }

    async fn write_payments(
        &self,
        order_id: i64,
        plan: &ChildPlan<PaymentFields>,
    ) -> ProviderResult<Vec<(Uuid, i64)>> {
        let creates = plan.creates.iter().map(|(token, fields)| {
            let token = *token;
            let write = PaymentWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                let record = self.api.create_payment(&write).await?;
                Ok::<_, ProviderError>((token, record.id))
            }
        });
        let updates = plan.updates.iter().map(|(id, fields)| {
            let id = *id;
            let write = PaymentWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                self.api.update_payment(id, &write).await?;
                Ok::<_, ProviderError>(())
            }
        });

        let (created, _) = try_join!(try_join_all(creates), try_join_all(updates))?;
        Ok(created)
    }

    async fn write_workshops(
        &self,
        order_id: i64,
        plan: &ChildPlan<WorkshopFields>,
    ) -> ProviderResult<Vec<(Uuid, i64)>> {
        let creates = plan.creates.iter().map(|(token, fields)| {
            let token = *token;
            let write = WorkshopWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                let record = self.api.create_workshop(&write).await?;
                Ok::<_, ProviderError>((token, record.id))
            }
        });
        let updates = plan.updates.iter().map(|(id, fields)| {
            let id = *id;
            let write = WorkshopWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                self.api.update_workshop(id, &write).await?;
                Ok::<_, ProviderError>(())
            }
        });

        let (created, _) = try_join!(try_join_all(creates), try_join_all(updates))?;
        Ok(created)
    }

    async fn sync_requirements(
        &self,
        order_id: i64,
        plan: &ChildPlan<RequirementFields>,
        removed: &[i64],
    ) -> ProviderResult<Vec<(Uuid, i64)>> {
        let creates = plan.creates.iter().map(|(token, fields)| {
            let token = *token;
            let write = RequirementWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                let record = self.api.create_requirement(&write).await?;
                Ok::<_, ProviderError>((token, record.id))
            }
        });
        let updates = plan.updates.iter().map(|(id, fields)| {
            let id = *id;
            let write = RequirementWrite {
                order_id,
                fields: fields.clone(),
            };
            async move {
                self.api.update_requirement(id, &write).await?;
                Ok::<_, ProviderError>(())
            }
        });

        // Removals wait for the writes to land, as the workshop phases do
        let (created, _) = try_join!(try_join_all(creates), try_join_all(updates))?;
        try_join_all(removed.iter().map(|id| self.api.delete_requirement(*id))).await?;
        Ok(created)
    }

    // 10. Saved data is stale everywhere it was cached
    fn invalidate_caches(&self, order_id: i64) {
        self.cache
            .invalidate(Resource::Orders, CacheScope::Record(order_id));
        self.cache.invalidate(Resource::Orders, CacheScope::List);
        self.cache
            .invalidate(Resource::OrderDetails, CacheScope::List);
        self.cache.invalidate(Resource::Payments, CacheScope::List);
    }
}

/// User-facing message for a failed save
fn save_failure_message(error: &SaveError) -> String {
    if error.is_version_conflict() {
        return "This order changed on the server. Reload it and try again.".to_string();
    }
    match error {
        SaveError::Validation(_) => error.to_string(),
        SaveError::Phase { source, .. } => format!("Order not saved: {source}"),
    }
}
