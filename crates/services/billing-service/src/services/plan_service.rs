//! Plan service - Catalogue management and model access grants.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{Group, NewPlan, PlanChanges, SubscriptionPlan};

use super::membership;
use crate::infra::UnitOfWork;

/// Plan service trait for dependency injection.
#[async_trait]
pub trait PlanService: Send + Sync {
    async fn get_plan(&self, id: Uuid) -> AppResult<SubscriptionPlan>;

    /// Plans open for purchase
    async fn list_active_plans(&self) -> AppResult<Vec<SubscriptionPlan>>;

    /// Every plan, including retired ones
    async fn list_all_plans(&self) -> AppResult<Vec<SubscriptionPlan>>;

    /// Create a plan together with its group and model grants
    async fn create_plan(&self, plan: NewPlan, actor_id: Uuid) -> AppResult<SubscriptionPlan>;

    /// Partial update. A new model list moves the group's grants along.
    async fn update_plan(
        &self,
        id: Uuid,
        changes: PlanChanges,
        actor_id: Uuid,
    ) -> AppResult<SubscriptionPlan>;

    /// Delete a plan, its group and the grants the group held
    async fn delete_plan(&self, id: Uuid) -> AppResult<()>;

    async fn add_user_to_plan(&self, plan_id: Uuid, user_id: Uuid) -> AppResult<SubscriptionPlan>;

    async fn remove_user_from_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SubscriptionPlan>;
}

/// Concrete implementation of PlanService using Unit of Work.
pub struct PlanManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PlanManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PlanService for PlanManager<U> {
    async fn get_plan(&self, id: Uuid) -> AppResult<SubscriptionPlan> {
        self.uow.repos().plans().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_active_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        self.uow.repos().plans().list_active().await
    }

    async fn list_all_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        self.uow.repos().plans().list_all().await
    }

    async fn create_plan(&self, form: NewPlan, actor_id: Uuid) -> AppResult<SubscriptionPlan> {
        form.duration_type.period(form.plan_duration)?;

        let plan = self
            .uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let group = repos
                        .groups()
                        .create(Group::for_plan(&form.plan_name, actor_id))
                        .await?;
                    let plan = repos
                        .plans()
                        .create(SubscriptionPlan::new(form, Some(group.id)))
                        .await?;

                    membership::grant_models(repos, group.id, &plan.models, actor_id).await?;
                    Ok(plan)
                })
            })
            .await?;

        tracing::info!(plan_id = %plan.id, plan_name = %plan.plan_name, "Plan created");
        Ok(plan)
    }

    async fn update_plan(
        &self,
        id: Uuid,
        changes: PlanChanges,
        actor_id: Uuid,
    ) -> AppResult<SubscriptionPlan> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let mut plan = repos.plans().find_by_id(id).await?.ok_or_not_found()?;

                    if let Some(models) = changes.models.as_deref() {
                        let group_id =
                            membership::ensure_plan_group(repos, &mut plan, actor_id).await?;
                        let dropped = plan.dropped_models(models);

                        membership::revoke_models(repos, group_id, &dropped).await?;
                        membership::grant_models(repos, group_id, models, actor_id).await?;
                    }

                    plan.apply(changes);
                    plan.period()?;
                    repos.plans().update(plan).await
                })
            })
            .await
    }

    async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let plan = repos.plans().find_by_id(id).await?.ok_or_not_found()?;

                    if let Some(group_id) = plan.group_id {
                        membership::revoke_models(repos, group_id, &plan.models).await?;
                        match repos.groups().delete(group_id).await {
                            Ok(()) | Err(AppError::NotFound) => {}
                            Err(e) => return Err(e),
                        }
                    }

                    repos.plans().delete(plan.id).await
                })
            })
            .await?;

        tracing::info!(plan_id = %id, "Plan deleted");
        Ok(())
    }

    async fn add_user_to_plan(&self, plan_id: Uuid, user_id: Uuid) -> AppResult<SubscriptionPlan> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let mut plan = repos.plans().find_by_id(plan_id).await?.ok_or_not_found()?;

                    if !plan.add_user(user_id) {
                        return Ok(plan);
                    }
                    repos.plans().update(plan).await
                })
            })
            .await
    }

    async fn remove_user_from_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SubscriptionPlan> {
        self.uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let mut plan = repos.plans().find_by_id(plan_id).await?.ok_or_not_found()?;

                    if !plan.remove_user(user_id) {
                        return Ok(plan);
                    }
                    repos.plans().update(plan).await
                })
            })
            .await
    }
}
