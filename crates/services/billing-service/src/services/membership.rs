//! Plan membership and model access bookkeeping.
//!
//! Shared by the plan, subscription and auth services. Every function takes
//! the repositories of the surrounding transaction.

use chrono::Utc;
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{
    membership_change, AiModel, Group, MembershipChange, SubscriptionChanges, SubscriptionPlan,
    SubscriptionStatus, UserSubscription,
};

use crate::infra::Repositories;

/// Add a subscriber to the plan user list and to the plan group.
pub async fn enroll(
    repos: &dyn Repositories,
    plan: &mut SubscriptionPlan,
    user_id: Uuid,
) -> AppResult<()> {
    if plan.add_user(user_id) {
        *plan = repos.plans().update(plan.clone()).await?;
    }

    let Some(group_id) = plan.group_id else {
        return Ok(());
    };
    match repos.groups().find_by_id(group_id).await? {
        Some(mut group) => {
            if group.add_member(user_id) {
                repos.groups().update(group).await?;
            }
        }
        None => tracing::warn!(
            plan_id = %plan.id,
            group_id = %group_id,
            "Plan group does not exist, skipping group membership"
        ),
    }
    Ok(())
}

/// Remove a subscriber from the plan user list and from the plan group.
pub async fn withdraw(
    repos: &dyn Repositories,
    plan: &mut SubscriptionPlan,
    user_id: Uuid,
) -> AppResult<()> {
    if plan.remove_user(user_id) {
        *plan = repos.plans().update(plan.clone()).await?;
    }

    let Some(group_id) = plan.group_id else {
        return Ok(());
    };
    if let Some(mut group) = repos.groups().find_by_id(group_id).await? {
        if group.remove_member(user_id) {
            repos.groups().update(group).await?;
        }
    }
    Ok(())
}

/// Return the plan group ID, creating the group when it is missing.
///
/// A recreated group starts with the plan's current subscribers. The caller
/// persists the plan when its `group_id` changed.
pub async fn ensure_plan_group(
    repos: &dyn Repositories,
    plan: &mut SubscriptionPlan,
    owner_id: Uuid,
) -> AppResult<Uuid> {
    if let Some(group_id) = plan.group_id {
        if repos.groups().find_by_id(group_id).await?.is_some() {
            return Ok(group_id);
        }
        tracing::warn!(plan_id = %plan.id, group_id = %group_id, "Plan group missing, recreating");
    }

    let mut group = Group::for_plan(&plan.plan_name, owner_id);
    group.user_ids = plan.users.clone();
    let group = repos.groups().create(group).await?;

    plan.group_id = Some(group.id);
    Ok(group.id)
}

/// Grant a group read access to models, creating placeholders for unknown IDs.
pub async fn grant_models(
    repos: &dyn Repositories,
    group_id: Uuid,
    model_ids: &[String],
    owner_id: Uuid,
) -> AppResult<()> {
    for model_id in model_ids {
        match repos.models().find_by_id(model_id).await? {
            Some(mut model) => {
                if model.grant_group(group_id) {
                    repos.models().update(model).await?;
                }
            }
            None => {
                tracing::info!(model_id = %model_id, "Creating placeholder model");
                let mut model = AiModel::placeholder(model_id, owner_id);
                model.grant_group(group_id);
                repos.models().create(model).await?;
            }
        }
    }
    Ok(())
}

/// Revoke a group's read access. Unknown models are skipped.
pub async fn revoke_models(
    repos: &dyn Repositories,
    group_id: Uuid,
    model_ids: &[String],
) -> AppResult<()> {
    for model_id in model_ids {
        if let Some(mut model) = repos.models().find_by_id(model_id).await? {
            if model.revoke_group(group_id) {
                repos.models().update(model).await?;
            }
        }
    }
    Ok(())
}

/// Create a pending subscription and enroll the user in its plan.
pub async fn start_subscription(
    repos: &dyn Repositories,
    user_id: Uuid,
    plan_id: Uuid,
    payment_id: Option<String>,
    payment_method: Option<String>,
) -> AppResult<UserSubscription> {
    let mut plan = repos.plans().find_by_id(plan_id).await?.ok_or_not_found()?;

    let subscription = repos
        .subscriptions()
        .create(UserSubscription::pending(
            user_id,
            plan_id,
            payment_id,
            payment_method,
        ))
        .await?;

    enroll(repos, &mut plan, user_id).await?;
    stamp_user(repos, &subscription).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        user_id = %user_id,
        plan_id = %plan_id,
        "Subscription created"
    );
    Ok(subscription)
}

/// Record a verified payment and start the billing period now.
pub async fn activate_subscription(
    repos: &dyn Repositories,
    subscription_id: Uuid,
    payment_id: String,
    payment_method: String,
) -> AppResult<UserSubscription> {
    let mut subscription = repos
        .subscriptions()
        .find_by_id(subscription_id)
        .await?
        .ok_or_not_found()?;
    let mut plan = repos
        .plans()
        .find_by_id(subscription.plan_id)
        .await?
        .ok_or_not_found()?;

    subscription.activate(payment_id, payment_method, plan.period()?, Utc::now())?;
    let subscription = repos.subscriptions().update(subscription).await?;

    enroll(repos, &mut plan, subscription.user_id).await?;
    stamp_user(repos, &subscription).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        end_date = ?subscription.end_date,
        "Subscription activated"
    );
    Ok(subscription)
}

/// Apply an admin change and keep plan membership in step with the status.
pub async fn change_subscription(
    repos: &dyn Repositories,
    subscription_id: Uuid,
    changes: SubscriptionChanges,
) -> AppResult<UserSubscription> {
    let subscription = repos
        .subscriptions()
        .find_by_id(subscription_id)
        .await?
        .ok_or_not_found()?;

    apply_change(repos, subscription, changes).await
}

async fn apply_change(
    repos: &dyn Repositories,
    mut subscription: UserSubscription,
    changes: SubscriptionChanges,
) -> AppResult<UserSubscription> {
    let previous = subscription.apply(changes);
    let subscription = repos.subscriptions().update(subscription).await?;

    if previous != subscription.status {
        stamp_user(repos, &subscription).await?;
        sync_membership(repos, &subscription, previous).await?;
    }
    Ok(subscription)
}

/// Mark an overdue subscription expired and revoke its membership.
///
/// The row is re-read under lock. Returns `None` when it is no longer
/// overdue, for example after an admin extended it.
pub async fn expire_subscription(
    repos: &dyn Repositories,
    subscription_id: Uuid,
) -> AppResult<Option<UserSubscription>> {
    let current = repos
        .subscriptions()
        .find_by_id(subscription_id)
        .await?
        .ok_or_not_found()?;
    if !current.is_overdue(Utc::now()) {
        tracing::debug!(subscription_id = %subscription_id, "Subscription no longer overdue");
        return Ok(None);
    }

    let expired = apply_change(
        repos,
        current,
        SubscriptionChanges {
            status: Some(SubscriptionStatus::Expired),
            ..Default::default()
        },
    )
    .await?;
    Ok(Some(expired))
}

async fn sync_membership(
    repos: &dyn Repositories,
    subscription: &UserSubscription,
    previous: SubscriptionStatus,
) -> AppResult<()> {
    let change = membership_change(previous, subscription.status);
    if change == MembershipChange::Keep {
        return Ok(());
    }

    let Some(mut plan) = repos.plans().find_by_id(subscription.plan_id).await? else {
        tracing::warn!(plan_id = %subscription.plan_id, "Subscription plan no longer exists");
        return Ok(());
    };

    match change {
        MembershipChange::Grant => enroll(repos, &mut plan, subscription.user_id).await,
        MembershipChange::Revoke => withdraw(repos, &mut plan, subscription.user_id).await,
        MembershipChange::Keep => Ok(()),
    }
}

/// Mirror the subscription onto the user row.
async fn stamp_user(repos: &dyn Repositories, subscription: &UserSubscription) -> AppResult<()> {
    let Some(mut user) = repos.users().find_by_id(subscription.user_id).await? else {
        tracing::warn!(user_id = %subscription.user_id, "Subscriber has no user record");
        return Ok(());
    };

    user.set_subscription(subscription.id, subscription.status);
    repos.users().update(user).await?;
    Ok(())
}
