// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Service Layer
//!
//! # Mutation Pattern
//!
//! ```text
//! Command → Service → guard + pure builder → AssociationUpdate → Store (etag)
//!                                                                  ↓
//!                                                     classify → Notifications
//! ```
//!
//! # Transaction Semantics
//!
//! Each mutation:
//! 1. Loads the current record
//! 2. Checks the lifecycle guard and builds the update (pure)
//! 3. Applies it with the loaded etag, reloading and rebuilding on conflict
//!    up to `max_update_retries` attempts
//! 4. Classifies the action and dispatches notifications
//!
//! Notification failures never undo a committed mutation; they are returned
//! in the [`MutationOutcome`] report.
//!
//! # Read Pattern
//!
//! ```text
//! Store page → BatchKeys → batched directory lookups → enrichment → PagedList
//! ```

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AssociationsConfig;
use crate::context::RequestContext;
use crate::directory::{CompanyDirectory, UserDirectory};
use crate::domain::{Association, AssociationStatus, CompanyProfile, Subject, UserProfile};
use crate::errors::{AssociationError, AssociationResult};
use crate::notification::{
    classify, send_notification, send_to_all, DisplayValues, EmailBatch, FanOutFailure, FanOutReport,
    LifecycleAction, NotificationKind, NotificationProducer, RecipientRule,
};
use crate::page::PageRequest;
use crate::projection::invitations::{most_recent_invitations_page, resolve_invitations_page};
use crate::projection::previous_states::resolve_previous_states_page;
use crate::projection::{
    enrich_with_company, enrich_with_user, resolve_association_page, to_view, AssociationView,
    InvitationView, ListScope, PagedList, PreviousStateView,
};
use crate::state_machine::{
    check_acceptance_allowed, check_auth_code_confirmation_allowed, check_invitation_allowed,
    check_removal_allowed,
};
use crate::store::{AssociationFilter, AssociationStore};
use crate::update::{confirm_update, invitation_update, remove_update, AssociationUpdate};

/// Result of a committed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Association as stored after the mutation
    pub association: Association,
    /// Notification batch the action was classified into
    pub batch: EmailBatch,
    /// Delivery report of that batch
    pub notifications: FanOutReport,
}

/// Who is notified about a mutation and how they are named
struct NotificationTarget<'a> {
    company: &'a CompanyProfile,
    actor_display: String,
    subject_email: Option<String>,
    subject_display: String,
    subject_user_id: Option<String>,
}

/// Orchestrates the store, the directories and the notification producer
#[derive(Clone)]
pub struct AssociationService {
    store: Arc<dyn AssociationStore>,
    users: Arc<dyn UserDirectory>,
    companies: Arc<dyn CompanyDirectory>,
    producer: Arc<dyn NotificationProducer>,
    config: AssociationsConfig,
}

impl AssociationService {
    pub fn new(
        store: Arc<dyn AssociationStore>,
        users: Arc<dyn UserDirectory>,
        companies: Arc<dyn CompanyDirectory>,
        producer: Arc<dyn NotificationProducer>,
        config: AssociationsConfig,
    ) -> Self {
        Self {
            store,
            users,
            companies,
            producer,
            config,
        }
    }

    pub fn config(&self) -> &AssociationsConfig {
        &self.config
    }

    /// Invite `invitee_email` to be authorised for `company_number`
    ///
    /// Creates the association when none exists for the invitee, otherwise
    /// renews the invitation on the existing one.
    ///
    /// # Errors
    /// - InvalidInput for a blank email, a self invitation, or an already
    ///   confirmed invitee
    /// - NotFound when the company does not exist
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, company_number = %company_number))]
    pub async fn invite_user(
        &self,
        ctx: &RequestContext,
        company_number: &str,
        invitee_email: &str,
    ) -> AssociationResult<MutationOutcome> {
        if invitee_email.trim().is_empty() {
            return Err(AssociationError::InvalidInput(
                "invitee email must not be blank".to_string(),
            ));
        }

        let company = self.companies.get(company_number).await?;
        let invitee = self.users.search_by_email(invitee_email).await?;
        let invitee_id = invitee.as_ref().map(|user| user.user_id.as_str());

        if ctx.is_subject(invitee_id, Some(invitee_email)) {
            return Err(AssociationError::InvalidInput(
                "users cannot invite themselves".to_string(),
            ));
        }

        let actor = self.acting_profile(ctx).await?;
        let validity = self.config.invitation_validity();
        let existing = self
            .store
            .find_by_company_and_subject(company_number, invitee_id, Some(invitee_email))
            .await?;

        let (status_before, association) = match existing {
            None => {
                let subject = match &invitee {
                    Some(user) => Subject::UserId(user.user_id.clone()),
                    None => Subject::Email(invitee_email.to_string()),
                };
                let created = Association::invited(
                    company_number,
                    subject,
                    ctx.acting_user_id.as_str(),
                    ctx.now,
                    validity,
                )?;
                (AssociationStatus::AwaitingApproval, self.store.insert(created).await?)
            }
            Some(found) => {
                let (before, after) = self
                    .apply_with_retry(&found.id, |current| {
                        check_invitation_allowed(current.status()?)?;
                        let link = invitee.as_ref().filter(|_| !current.has_linked_user());
                        invitation_update(current, link, &ctx.acting_user_id, ctx.now, validity)
                    })
                    .await?;
                (before.status()?, after)
            }
        };

        info!(association_id = %association.id, "Invitation issued");

        let batch = classify(
            LifecycleAction::Invite,
            false,
            invitee.is_some(),
            status_before,
        );
        let target = NotificationTarget {
            company: &company,
            actor_display: actor.display_name_or_email().to_string(),
            subject_email: Some(invitee_email.to_string()),
            subject_display: invitee
                .as_ref()
                .map_or(invitee_email, |user| user.display_name_or_email())
                .to_string(),
            subject_user_id: invitee.as_ref().map(|user| user.user_id.clone()),
        };
        let notifications = self.dispatch(ctx, batch, &target).await;

        Ok(MutationOutcome {
            association,
            batch,
            notifications,
        })
    }

    /// Accept the invitation on `association_id` as its subject
    ///
    /// An email-only association becomes linked to the acting user.
    ///
    /// # Errors
    /// - InvalidInput when the caller is not the subject, the association is
    ///   not awaiting approval, or its invitation has expired
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, association_id = %association_id))]
    pub async fn confirm_association(
        &self,
        ctx: &RequestContext,
        association_id: &str,
    ) -> AssociationResult<MutationOutcome> {
        let stored = self.store.get(association_id).await?;
        if !ctx.is_subject(stored.user_id.as_deref(), stored.user_email.as_deref()) {
            return Err(AssociationError::InvalidInput(
                "only the invited user can accept an invitation".to_string(),
            ));
        }

        let company = self.companies.get(&stored.company_number).await?;
        let actor = self.acting_profile(ctx).await?;
        let validity = self.config.invitation_validity();

        let (before, association) = self
            .apply_with_retry(association_id, |current| {
                let status = current.status()?;
                check_acceptance_allowed(current, status, ctx.now, validity)?;
                let link = Some(&actor).filter(|_| !current.has_linked_user());
                confirm_update(current, link, &ctx.acting_user_id, ctx.now)
            })
            .await?;

        info!(association_id = %association.id, "Invitation accepted");

        let batch = classify(
            LifecycleAction::Accept,
            true,
            true,
            before.status()?,
        );
        let display = actor.display_name_or_email().to_string();
        let target = NotificationTarget {
            company: &company,
            actor_display: display.clone(),
            subject_email: Some(actor.email.clone()),
            subject_display: display,
            subject_user_id: Some(actor.user_id.clone()),
        };
        let notifications = self.dispatch(ctx, batch, &target).await;

        Ok(MutationOutcome {
            association,
            batch,
            notifications,
        })
    }

    /// Confirm the acting user for `company_number` with the company auth code
    ///
    /// The auth code itself is verified upstream.
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, company_number = %company_number))]
    pub async fn confirm_with_auth_code(
        &self,
        ctx: &RequestContext,
        company_number: &str,
    ) -> AssociationResult<MutationOutcome> {
        let company = self.companies.get(company_number).await?;
        let actor = self.acting_profile(ctx).await?;

        let existing = self
            .store
            .find_by_company_and_subject(
                company_number,
                Some(ctx.acting_user_id.as_str()),
                Some(ctx.acting_user_email.as_str()),
            )
            .await?;

        let (status_before, association) = match existing {
            None => {
                let created = Association::auth_code_confirmed(
                    company_number,
                    ctx.acting_user_id.as_str(),
                    ctx.now,
                );
                (AssociationStatus::AwaitingApproval, self.store.insert(created).await?)
            }
            Some(found) => {
                let (before, after) = self
                    .apply_with_retry(&found.id, |current| {
                        check_auth_code_confirmation_allowed(current.status()?)?;
                        let link = Some(&actor).filter(|_| !current.has_linked_user());
                        confirm_update(current, link, &ctx.acting_user_id, ctx.now)
                    })
                    .await?;
                (before.status()?, after)
            }
        };

        info!(association_id = %association.id, "Confirmed with auth code");

        let batch = classify(
            LifecycleAction::ConfirmWithAuthCode,
            true,
            true,
            status_before,
        );
        let display = actor.display_name_or_email().to_string();
        let target = NotificationTarget {
            company: &company,
            actor_display: display.clone(),
            subject_email: Some(actor.email.clone()),
            subject_display: display,
            subject_user_id: Some(actor.user_id.clone()),
        };
        let notifications = self.dispatch(ctx, batch, &target).await;

        Ok(MutationOutcome {
            association,
            batch,
            notifications,
        })
    }

    /// Remove, reject or cancel `association_id`
    ///
    /// # Errors
    /// - InvalidInput when the association is already removed
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, association_id = %association_id))]
    pub async fn remove_association(
        &self,
        ctx: &RequestContext,
        association_id: &str,
    ) -> AssociationResult<MutationOutcome> {
        let stored = self.store.get(association_id).await?;
        let company = self.companies.get(&stored.company_number).await?;
        let actor = self.acting_profile(ctx).await?;
        let subject = self.subject_profile(&stored).await?;

        let (before, association) = self
            .apply_with_retry(association_id, |current| {
                check_removal_allowed(current.status()?)?;
                remove_update(current, None, &ctx.acting_user_id, ctx.now)
            })
            .await?;

        info!(association_id = %association.id, "Association removed");

        let acting_is_subject =
            ctx.is_subject(before.user_id.as_deref(), before.user_email.as_deref());
        let batch = classify(
            LifecycleAction::Remove,
            acting_is_subject,
            before.has_linked_user(),
            before.status()?,
        );

        let subject_email = subject
            .as_ref()
            .map(|user| user.email.clone())
            .or_else(|| before.user_email.clone());
        let target = NotificationTarget {
            company: &company,
            actor_display: actor.display_name_or_email().to_string(),
            subject_display: subject
                .as_ref()
                .map(|user| user.display_name_or_email().to_string())
                .or_else(|| subject_email.clone())
                .unwrap_or_default(),
            subject_email,
            subject_user_id: before.user_id.clone(),
        };
        let notifications = self.dispatch(ctx, batch, &target).await;

        Ok(MutationOutcome {
            association,
            batch,
            notifications,
        })
    }

    /// One page of associations for `scope`, enriched with batched lookups
    ///
    /// `ListScope::User` lists the acting user's associations, matched by id
    /// or email. An empty `statuses` accepts every status.
    ///
    /// # Errors
    /// - InvalidInput for scopes that do not list associations
    /// - NotFound for a company scope naming an unknown company
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, page_index = page.page_index, items_per_page = page.items_per_page))]
    pub async fn list_associations(
        &self,
        ctx: &RequestContext,
        scope: ListScope,
        statuses: &[AssociationStatus],
        page: PageRequest,
    ) -> AssociationResult<PagedList<AssociationView>> {
        let filter = match &scope {
            ListScope::All => AssociationFilter::all(),
            ListScope::Company(number) => {
                self.companies.get(number).await?;
                AssociationFilter::for_company(number.as_str())
            }
            ListScope::User => AssociationFilter::for_user(
                ctx.acting_user_id.as_str(),
                ctx.acting_user_email.as_str(),
            ),
            other => {
                return Err(AssociationError::InvalidInput(format!(
                    "{} does not list associations",
                    other.base_path()
                )))
            }
        }
        .with_statuses(statuses.iter().copied());

        let stored = self.store.find_page(&filter, page).await?;
        resolve_association_page(stored, &scope, self.users.as_ref(), self.companies.as_ref())
            .await
    }

    /// One association with its user and company details
    pub async fn get_association(&self, association_id: &str) -> AssociationResult<AssociationView> {
        let association = self.store.get(association_id).await?;
        let view = to_view(&association)?;
        let view = enrich_with_company(view, None, self.companies.as_ref()).await?;
        enrich_with_user(view, None, self.users.as_ref()).await
    }

    /// Invitations of one association, in the order they were issued
    pub async fn invitations_for_association(
        &self,
        ctx: &RequestContext,
        association_id: &str,
        page: PageRequest,
    ) -> AssociationResult<PagedList<InvitationView>> {
        let association = self.store.get(association_id).await?;
        resolve_invitations_page(
            &association,
            self.users.as_ref(),
            page,
            ctx.now,
            self.config.invitation_validity(),
        )
        .await
    }

    /// Outstanding invitations addressed to the acting user, latest expiry first
    pub async fn active_invitations_for_user(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AssociationResult<PagedList<InvitationView>> {
        let validity = self.config.invitation_validity();
        let filter = AssociationFilter::for_user(
            ctx.acting_user_id.as_str(),
            ctx.acting_user_email.as_str(),
        )
        .with_statuses([AssociationStatus::AwaitingApproval]);

        let pending: Vec<Association> = self
            .store
            .find_all(&filter)
            .await?
            .into_iter()
            .filter(|association| {
                association
                    .most_recent_invitation()
                    .is_some_and(|invitation| invitation.is_active(ctx.now, validity))
            })
            .collect();

        most_recent_invitations_page(&pending, self.users.as_ref(), page, ctx.now, validity).await
    }

    /// Audit trail of one association, most recent change first
    pub async fn previous_states_for_association(
        &self,
        association_id: &str,
        page: PageRequest,
    ) -> AssociationResult<PagedList<PreviousStateView>> {
        let association = self.store.get(association_id).await?;
        resolve_previous_states_page(&association, self.users.as_ref(), page).await
    }

    /// Load, build and apply with the loaded etag, retrying on conflict
    ///
    /// Returns the record the winning update was built from and the stored result.
    async fn apply_with_retry<F>(
        &self,
        association_id: &str,
        build: F,
    ) -> AssociationResult<(Association, Association)>
    where
        F: Fn(&Association) -> AssociationResult<AssociationUpdate>,
    {
        let attempts = self.config.max_update_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let current = self.store.get(association_id).await?;
            let update = build(&current)?;

            match self
                .store
                .apply_update(association_id, &update, &current.etag)
                .await
            {
                Ok(updated) => return Ok((current, updated)),
                Err(err) if err.is_conflict() && attempt < attempts => {
                    warn!(
                        association_id = %association_id,
                        attempt,
                        "Etag conflict, reloading"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn acting_profile(&self, ctx: &RequestContext) -> AssociationResult<UserProfile> {
        self.users.get(&ctx.acting_user_id).await
    }

    /// Profile of a linked subject; a user the directory no longer knows yields `None`
    async fn subject_profile(&self, association: &Association) -> AssociationResult<Option<UserProfile>> {
        match association.user_id.as_deref() {
            Some(user_id) => match self.users.get(user_id).await {
                Ok(user) => Ok(Some(user)),
                Err(AssociationError::NotFound { .. }) => Ok(None),
                Err(err) => Err(err),
            },
            None => Ok(None),
        }
    }

    /// Send every notification of `batch`, collecting failures
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        batch: EmailBatch,
        target: &NotificationTarget<'_>,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        if batch == EmailBatch::None {
            return report;
        }

        let values = DisplayValues::new(target.company.company_name.as_str())
            .with_actor(target.actor_display.as_str())
            .with_subject(target.subject_display.as_str())
            .with_request_id(ctx.request_id.as_str());

        let colleagues = if batch.needs_company_users() {
            match self.colleague_ids(ctx, target).await {
                Ok(ids) => ids,
                Err(error) => {
                    warn!(error = %error, "Could not list company users to notify");
                    report.failures.push(FanOutFailure {
                        recipient: None,
                        error,
                    });
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        for (kind, rule) in batch.notifications() {
            match rule {
                RecipientRule::ActingUser => {
                    report.absorb(
                        self.send_single(*kind, Some(ctx.acting_user_email.as_str()), &values)
                            .await,
                    );
                }
                RecipientRule::Subject => {
                    report.absorb(
                        self.send_single(*kind, target.subject_email.as_deref(), &values)
                            .await,
                    );
                }
                RecipientRule::OtherConfirmedUsers => {
                    let fetches: Vec<BoxFuture<'_, AssociationResult<UserProfile>>> = colleagues
                        .iter()
                        .map(|user_id| self.users.get(user_id))
                        .collect();
                    report.absorb(send_to_all(self.producer.as_ref(), *kind, fetches, &values).await);
                }
            }
        }

        info!(
            request_id = %ctx.request_id,
            batch = ?batch,
            sent = report.sent.len(),
            failed = report.failures.len(),
            "Notifications dispatched"
        );
        report
    }

    async fn send_single(
        &self,
        kind: NotificationKind,
        recipient: Option<&str>,
        values: &DisplayValues,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();
        let recipient = recipient.unwrap_or_default();

        match send_notification(self.producer.as_ref(), kind, recipient, values).await {
            Ok(()) => report.sent.push(recipient.to_string()),
            Err(error) => {
                warn!(message_type = kind.message_type(), error = %error, "Notification send failed");
                report.failures.push(FanOutFailure {
                    recipient: Some(recipient.to_string()).filter(|r| !r.is_empty()),
                    error,
                });
            }
        }
        report
    }

    /// Confirmed users of the company other than the actor and the subject
    async fn colleague_ids(
        &self,
        ctx: &RequestContext,
        target: &NotificationTarget<'_>,
    ) -> AssociationResult<Vec<String>> {
        let filter = AssociationFilter::for_company(target.company.company_number.as_str())
            .with_statuses([AssociationStatus::Confirmed]);
        let request = PageRequest {
            page_index: 0,
            items_per_page: self.config.company_fanout_limit.max(1),
        };

        let confirmed = self.store.find_page(&filter, request).await?;
        Ok(confirmed
            .content
            .into_iter()
            .filter_map(|association| association.user_id)
            .filter(|user_id| {
                *user_id != ctx.acting_user_id && Some(user_id) != target.subject_user_id.as_ref()
            })
            .collect())
    }
}
