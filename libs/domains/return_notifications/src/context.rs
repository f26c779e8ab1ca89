//! Validation of incoming events and assembly of the notification context.

use crate::differences::describe_differences;
use crate::error::{ContextField, EntityKind, NotificationError, NotificationResult};
use crate::models::{Client, Employee, NotificationContext, NotificationEvent, NotificationType, Reseller};
use crate::repository::{ReferenceRepository, StatusNames};
use crate::templates::Localizer;
use tracing::{debug, instrument};

/// Required context fields in the order they are checked. Each entry says
/// whether the field is present (non-zero, non-empty).
const REQUIRED_FIELDS: [(ContextField, fn(&NotificationContext) -> bool); 11] = [
    (ContextField::ComplaintId, |c| c.complaint_id != 0),
    (ContextField::ComplaintNumber, |c| !c.complaint_number.is_empty()),
    (ContextField::CreatorId, |c| c.creator_id != 0),
    (ContextField::CreatorName, |c| !c.creator_name.is_empty()),
    (ContextField::ExpertId, |c| c.expert_id != 0),
    (ContextField::ExpertName, |c| !c.expert_name.is_empty()),
    (ContextField::ClientId, |c| c.client_id != 0),
    (ContextField::ConsumptionId, |c| c.consumption_id != 0),
    (ContextField::ConsumptionNumber, |c| !c.consumption_number.is_empty()),
    (ContextField::AgreementNumber, |c| !c.agreement_number.is_empty()),
    (ContextField::Date, |c| !c.date.is_empty()),
];

/// Reference records an event points at. All of them must exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntities {
    pub reseller: Reseller,
    pub creator: Employee,
    pub expert: Employee,
    pub client: Client,
}

/// Check the fields needed before any lookup can happen.
pub fn validate_event(event: &NotificationEvent) -> NotificationResult<NotificationType> {
    let notification_type = NotificationType::from_code(event.notification_type)
        .ok_or(NotificationError::InvalidInput("notificationType"))?;

    if event.reseller_id == 0 {
        return Err(NotificationError::InvalidInput("resellerId"));
    }

    Ok(notification_type)
}

/// Fail on the first required field that is empty.
pub fn validate_required_fields(context: &NotificationContext) -> NotificationResult<()> {
    match REQUIRED_FIELDS.iter().find(|(_, present)| !present(context)) {
        Some((field, _)) => Err(NotificationError::MissingTemplateField(*field)),
        None => Ok(()),
    }
}

/// Builds a [`NotificationContext`] out of a validated event.
pub struct ContextBuilder<'a> {
    references: &'a dyn ReferenceRepository,
    localizer: &'a dyn Localizer,
    statuses: &'a dyn StatusNames,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        references: &'a dyn ReferenceRepository,
        localizer: &'a dyn Localizer,
        statuses: &'a dyn StatusNames,
    ) -> Self {
        Self {
            references,
            localizer,
            statuses,
        }
    }

    /// Look up reseller, creator, expert and client, in that order.
    pub async fn resolve_entities(
        &self,
        event: &NotificationEvent,
    ) -> NotificationResult<ResolvedEntities> {
        let reseller = self
            .references
            .find_reseller(event.reseller_id)
            .await
            .ok_or(NotificationError::EntityNotFound(EntityKind::Seller))?;

        let creator = self
            .references
            .find_employee(event.creator_id)
            .await
            .ok_or(NotificationError::EntityNotFound(EntityKind::Creator))?;

        let expert = self
            .references
            .find_employee(event.expert_id)
            .await
            .ok_or(NotificationError::EntityNotFound(EntityKind::Expert))?;

        let client = self
            .references
            .find_client(event.client_id)
            .await
            .ok_or(NotificationError::EntityNotFound(EntityKind::Client))?;

        Ok(ResolvedEntities {
            reseller,
            creator,
            expert,
            client,
        })
    }

    /// Resolve entities, validate the required fields and compute the
    /// difference text.
    #[instrument(
        skip_all,
        fields(reseller_id = event.reseller_id, complaint_id = event.complaint_id)
    )]
    pub async fn build(
        &self,
        notification_type: NotificationType,
        event: &NotificationEvent,
    ) -> NotificationResult<NotificationContext> {
        let entities = self.resolve_entities(event).await?;

        let mut context = NotificationContext {
            complaint_id: event.complaint_id,
            complaint_number: event.complaint_number.clone(),
            creator_id: event.creator_id,
            creator_name: entities.creator.full_name,
            expert_id: event.expert_id,
            expert_name: entities.expert.full_name,
            client_id: event.client_id,
            consumption_id: event.consumption_id,
            consumption_number: event.consumption_number.clone(),
            agreement_number: event.agreement_number.clone(),
            date: event.date.clone(),
            differences: String::new(),
            client_name: entities.client.display_name().to_string(),
            client_email: entities.client.email,
            client_mobile: entities.client.mobile,
        };

        validate_required_fields(&context)?;

        if let Some(diff) = event.differences.filter(|d| d.is_complete()) {
            context.differences = describe_differences(
                self.localizer,
                self.statuses,
                notification_type,
                entities.reseller.id,
                diff.from,
                diff.to,
            );
        }

        debug!(
            client_id = context.client_id,
            has_email = !context.client_email.is_empty(),
            has_mobile = !context.client_mobile.is_empty(),
            "Notification context built"
        );

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Differences;
    use crate::repository::{MockReferenceRepository, MockStatusNames};
    use crate::templates::{MockLocalizer, POSITION_STATUS_CHANGED};
    use mockall::predicate::eq;
    use serde_json::json;

    fn event() -> NotificationEvent {
        NotificationEvent {
            notification_type: 2,
            reseller_id: 10,
            complaint_id: 501,
            complaint_number: "C-501".to_string(),
            creator_id: 3,
            expert_id: 4,
            client_id: 77,
            consumption_id: 900,
            consumption_number: "K-900".to_string(),
            agreement_number: "AG/1".to_string(),
            date: "2024-03-01".to_string(),
            differences: None,
        }
    }

    fn employee(id: i64, name: &str) -> Employee {
        Employee {
            id,
            full_name: name.to_string(),
            email: String::new(),
        }
    }

    fn client() -> Client {
        Client {
            id: 77,
            name: "ivanov".to_string(),
            full_name: String::new(),
            email: "ivanov@mail.test".to_string(),
            mobile: String::new(),
        }
    }

    fn references() -> MockReferenceRepository {
        let mut repo = MockReferenceRepository::new();
        repo.expect_find_reseller().returning(|id| {
            Some(Reseller {
                id,
                name: "North".to_string(),
                sender_email: None,
                locale: None,
            })
        });
        repo.expect_find_employee().returning(|id| match id {
            3 => Some(employee(3, "Olga Petrova")),
            4 => Some(employee(4, "Ivan Sidorov")),
            _ => None,
        });
        repo.expect_find_client()
            .with(eq(77))
            .returning(|_| Some(client()));
        repo
    }

    fn quiet_localizer() -> MockLocalizer {
        let mut localizer = MockLocalizer::new();
        localizer.expect_translate().never();
        localizer
    }

    #[test]
    fn test_validate_event_requires_type_then_reseller() {
        let mut e = event();
        e.notification_type = 0;
        e.reseller_id = 0;
        assert!(matches!(
            validate_event(&e),
            Err(NotificationError::InvalidInput("notificationType"))
        ));

        e.notification_type = 1;
        assert!(matches!(
            validate_event(&e),
            Err(NotificationError::InvalidInput("resellerId"))
        ));

        e.reseller_id = 10;
        assert_eq!(validate_event(&e).unwrap(), NotificationType::New);
    }

    #[tokio::test]
    async fn test_build_full_context() {
        let repo = references();
        let localizer = quiet_localizer();
        let statuses = MockStatusNames::new();
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);

        let context = builder.build(NotificationType::Change, &event()).await.unwrap();

        assert_eq!(context.complaint_id, 501);
        assert_eq!(context.creator_name, "Olga Petrova");
        assert_eq!(context.expert_name, "Ivan Sidorov");
        assert_eq!(context.client_name, "ivanov");
        assert_eq!(context.client_email, "ivanov@mail.test");
        assert_eq!(context.client_mobile, "");
        assert_eq!(context.differences, "");
    }

    #[tokio::test]
    async fn test_entity_not_found_names_the_entity() {
        let cases: [(fn(&mut NotificationEvent), EntityKind); 2] = [
            (|e| e.creator_id = 99, EntityKind::Creator),
            (|e| e.expert_id = 99, EntityKind::Expert),
        ];

        for (mutate, expected) in cases {
            let repo = references();
            let localizer = quiet_localizer();
            let statuses = MockStatusNames::new();
            let builder = ContextBuilder::new(&repo, &localizer, &statuses);

            let mut e = event();
            mutate(&mut e);
            let err = builder.build(NotificationType::New, &e).await.unwrap_err();
            assert!(
                matches!(err, NotificationError::EntityNotFound(kind) if kind == expected),
                "unexpected error: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_seller_and_client() {
        let mut repo = MockReferenceRepository::new();
        repo.expect_find_reseller().returning(|_| None);
        repo.expect_find_employee().never();
        let localizer = quiet_localizer();
        let statuses = MockStatusNames::new();
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);
        let err = builder.build(NotificationType::New, &event()).await.unwrap_err();
        assert!(matches!(err, NotificationError::EntityNotFound(EntityKind::Seller)));

        let mut e = event();
        e.client_id = 5;
        let mut repo = MockReferenceRepository::new();
        repo.expect_find_reseller().returning(|id| {
            Some(Reseller {
                id,
                name: "North".to_string(),
                sender_email: None,
                locale: None,
            })
        });
        repo.expect_find_employee()
            .returning(|id| Some(employee(id, "Someone")));
        repo.expect_find_client().returning(|_| None);
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);
        let err = builder.build(NotificationType::New, &e).await.unwrap_err();
        assert!(matches!(err, NotificationError::EntityNotFound(EntityKind::Client)));
    }

    #[tokio::test]
    async fn test_missing_template_field_in_fixed_order() {
        let cases: [(fn(&mut NotificationEvent), ContextField); 8] = [
            (|e| e.complaint_id = 0, ContextField::ComplaintId),
            (|e| e.complaint_number.clear(), ContextField::ComplaintNumber),
            (|e| e.consumption_id = 0, ContextField::ConsumptionId),
            (|e| e.consumption_number.clear(), ContextField::ConsumptionNumber),
            (|e| e.agreement_number.clear(), ContextField::AgreementNumber),
            (|e| e.date.clear(), ContextField::Date),
            // Earlier fields win when several are empty.
            (
                |e| {
                    e.date.clear();
                    e.complaint_number.clear();
                },
                ContextField::ComplaintNumber,
            ),
            (
                |e| {
                    e.agreement_number.clear();
                    e.consumption_id = 0;
                },
                ContextField::ConsumptionId,
            ),
        ];

        for (mutate, expected) in cases {
            let repo = references();
            let localizer = quiet_localizer();
            let statuses = MockStatusNames::new();
            let builder = ContextBuilder::new(&repo, &localizer, &statuses);

            let mut e = event();
            mutate(&mut e);
            let err = builder.build(NotificationType::Change, &e).await.unwrap_err();
            assert!(
                matches!(err, NotificationError::MissingTemplateField(field) if field == expected),
                "expected {expected}, got {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_employee_name_is_missing_field() {
        let mut repo = MockReferenceRepository::new();
        repo.expect_find_reseller().returning(|id| {
            Some(Reseller {
                id,
                name: "North".to_string(),
                sender_email: None,
                locale: None,
            })
        });
        repo.expect_find_employee().returning(|id| match id {
            3 => Some(employee(3, "Olga Petrova")),
            _ => Some(employee(id, "")),
        });
        repo.expect_find_client().returning(|_| Some(client()));
        let localizer = quiet_localizer();
        let statuses = MockStatusNames::new();
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);

        let err = builder.build(NotificationType::Change, &event()).await.unwrap_err();
        assert!(matches!(
            err,
            NotificationError::MissingTemplateField(ContextField::ExpertName)
        ));
    }

    #[tokio::test]
    async fn test_differences_computed_only_when_complete() {
        let repo = references();
        let mut localizer = MockLocalizer::new();
        localizer
            .expect_translate()
            .with(
                eq(POSITION_STATUS_CHANGED),
                eq(json!({ "FROM": "Accepted", "TO": "Rejected" })),
                eq(10),
            )
            .times(1)
            .returning(|_, _, _| "Accepted -> Rejected".to_string());
        let mut statuses = MockStatusNames::new();
        statuses.expect_status_name().with(eq(1)).return_const("Accepted".to_string());
        statuses.expect_status_name().with(eq(2)).return_const("Rejected".to_string());
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);

        let mut e = event();
        e.differences = Some(Differences { from: 1, to: 2 });
        let context = builder.build(NotificationType::Change, &e).await.unwrap();
        assert_eq!(context.differences, "Accepted -> Rejected");

        // Only a target status: no description, and no localizer call.
        e.differences = Some(Differences { from: 0, to: 2 });
        let context = builder.build(NotificationType::Change, &e).await.unwrap();
        assert_eq!(context.differences, "");
    }

    #[tokio::test]
    async fn test_client_full_name_preferred() {
        let mut repo = MockReferenceRepository::new();
        repo.expect_find_reseller().returning(|id| {
            Some(Reseller {
                id,
                name: "North".to_string(),
                sender_email: None,
                locale: None,
            })
        });
        repo.expect_find_employee()
            .returning(|id| Some(employee(id, "Someone")));
        repo.expect_find_client().returning(|_| {
            Some(Client {
                full_name: "Ivanov Petr".to_string(),
                mobile: "+79990000000".to_string(),
                ..client()
            })
        });
        let localizer = quiet_localizer();
        let statuses = MockStatusNames::new();
        let builder = ContextBuilder::new(&repo, &localizer, &statuses);

        let context = builder.build(NotificationType::New, &event()).await.unwrap();
        assert_eq!(context.client_name, "Ivanov Petr");
        assert_eq!(context.client_mobile, "+79990000000");
    }
}
