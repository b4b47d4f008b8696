//! Serde roundtrip and JsonSchema validation tests for all entity types.

use chrono::{Duration, Utc};
use dindinho_core::audit_detail::{AccountUpdatedDetail, AutoLinkInviteDetail, InviteCreatedDetail};
use dindinho_core::entities::*;
use dindinho_core::enums::*;
use dindinho_core::responses::*;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    user_roundtrip,
    User,
    User {
        id: "usr-a3f8b2c1".into(),
        name: "Maria Souza".into(),
        email: "maria@example.com".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    credit_account_roundtrip,
    Account,
    Account {
        id: "acc-00ff11aa".into(),
        owner_id: "usr-a3f8b2c1".into(),
        name: "Cartão Nubank".into(),
        account_type: AccountType::Credit,
        color: Some("#8a05be".into()),
        icon: None,
        closing_day: Some(3),
        due_day: Some(10),
        limit: Some(5000.0),
        brand: Some("Mastercard".into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    invite_roundtrip,
    Invite,
    Invite {
        id: "inv-12345678".into(),
        sender_id: "usr-a3f8b2c1".into(),
        email: "joao@example.com".into(),
        status: InviteStatus::Pending,
        expires_at: Utc::now() + Duration::days(7),
        accounts: vec![InviteAccount {
            account_id: "acc-00ff11aa".into(),
            permission: Permission::Editor,
        }],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    account_access_roundtrip,
    AccountAccess,
    AccountAccess {
        account_id: "acc-00ff11aa".into(),
        user_id: "usr-deadbeef".into(),
        permission: Permission::Viewer,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    audit_entry_roundtrip,
    AuditEntry,
    AuditEntry {
        id: "aud-0badc0de".into(),
        user_id: "usr-deadbeef".into(),
        action: AuditAction::AutoLinkInvite,
        resource_type: ResourceType::Account,
        resource_id: "acc-00ff11aa".into(),
        details: Some(
            serde_json::to_value(AutoLinkInviteDetail::signup("inv-12345678", Permission::Viewer))
                .unwrap()
        ),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    auto_link_detail_roundtrip,
    AutoLinkInviteDetail,
    AutoLinkInviteDetail::signup("inv-12345678", Permission::Owner)
);

roundtrip_and_validate!(
    invite_created_detail_roundtrip,
    InviteCreatedDetail,
    InviteCreatedDetail {
        email: "joao@example.com".into(),
        account_ids: vec!["acc-00ff11aa".into()],
    }
);

roundtrip_and_validate!(
    account_updated_detail_roundtrip,
    AccountUpdatedDetail,
    AccountUpdatedDetail {
        fields: vec!["name".into(), "limit".into()],
    }
);

roundtrip_and_validate!(
    health_response_roundtrip,
    HealthResponse,
    HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now().to_rfc3339(),
        app: "dindinho-api".into(),
    }
);

roundtrip_and_validate!(
    error_envelope_roundtrip,
    ApiErrorEnvelope,
    ApiErrorEnvelope::new(409, "CONFLICT", "E-mail já cadastrado")
);

#[test]
fn auto_link_detail_uses_camel_case_keys() {
    let json = serde_json::to_value(AutoLinkInviteDetail::signup("inv-1", Permission::Editor)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "inviteId": "inv-1",
            "permission": "EDITOR",
            "reason": "signup_auto_link"
        })
    );
}

#[test]
fn invite_open_window() {
    let now = Utc::now();
    let mut invite = Invite {
        id: "inv-1".into(),
        sender_id: "usr-1".into(),
        email: "a@b.com".into(),
        status: InviteStatus::Pending,
        expires_at: now + Duration::hours(1),
        accounts: vec![],
        created_at: now,
        updated_at: now,
    };
    assert!(invite.is_open_at(now));
    assert!(!invite.is_open_at(now + Duration::hours(2)));
    invite.status = InviteStatus::Accepted;
    assert!(!invite.is_open_at(now));
}
