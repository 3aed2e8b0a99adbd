//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pagemeta::core::entity::EntityKind;
use pagemeta::core::error::{
    ConfigError, EntityError, ImportError, MetaError, RowError, StorageError, ValidationError,
};
use pagemeta::csv::CsvError;
use tokio_test::assert_ok;
use validator::Validate;

fn not_found() -> MetaError {
    MetaError::Entity(EntityError::NotFound {
        kind: EntityKind::ObjectField,
        id: "f1".to_string(),
    })
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_entity_errors_return_404() {
        for err in [
            not_found(),
            MetaError::Entity(EntityError::AlreadyDeleted {
                kind: EntityKind::Object,
                id: "o1".into(),
            }),
            MetaError::Entity(EntityError::NotDeleted {
                kind: EntityKind::PageList,
                id: "l1".into(),
            }),
        ] {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_validation_error_returns_400() {
        let err = MetaError::Validation(ValidationError::MissingArgument {
            argument: "obj_id".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_import_error_returns_400() {
        let err = MetaError::Import(ImportError {
            kind: EntityKind::Object,
            rows: vec![],
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_and_config_errors_return_500() {
        let storage = MetaError::Storage(StorageError::TransactionError {
            message: "lock poisoned".into(),
        });
        let config = MetaError::Config(ConfigError::IoError {
            message: "denied".into(),
        });
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod response_format_tests {
    use super::*;

    #[test]
    fn test_not_found_response_has_entity_details() {
        let response = not_found().to_response();
        assert_eq!(response.code, "ENTITY_NOT_FOUND");
        assert_eq!(response.message, "ObjectField with id 'f1' not found");

        let details = response.details.expect("details");
        assert_eq!(details["entity_type"], "object_field");
        assert_eq!(details["id"], "f1");
    }

    #[test]
    fn test_import_response_lists_rows() {
        let err = MetaError::Import(ImportError {
            kind: EntityKind::PageListField,
            rows: vec![
                RowError {
                    line: 2,
                    message: "bad".into(),
                },
                RowError {
                    line: 5,
                    message: "worse".into(),
                },
            ],
        });
        let response = err.to_response();
        assert_eq!(response.code, "IMPORT_REJECTED");
        let rows = &response.details.expect("details")["rows"];
        assert_eq!(rows[1]["line"], 5);
    }

    #[test]
    fn test_internal_error_has_no_details() {
        let response = MetaError::Internal("boom".into()).to_response();
        assert_eq!(response.code, "INTERNAL_ERROR");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_into_response_sets_status() {
        let response = not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;
    use pagemeta::entities::{ObjectDraft, PageListFieldDraft};

    #[test]
    fn test_validator_errors_become_field_errors() {
        let draft = PageListFieldDraft {
            hidden: Some("yes".into()),
            ..Default::default()
        };
        let err: MetaError = draft.validate().unwrap_err().into();

        let MetaError::Validation(ValidationError::FieldErrors(fields)) = &err else {
            panic!("expected field errors, got {err:?}");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["hidden", "object_field_id", "page_list_id"]);
        assert!(err.to_response().details.is_some());
    }

    #[test]
    fn test_valid_draft_passes() {
        let draft = ObjectDraft {
            name: Some("customer".into()),
            label: None,
            table_name: Some("t_customer".into()),
        };
        assert_ok!(draft.validate());
    }

    #[test]
    fn test_bad_table_name_is_rejected() {
        let draft = ObjectDraft {
            table_name: Some("drop table;".into()),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_json_error_becomes_invalid_json() {
        let err: MetaError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            MetaError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_csv_error_becomes_validation_error() {
        let err: MetaError = CsvError::UnterminatedQuote { line: 4 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: MetaError = StorageError::TransactionError {
            message: "lock poisoned".into(),
        }
        .into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
