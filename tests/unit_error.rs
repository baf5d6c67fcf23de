/// Unit tests for DiError and DiResult types

use ferrous_wire::{DiError, DiResult};
use std::error::Error;

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("mailer@S".to_string());
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Service mailer@S not found");
    assert!(display_str.contains("not found"));
}

#[test]
fn test_error_display_unresolved_type() {
    let error = DiError::UnresolvedType("app::Logger".to_string());
    assert_eq!(error.to_string(), "Unresolved type: app::Logger");
}

#[test]
fn test_error_display_circular() {
    let path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
    let error = DiError::Circular(path);
    assert_eq!(error.to_string(), "Circular dependency: a -> b -> a");
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch {
        expected: "app::Cache".to_string(),
        found: "app::Logger".to_string(),
    };
    assert_eq!(error.to_string(), "Type mismatch: expected app::Cache, found app::Logger");
}

#[test]
fn test_configuration_error_chains_source() {
    let error = DiError::Configuration {
        id: "api".to_string(),
        source: Box::new(DiError::UnresolvedType("Service".to_string())),
    };
    let display_str = error.to_string();
    assert!(display_str.contains("api"));
    assert!(display_str.contains("Unresolved type: Service"));

    let source = error.source().expect("configuration error has a source");
    assert_eq!(source.to_string(), "Unresolved type: Service");
}

#[test]
fn test_only_unresolved_and_circular_are_deferrable() {
    assert!(DiError::UnresolvedType("A".to_string()).is_deferrable());
    assert!(DiError::Circular(vec!["a".to_string(), "a".to_string()]).is_deferrable());

    assert!(!DiError::NotFound("a".to_string()).is_deferrable());
    assert!(!DiError::Construction("boom".to_string()).is_deferrable());
    assert!(!DiError::Definition("bad".to_string()).is_deferrable());
    assert!(!DiError::ConfigReference("x.y".to_string()).is_deferrable());
    assert!(!DiError::AlreadyInitialized.is_deferrable());
    assert!(!DiError::Configuration {
        id: "a".to_string(),
        source: Box::new(DiError::UnresolvedType("A".to_string())),
    }
    .is_deferrable());
}

#[test]
fn test_errors_travel_through_box_error() {
    fn user_code() -> Result<(), ferrous_wire::BoxError> {
        Err(DiError::Circular(vec!["a".to_string(), "a".to_string()]).into())
    }

    let boxed = user_code().unwrap_err();
    let back = boxed.downcast::<DiError>().expect("DiError survives boxing");
    assert!(matches!(*back, DiError::Circular(_)));
}

#[test]
fn test_di_result_alias() {
    fn lookup(found: bool) -> DiResult<u32> {
        if found {
            Ok(7)
        } else {
            Err(DiError::NotInitialized)
        }
    }

    assert_eq!(lookup(true).unwrap(), 7);
    assert_eq!(lookup(false).unwrap_err().to_string(), "Container not initialized");
}
