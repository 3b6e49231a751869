//! Tests for RuleService: reading rule summaries from a directory tree.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use ruledoc::application::services::RuleService;
use ruledoc::application::ApplicationError;
use ruledoc::domain::{DomainError, PredicateName};
use ruledoc::infrastructure::traits::RealFileSystem;

const KEY_GENERATOR: &str = r#"
SPEC javax.crypto.KeyGenerator
OBJECTS
    java.lang.String algorithm;
EVENTS
    g1: getInstance(algorithm);
ORDER
    Gets, Inits?, GenKey
CONSTRAINTS
    algorithm in {"AES", "HmacSHA256"};
ENSURES
    generatedKey[key, algorithm];
"#;

const CIPHER: &str = r#"
SPEC javax.crypto.Cipher
ORDER
    Get, Init, (FinWPU | (Updates+, DoFinal))
REQUIRES
    generatedKey[key, _];
ENSURES
    encrypted[cipherText, plainText];
"#;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn service() -> RuleService {
    RuleService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_nested_rule_files_when_loading_then_reads_all_rules() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "KeyGenerator.crysl", KEY_GENERATOR);
    write(temp.path(), "cipher/Cipher.crysl", CIPHER);
    write(temp.path(), "README.md", "# rules");

    let rules = service().load_directory(temp.path()).expect("load rules");

    assert_eq!(rules.len(), 2);
    let cipher = rules.get("javax.crypto.Cipher").expect("cipher rule");
    assert!(cipher.requires.contains("generatedKey"));
    assert!(cipher.ensures.contains(&PredicateName::from("encrypted")));
    assert_eq!(
        cipher.source.as_deref(),
        Some(temp.path().join("cipher/Cipher.crysl").as_path())
    );
    let keygen = rules.get("javax.crypto.KeyGenerator").expect("key generator rule");
    assert_eq!(keygen.order.as_deref(), Some("Gets, Inits?, GenKey"));
    assert!(keygen.requires.is_empty());
}

#[rstest]
#[case::missing_spec("ENSURES\n    generatedKey[key];\n")]
#[case::predicate_without_name("SPEC a.B\nREQUIRES\n    [key];\n")]
fn given_malformed_rule_when_loading_then_whole_load_fails(#[case] broken: &str) {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Cipher.crysl", CIPHER);
    write(temp.path(), "Broken.crysl", broken);

    let result = service().load_directory(temp.path());

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(
            DomainError::MissingSpec(_) | DomainError::InvalidRule { .. }
        ))
    ));
}

#[test]
fn given_single_file_when_loading_then_returns_rule() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "KeyGenerator.crysl", KEY_GENERATOR);

    let rule = service()
        .load_file(&temp.path().join("KeyGenerator.crysl"))
        .unwrap();

    assert_eq!(rule.id.short_name(), "KeyGenerator");
    assert_eq!(
        rule.constraints.as_deref(),
        Some(r#"algorithm in {"AES", "HmacSHA256"};"#)
    );
}

#[test]
fn given_unreadable_file_when_loading_then_reports_path() {
    let temp = TempDir::new().unwrap();

    let result = service().load_file(&temp.path().join("Missing.crysl"));

    match result {
        Err(ApplicationError::OperationFailed { context, .. }) => {
            assert!(context.contains("Missing.crysl"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
