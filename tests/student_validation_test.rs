//! Validation and standardization of student submissions
//!
//! Covers the form (create) and programmatic (update) paths against a real
//! in-memory store.

use assert_matches::assert_matches;
use siakad_server::error::{AppError, ViolationKind, ENTITY_TARGET, MALFORMED_PAYLOAD};
use siakad_server::models::{Major, RecordQuery};
use siakad_server::resource::student;

mod common;

#[tokio::test]
async fn test_sample_student_is_stored_normalized() {
    let backend = common::setup_test_backend().await;

    let created = student::create_student(backend.as_ref(), &common::sample_student_fields())
        .await
        .unwrap();

    assert_eq!(created.name, "Budi Santoso Sering");
    assert_eq!(created.student_number, "2023001");
    assert_eq!(created.email, "budi.santoso@example.com");
    assert_eq!(created.phone.as_deref(), Some("081234567890"));
    assert_eq!(created.major, Some(Major::TeknologiInformasi));
    assert_eq!(created.address, "Jl. Merdeka No. 10, Bandung");

    let stored = student::get_student(backend.as_ref(), created.id).await.unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn test_field_rules() {
    let backend = common::setup_test_backend().await;
    let base = || common::student_fields("Budi Santoso", "2023001", "budi@example.com");

    let cases = [
        ("name", "AB", "Name must be at least 3 characters"),
        ("student_number", "2023", "Student number must be at least 5 digits"),
        ("student_number", "202300A", "Student number may only contain digits"),
        ("phone", "123456789", "Phone number must start with 08 or 628"),
        ("email", "budi@", "'budi@' is not a valid email address"),
    ];

    for (field, value, expected) in cases {
        let result = student::create_student(backend.as_ref(), &base().with(field, value)).await;
        let Err(AppError::Validation(errors)) = result else {
            panic!("{} = {:?} should be rejected", field, value);
        };
        assert_eq!(errors.messages_for(field).collect::<Vec<_>>(), vec![expected]);
    }

    assert!(backend.find_students(&RecordQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_major_is_required_and_enumerated() {
    let backend = common::setup_test_backend().await;
    let base = || common::student_fields("Budi Santoso", "2023001", "budi@example.com");

    let Err(AppError::Validation(errors)) =
        student::create_student(backend.as_ref(), &base().with("major", "")).await
    else {
        panic!("empty major should be rejected");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.diagnostics()[0].field, "major");
    assert_eq!(errors.diagnostics()[0].kind, ViolationKind::CrossField);
    assert_eq!(errors.diagnostics()[0].message, "Major must be selected");

    let Err(AppError::Validation(errors)) =
        student::create_student(backend.as_ref(), &base().with("major", "Invalid Jurusan")).await
    else {
        panic!("unknown major should be rejected");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.diagnostics()[0].kind, ViolationKind::Field);

    let created = student::create_student(
        backend.as_ref(),
        &base().with("major", "Teknologi Informasi"),
    )
    .await
    .unwrap();
    assert_eq!(created.major, Some(Major::TeknologiInformasi));
}

#[tokio::test]
async fn test_international_phone_prefix_accepted() {
    let backend = common::setup_test_backend().await;
    let fields = common::student_fields("Budi Santoso", "2023001", "budi@example.com")
        .with("phone", "628123456789");

    let created = student::create_student(backend.as_ref(), &fields).await.unwrap();
    assert_eq!(created.phone.as_deref(), Some("628123456789"));
}

#[tokio::test]
async fn test_numeric_name_is_entity_wide() {
    let backend = common::setup_test_backend().await;
    let fields = common::student_fields("12345", "2023001", "budi@example.com");

    let Err(AppError::Validation(errors)) =
        student::create_student(backend.as_ref(), &fields).await
    else {
        panic!("numeric name should be rejected");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors.diagnostics()[0].is_entity_wide());
    assert_eq!(
        errors.messages_for(ENTITY_TARGET).collect::<Vec<_>>(),
        vec!["Name cannot consist of digits only"]
    );
}

#[tokio::test]
async fn test_all_problems_reported_at_once() {
    let backend = common::setup_test_backend().await;
    let fields = common::student_fields("AB", "2023", "not-an-email")
        .with("phone", "123456789")
        .with("major", "");

    let Err(AppError::Validation(errors)) =
        student::create_student(backend.as_ref(), &fields).await
    else {
        panic!("submission should be rejected");
    };

    let fields: Vec<&str> = errors.diagnostics().iter().map(|d| d.field).collect();
    assert_eq!(fields, vec!["name", "student_number", "email", "phone", "major"]);

    let body = AppError::Validation(errors).to_json();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_uniqueness_on_create_and_edit() {
    let backend = common::setup_test_backend().await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let siti =
        common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
            .await;

    let duplicate = common::student_fields("Rina Wati", "2023003", "BUDI@EXAMPLE.COM");
    let Err(AppError::Validation(errors)) =
        student::create_student(backend.as_ref(), &duplicate).await
    else {
        panic!("duplicate email should be rejected");
    };
    assert_eq!(
        errors.messages_for("email").collect::<Vec<_>>(),
        vec!["Email 'budi@example.com' is already registered"]
    );

    let kept = student::update_student(
        backend.as_ref(),
        budi.id,
        br#"{"email": "Budi@Example.com", "student_number": "2023001"}"#,
    )
    .await
    .unwrap();
    assert_eq!(kept.email, "budi@example.com");

    let result = student::update_student(
        backend.as_ref(),
        siti.id,
        br#"{"student_number": "2023001"}"#,
    )
    .await;
    let Err(AppError::Validation(errors)) = result else {
        panic!("taking another student's number should be rejected");
    };
    assert_eq!(
        errors.messages_for("student_number").collect::<Vec<_>>(),
        vec!["Student number '2023001' is already registered"]
    );
}

#[tokio::test]
async fn test_create_and_update_report_identical_diagnostics() {
    let backend = common::setup_test_backend().await;
    common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
        .await;
    let siti =
        common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
            .await;

    let payload = br#"{
        "name": " ab ",
        "student_number": "2023001",
        "email": "bad",
        "phone": "",
        "major": "Sains Data",
        "address": ""
    }"#;

    let fields = siakad_server::FieldMap::from_json_slice(
        siakad_server::EntityKind::Student,
        payload,
    )
    .unwrap();
    let Err(AppError::Validation(from_form)) =
        student::create_student(backend.as_ref(), &fields).await
    else {
        panic!("form submission should be rejected");
    };
    let Err(AppError::Validation(from_update)) =
        student::update_student(backend.as_ref(), siti.id, payload).await
    else {
        panic!("update should be rejected");
    };

    assert_eq!(from_form, from_update);
    assert_eq!(from_form.len(), 3);
}

#[tokio::test]
async fn test_malformed_update_writes_nothing() {
    let backend = common::setup_test_backend().await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;

    let payloads: [&[u8]; 3] = [b"{not json", b"[1, 2]", br#"{"name": {"first": "Budi"}}"#];
    for payload in payloads {
        let result = student::update_student(backend.as_ref(), budi.id, payload).await;
        assert_matches!(result, Err(AppError::MalformedRequest(msg)) if msg == MALFORMED_PAYLOAD);
    }

    let stored = student::get_student(backend.as_ref(), budi.id).await.unwrap();
    assert_eq!(stored, budi);

    assert_matches!(
        student::update_student(backend.as_ref(), 999, b"{oops").await,
        Err(AppError::MalformedRequest(_))
    );
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let backend = common::setup_test_backend().await;
    let budi = student::create_student(backend.as_ref(), &common::sample_student_fields())
        .await
        .unwrap();

    let updated = student::update_student(
        backend.as_ref(),
        budi.id,
        br#"{"phone": "+62 812-3456-7890", "major": "Sains Data"}"#,
    )
    .await
    .unwrap();

    assert_eq!(updated.phone.as_deref(), Some("6281234567890"));
    assert_eq!(updated.major, Some(Major::SainsData));
    assert_eq!(updated.name, budi.name);
    assert_eq!(updated.email, budi.email);
    assert_eq!(updated.created_at, budi.created_at);

    let cleared = student::update_student(backend.as_ref(), budi.id, br#"{"phone": null}"#)
        .await
        .unwrap();
    assert_eq!(cleared.phone, None);
}

#[tokio::test]
async fn test_missing_student() {
    let backend = common::setup_test_backend().await;

    assert_matches!(
        student::update_student(backend.as_ref(), 42, br#"{"name": "Budi Santoso"}"#).await,
        Err(AppError::NotFound { id: 42, .. })
    );
    assert_matches!(
        student::delete_student(backend.as_ref(), 42).await,
        Err(AppError::NotFound { id: 42, .. })
    );
    assert_matches!(
        student::get_student(backend.as_ref(), 0).await,
        Err(AppError::NotFound { id: 0, .. })
    );
}
