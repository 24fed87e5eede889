//! Course validation and the course/student enrollment relation

use assert_matches::assert_matches;
use siakad_server::error::{AppError, ViolationKind};
use siakad_server::models::CourseDraft;
use siakad_server::parser::{EntityKind, FieldMap};
use siakad_server::resource::{self as records, course, student};

mod common;

#[tokio::test]
async fn test_course_fields_are_normalized() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;

    let fields = FieldMap::new(EntityKind::Course)
        .with("name", "  Basis   Data Lanjut ")
        .with("code", " if-301 ")
        .with("credits", " 3 ")
        .with("semester", "5")
        .with("lecturer", ani.id)
        .with("students", vec![budi.id.to_string(), budi.id.to_string()]);

    let created = course::create_course(backend.as_ref(), &fields).await.unwrap();
    assert_eq!(created.name, "Basis Data Lanjut");
    assert_eq!(created.code, "IF-301");
    assert_eq!(created.credits, 3);
    assert_eq!(created.semester, 5);
    assert_eq!(created.student_ids, vec![budi.id]);
}

#[tokio::test]
async fn test_course_references_must_exist() {
    let backend = common::setup_test_backend().await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;

    let fields = common::course_fields("IF201", 99, &[budi.id, 42]);
    let Err(AppError::Validation(errors)) = course::create_course(backend.as_ref(), &fields).await
    else {
        panic!("dangling references should be rejected");
    };

    assert_eq!(
        errors.messages_for("lecturer").collect::<Vec<_>>(),
        vec!["Lecturer #99 does not exist"]
    );
    assert_eq!(
        errors.messages_for("students").collect::<Vec<_>>(),
        vec!["Students not found: 42"]
    );
    assert!(errors
        .diagnostics()
        .iter()
        .all(|d| d.kind == ViolationKind::CrossField));
    assert!(backend.find_courses(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_course_code() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    common::create_test_course(backend.as_ref(), "IF201", ani.id, &[]).await;

    let Err(AppError::Validation(errors)) =
        course::create_course(backend.as_ref(), &common::course_fields("if201", ani.id, &[])).await
    else {
        panic!("duplicate code should be rejected");
    };
    assert_eq!(
        errors.messages_for("code").collect::<Vec<_>>(),
        vec!["Course code 'IF201' is already registered"]
    );
}

#[tokio::test]
async fn test_update_replaces_roster_only_when_given() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let siti =
        common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
            .await;
    let basis_data = common::create_test_course(backend.as_ref(), "IF201", ani.id, &[budi.id]).await;

    let renamed = course::update_course(backend.as_ref(), basis_data.id, br#"{"credits": 4}"#)
        .await
        .unwrap();
    assert_eq!(renamed.credits, 4);
    assert_eq!(renamed.student_ids, vec![budi.id]);

    let payload = format!(r#"{{"students": [{}, {}]}}"#, siti.id, budi.id);
    let replaced = course::update_course(backend.as_ref(), basis_data.id, payload.as_bytes())
        .await
        .unwrap();
    assert_eq!(replaced.student_ids, vec![budi.id, siti.id]);

    let cleared = course::update_course(backend.as_ref(), basis_data.id, br#"{"students": []}"#)
        .await
        .unwrap();
    assert!(cleared.student_ids.is_empty());
    assert!(student::courses_of_student(backend.as_ref(), siti.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_scalar_update_keeps_later_enrollments() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let siti =
        common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
            .await;
    let basis_data = common::create_test_course(backend.as_ref(), "IF201", ani.id, &[budi.id]).await;

    // A draft built from a read taken before the enrollment below
    let snapshot = course::get_course(backend.as_ref(), basis_data.id).await.unwrap();
    let stale = CourseDraft {
        name: snapshot.name.clone(),
        code: snapshot.code.clone(),
        credits: 6,
        semester: snapshot.semester,
        lecturer_id: snapshot.lecturer_id,
        student_ids: None,
    };

    assert!(student::enroll(backend.as_ref(), siti.id, basis_data.id).await.unwrap());

    let updated = backend
        .update_course(basis_data.id, &stale)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.credits, 6);
    assert_eq!(updated.student_ids, vec![budi.id, siti.id]);

    let payload = br#"{"name": "Basis Data Lanjut"}"#;
    let renamed = course::update_course(backend.as_ref(), basis_data.id, payload)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Basis Data Lanjut");
    assert_eq!(renamed.student_ids, vec![budi.id, siti.id]);
}

#[tokio::test]
async fn test_related_courses_per_kind() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let basis_data = common::create_test_course(backend.as_ref(), "IF201", ani.id, &[budi.id]).await;
    common::create_test_course(backend.as_ref(), "IF202", ani.id, &[]).await;

    let taught = records::related_courses(backend.as_ref(), EntityKind::Lecturer, ani.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(taught.len(), 2);

    let enrolled = records::related_courses(backend.as_ref(), EntityKind::Student, budi.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(enrolled.iter().map(|c| c.id).collect::<Vec<_>>(), vec![basis_data.id]);

    assert_eq!(
        records::related_courses(backend.as_ref(), EntityKind::Course, basis_data.id)
            .await
            .unwrap(),
        None
    );
    assert_matches!(
        records::related_courses(backend.as_ref(), EntityKind::Lecturer, 404).await,
        Err(AppError::NotFound { entity: EntityKind::Lecturer, .. })
    );
}

#[tokio::test]
async fn test_enrollment_is_visible_from_both_sides() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let basis_data = common::create_test_course(backend.as_ref(), "IF201", ani.id, &[]).await;

    assert!(student::enroll(backend.as_ref(), budi.id, basis_data.id).await.unwrap());
    assert!(!student::enroll(backend.as_ref(), budi.id, basis_data.id).await.unwrap());

    let roster = course::roster(backend.as_ref(), basis_data.id).await.unwrap();
    assert_eq!(roster.iter().map(|s| s.id).collect::<Vec<_>>(), vec![budi.id]);
    assert_eq!(
        course::get_course(backend.as_ref(), basis_data.id)
            .await
            .unwrap()
            .student_ids,
        vec![budi.id]
    );

    assert!(course::remove_student(backend.as_ref(), basis_data.id, budi.id)
        .await
        .unwrap());
    assert!(student::courses_of_student(backend.as_ref(), budi.id)
        .await
        .unwrap()
        .is_empty());
    assert!(!student::withdraw(backend.as_ref(), budi.id, basis_data.id)
        .await
        .unwrap());

    assert!(course::add_student(backend.as_ref(), basis_data.id, budi.id)
        .await
        .unwrap());
    let courses = student::courses_of_student(backend.as_ref(), budi.id)
        .await
        .unwrap();
    assert_eq!(courses.iter().map(|c| c.id).collect::<Vec<_>>(), vec![basis_data.id]);
}

#[tokio::test]
async fn test_enrolling_missing_parties() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let basis_data = common::create_test_course(backend.as_ref(), "IF201", ani.id, &[]).await;

    assert_matches!(
        student::enroll(backend.as_ref(), 77, basis_data.id).await,
        Err(AppError::NotFound { entity: EntityKind::Student, id: 77 })
    );
    assert_matches!(
        course::add_student(backend.as_ref(), 88, 1).await,
        Err(AppError::NotFound { entity: EntityKind::Course, id: 88 })
    );
}
