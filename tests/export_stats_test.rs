//! Search, export projections and dashboard figures

use siakad_server::models::{Major, MajorCount, RecordQuery};
use siakad_server::parser::EntityKind;
use siakad_server::resource::export::{self, COURSE_COLUMNS, STUDENT_COLUMNS};
use siakad_server::resource::{self as records, lecturer, student};

mod common;

#[tokio::test]
async fn test_search_and_major_filter() {
    let backend = common::setup_test_backend().await;
    common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
        .await;
    common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
        .await;
    let sering = common::sample_student_fields()
        .with("student_number", "2024001")
        .with("email", "sering@example.com");
    student::create_student(backend.as_ref(), &sering).await.unwrap();

    let found = student::search_students(backend.as_ref(), &RecordQuery::search("BUDI"))
        .await
        .unwrap();
    assert_eq!(
        found.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Budi Santoso", "Budi Santoso Sering"]
    );

    let by_number = student::search_students(backend.as_ref(), &RecordQuery::search("2024"))
        .await
        .unwrap();
    assert_eq!(by_number.len(), 1);

    let filtered = student::search_students(
        backend.as_ref(),
        &RecordQuery::search("budi").with_major(Major::SainsData),
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].student_number, "2023001");

    let everything =
        records::list_records(backend.as_ref(), EntityKind::Student, &RecordQuery::default())
            .await
            .unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn test_student_export_table() {
    let backend = common::setup_test_backend().await;
    student::create_student(backend.as_ref(), &common::sample_student_fields())
        .await
        .unwrap();
    common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
        .await;

    let table = export::export_students(backend.as_ref(), &RecordQuery::default())
        .await
        .unwrap();
    assert_eq!(table.headers, STUDENT_COLUMNS.to_vec());
    assert_eq!(
        table.rows[0],
        vec![
            "1",
            "Budi Santoso Sering",
            "2023001",
            "budi.santoso@example.com",
            "081234567890",
            "Teknologi Informasi",
            "Jl. Merdeka No. 10, Bandung",
        ]
    );
    assert_eq!(table.rows[1][0], "2");
    assert_eq!(table.rows[1][4], "");

    let filtered = records::export_records(
        backend.as_ref(),
        EntityKind::Student,
        &RecordQuery::search("siti"),
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows[0][0], "1");
}

#[tokio::test]
async fn test_course_export_shows_lecturer_and_roster_size() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let siti =
        common::create_test_student(backend.as_ref(), "Siti Aminah", "2023002", "siti@example.com")
            .await;
    common::create_test_course(backend.as_ref(), "IF201", ani.id, &[budi.id, siti.id]).await;

    let table = export::export_courses(backend.as_ref(), &RecordQuery::default())
        .await
        .unwrap();
    assert_eq!(table.headers, COURSE_COLUMNS.to_vec());
    assert_eq!(
        table.rows,
        vec![vec!["1", "Basis Data", "IF201", "3", "2", "Ani Wijaya", "2"]]
    );

    let lecturers = export::export_lecturers(backend.as_ref(), &RecordQuery::search("0012"))
        .await
        .unwrap();
    assert_eq!(lecturers.rows[0][2], "0012345678");
    assert_eq!(lecturers.rows[0][5], "Teknik Informatika");
}

#[tokio::test]
async fn test_dashboard_counts() {
    let backend = common::setup_test_backend().await;
    let ani = common::create_test_lecturer(backend.as_ref()).await;
    let budi =
        common::create_test_student(backend.as_ref(), "Budi Santoso", "2023001", "budi@example.com")
            .await;
    let sering = common::sample_student_fields()
        .with("student_number", "2024001")
        .with("email", "sering@example.com");
    student::create_student(backend.as_ref(), &sering).await.unwrap();
    common::create_test_course(backend.as_ref(), "IF201", ani.id, &[budi.id]).await;

    let taught = lecturer::courses_of_lecturer(backend.as_ref(), ani.id)
        .await
        .unwrap();
    assert_eq!(taught.len(), 1);

    let stats = records::dashboard(backend.as_ref()).await.unwrap();
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_lecturers, 1);
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.total_enrollments, 1);
    assert_eq!(
        stats.students_per_major,
        vec![
            MajorCount { major: Some(Major::TeknologiInformasi), count: 1 },
            MajorCount { major: Some(Major::SainsData), count: 1 },
            MajorCount { major: None, count: 0 },
        ]
    );
}
