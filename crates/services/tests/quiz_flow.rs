use campus_core::model::AnswerId;
use campus_core::time::fixed_clock;
use services::AppServices;
use storage::repository::{DirectoryRepository, Storage};

async fn author_quiz(
    services: &AppServices,
    questions: &[(&str, &str, &str)],
) -> (campus_core::model::QuizId, Vec<(AnswerId, AnswerId)>) {
    let quiz_service = services.quiz_service();
    let quiz_id = quiz_service.create_quiz("Fractions".into()).await.unwrap();

    let mut choices = Vec::new();
    for (text, right, wrong) in questions {
        let question_id = quiz_service
            .add_question(quiz_id, (*text).into())
            .await
            .unwrap();
        let correct = quiz_service
            .add_answer(question_id, (*right).into(), true)
            .await
            .unwrap();
        let incorrect = quiz_service
            .add_answer(question_id, (*wrong).into(), false)
            .await
            .unwrap();
        choices.push((correct, incorrect));
    }
    (quiz_id, choices)
}

#[tokio::test]
async fn full_quiz_session_persists_the_expected_score() {
    let storage = Storage::in_memory();
    let services = AppServices::with_storage(&storage, fixed_clock());
    let student = storage.directory.insert_student("Luis".into()).await.unwrap();

    let (quiz_id, choices) = author_quiz(
        &services,
        &[
            ("What is 1/2 + 1/4?", "3/4", "2/6"),
            ("What is 1/3 of 9?", "3", "6"),
            ("Which is larger, 2/3 or 3/5?", "2/3", "3/5"),
            ("What is 5/5?", "1", "0"),
        ],
    )
    .await;

    let taking = services.quiz_taking();
    let mut session = taking.start(quiz_id, student).await.unwrap();
    assert_eq!(session.progress(), 0);

    // Three right answers, then one wrong.
    for (n, (correct, wrong)) in choices.iter().enumerate() {
        let pick = if n < 3 { *correct } else { *wrong };
        taking.answer_current(&mut session, pick).await.unwrap();
    }
    assert!(session.is_complete());
    assert_eq!(session.progress(), 100);

    let result = taking.finish(&session).await.unwrap();
    assert_eq!(result.score(), 75);
    assert_eq!(result.total_questions(), 4);
    assert_eq!(result.correct_answers(), 3);

    let latest = taking.latest_result(student, quiz_id).await.unwrap().unwrap();
    assert_eq!(latest, result);

    let completed = taking.completed_quizzes(student).await.unwrap();
    assert_eq!(completed.len(), 1);
}

#[tokio::test]
async fn retake_replaces_the_latest_result_only() {
    let storage = Storage::in_memory();
    let services = AppServices::with_storage(&storage, fixed_clock());
    let student = storage.directory.insert_student("Luis".into()).await.unwrap();

    let (quiz_id, choices) = author_quiz(
        &services,
        &[("What is 1/2 + 1/4?", "3/4", "2/6"), ("What is 1/3 of 9?", "3", "6")],
    )
    .await;
    let taking = services.quiz_taking();

    // First attempt: both wrong.
    let mut session = taking.start(quiz_id, student).await.unwrap();
    for (_, wrong) in &choices {
        taking.answer_current(&mut session, *wrong).await.unwrap();
    }
    assert_eq!(taking.finish(&session).await.unwrap().score(), 0);

    // Second attempt: both right.
    let mut session = taking.start(quiz_id, student).await.unwrap();
    for (correct, _) in &choices {
        taking.answer_current(&mut session, *correct).await.unwrap();
    }
    assert_eq!(taking.finish(&session).await.unwrap().score(), 100);

    let latest = taking.latest_result(student, quiz_id).await.unwrap().unwrap();
    assert_eq!(latest.score(), 100);

    let completed = taking.completed_quizzes(student).await.unwrap();
    assert_eq!(completed.len(), 2);
}
