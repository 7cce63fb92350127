use campus_core::model::{QuizResult, Rating, RatingScore};
use campus_core::time::fixed_now;
use chrono::Duration;
use storage::repository::{
    DirectoryRepository, NewAnswerRecord, NewPostRecord, NewQuestionRecord, NewQuizRecord,
    NewTeacherRecord, PostRepository, QuizRepository, QuizResultRepository, RatingRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed_pair(
    repo: &SqliteRepository,
) -> (campus_core::model::TeacherId, campus_core::model::StudentId) {
    let teacher = repo
        .insert_teacher(NewTeacherRecord {
            name: "Ana".into(),
            email: "ana@school.test".into(),
        })
        .await
        .unwrap();
    let student = repo.insert_student("Luis".into()).await.unwrap();
    (teacher, student)
}

#[tokio::test]
async fn sqlite_rating_upsert_keeps_single_row_per_pair() {
    let repo = connect("memdb_rating_upsert").await;
    let (teacher, student) = seed_pair(&repo).await;

    let first = Rating::new(teacher, student, RatingScore::new(3).unwrap(), None, fixed_now());
    let saved = repo.upsert_rating(&first).await.unwrap();
    assert!(saved.created);

    let revised = Rating::new(
        teacher,
        student,
        RatingScore::new(5).unwrap(),
        Some("much clearer now".into()),
        fixed_now() + Duration::days(3),
    );
    let saved = repo.upsert_rating(&revised).await.unwrap();
    assert!(!saved.created);

    // Row count unchanged, score/comment replaced, created_at preserved.
    let all = repo.ratings_for_teacher(teacher).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].score().value(), 5);
    assert_eq!(all[0].comment(), Some("much clearer now"));
    assert_eq!(all[0].created_at(), fixed_now());
}

#[tokio::test]
async fn sqlite_average_rating_roundtrips_on_profile() {
    let repo = connect("memdb_avg_rating").await;
    let (teacher, _student) = seed_pair(&repo).await;

    repo.set_average_rating(teacher, 4.33).await.unwrap();

    let profile = repo.get_teacher(teacher).await.unwrap().unwrap();
    assert_eq!(profile.average_rating(), Some(4.33));
}

#[tokio::test]
async fn sqlite_quiz_roundtrip_with_questions_and_answers() {
    let repo = connect("memdb_quiz_roundtrip").await;

    let quiz = repo
        .insert_new_quiz(NewQuizRecord {
            title: "Fractions".into(),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let question = repo
        .insert_new_question(NewQuestionRecord {
            quiz_id: quiz,
            text: "What is 1/2 + 1/4?".into(),
        })
        .await
        .unwrap();

    let correct = repo
        .insert_new_answer(NewAnswerRecord {
            question_id: question,
            text: "3/4".into(),
            is_correct: true,
        })
        .await
        .unwrap();
    repo.insert_new_answer(NewAnswerRecord {
        question_id: question,
        text: "2/6".into(),
        is_correct: false,
    })
    .await
    .unwrap();

    let questions = repo.questions_for_quiz(quiz).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].text(), "What is 1/2 + 1/4?");

    let answers = repo.answers_for_question(question).await.unwrap();
    assert_eq!(answers.len(), 2);

    let fetched = repo.get_answer(correct).await.unwrap().unwrap();
    assert!(fetched.is_correct());
}

#[tokio::test]
async fn sqlite_latest_result_wins() {
    let repo = connect("memdb_latest_result").await;
    let (_teacher, student) = seed_pair(&repo).await;
    let quiz = repo
        .insert_new_quiz(NewQuizRecord {
            title: "Fractions".into(),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let first = QuizResult::from_counts(student, quiz, 2, 4, fixed_now()).unwrap();
    repo.insert_result(&first).await.unwrap();

    let second =
        QuizResult::from_counts(student, quiz, 3, 4, fixed_now() + Duration::hours(1)).unwrap();
    repo.insert_result(&second).await.unwrap();

    let latest = repo.latest_result(student, quiz).await.unwrap().unwrap();
    assert_eq!(latest.score(), 75);

    let all = repo.results_for_student(student).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn sqlite_post_crud_and_search() {
    let repo = connect("memdb_post_crud").await;
    let (teacher, _student) = seed_pair(&repo).await;

    let first = repo
        .insert_new_post(NewPostRecord {
            teacher_id: teacher,
            title: "Fractions revisited".into(),
            content: "A walkthrough of equivalent fractions with examples.".into(),
            reference_url: Some("https://example.com/fractions".into()),
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    repo.insert_new_post(NewPostRecord {
        teacher_id: teacher,
        title: "Decimals next week".into(),
        content: "Preview of the decimals unit and what to bring.".into(),
        reference_url: None,
        created_at: fixed_now() + Duration::days(1),
    })
    .await
    .unwrap();

    let page = repo.posts_for_teacher(teacher, 10, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title(), "Decimals next week");

    let found = repo.search_posts("fractions", 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), first);

    assert_eq!(repo.count_posts().await.unwrap(), 2);
    assert_eq!(
        repo.count_posts_since(fixed_now() + Duration::hours(12))
            .await
            .unwrap(),
        1
    );

    let top = repo.top_teachers(5).await.unwrap();
    assert_eq!(top, vec![(teacher, 2)]);

    repo.delete_post(first).await.unwrap();
    assert!(repo.get_post(first).await.unwrap().is_none());
    assert_eq!(repo.count_posts().await.unwrap(), 1);
}
