use std::fmt;

use tracing::info;
use tracing_subscriber::EnvFilter;

use campus_core::model::{QuizId, StudentId, TeacherId};
use services::{AppServices, Clock, PostService};
use storage::repository::{DirectoryRepository, NewTeacherRecord};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- demo [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:campus.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CAMPUS_DB_URL");
    eprintln!("  CAMPUS_MAIL_API_KEY / CAMPUS_MAIL_BASE_URL / CAMPUS_MAIL_FROM");
    eprintln!("  CAMPUS_EMBED_API_KEY / CAMPUS_EMBED_BASE_URL / CAMPUS_EMBED_MODEL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Seed,
    Demo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "seed" => Some(Self::Seed),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("CAMPUS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://campus.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

struct Seeded {
    teacher: TeacherId,
    student: StudentId,
    quiz: QuizId,
}

async fn seed(services: &AppServices) -> Result<Seeded, Box<dyn std::error::Error>> {
    let directory = services.directory();
    let teacher = directory
        .insert_teacher(NewTeacherRecord {
            name: "Ana Morales".into(),
            email: "ana.morales@campus.test".into(),
        })
        .await?;
    let student = directory.insert_student("Luis Vega".into()).await?;

    let quiz_service = services.quiz_service();
    let quiz = quiz_service.create_quiz("Fractions basics".into()).await?;
    let questions = [
        ("What is 1/2 + 1/4?", "3/4", "2/6"),
        ("What is 1/3 of 9?", "3", "6"),
        ("Which is larger, 2/3 or 3/5?", "2/3", "3/5"),
        ("What is 5/5?", "1", "0"),
    ];
    for (text, right, wrong) in questions {
        let question = quiz_service.add_question(quiz, text.into()).await?;
        quiz_service.add_answer(question, right.into(), true).await?;
        quiz_service.add_answer(question, wrong.into(), false).await?;
    }

    let post_service = services.post_service();
    post_service
        .publish(
            teacher,
            "Welcome to fractions".into(),
            "This week we cover **equivalent fractions** and how to compare them.".into(),
            None,
        )
        .await?;

    info!(%teacher, %student, %quiz, "seeded sample data");
    Ok(Seeded {
        teacher,
        student,
        quiz,
    })
}

async fn demo(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let seeded = seed(services).await?;

    // Walk the quiz, picking the correct choice except on the last question.
    let taking = services.quiz_taking();
    let quiz_service = services.quiz_service();
    let mut session = taking.start(seeded.quiz, seeded.student).await?;
    let total = session.total_questions();

    while let Some(question) = session.current_question() {
        let question_id = question.id();
        let answers = quiz_service.answers(question_id).await?;
        let last_question = session.answered_count() + 1 == total;
        let pick = answers
            .iter()
            .find(|a| a.is_correct() != last_question)
            .or(answers.first())
            .ok_or("question has no answer choices")?
            .id();

        let outcome = taking.answer_current(&mut session, pick).await?;
        println!(
            "answered question {question_id}: correct={} progress={}%",
            outcome.correct, outcome.progress
        );
    }

    let result = taking.finish(&session).await?;
    println!(
        "quiz finished: {}/{} correct, score {}%",
        result.correct_answers(),
        result.total_questions(),
        result.score()
    );

    // Rate the teacher twice from the same student: the second save revises
    // the row in place and observers fire both times.
    let ratings = services.rating_service();
    let first = ratings
        .rate_teacher(seeded.teacher, seeded.student, 4, None)
        .await?;
    println!("rating saved (created={})", first.created);
    let second = ratings
        .rate_teacher(
            seeded.teacher,
            seeded.student,
            5,
            Some("clear explanations".into()),
        )
        .await?;
    println!("rating saved (created={})", second.created);

    let average = ratings.teacher_average(seeded.teacher).await?;
    println!("teacher average: {average:?}");

    let posts = services.post_service();
    let stats = posts.stats().await?;
    println!(
        "blog: {} posts total, {} recent",
        stats.total_posts, stats.recent_posts
    );
    if let Some(post) = posts.posts_for_teacher(seeded.teacher, 1, 0).await?.first() {
        println!("latest post rendered: {}", PostService::render_html(post));
    }

    let embeddings = services.embeddings();
    let a = embeddings.embed("comparing fractions with different denominators").await;
    let b = embeddings.embed("how to compare fractions").await;
    println!(
        "embedding similarity: {:.3}",
        services::cosine_similarity(&a, &b)
    );

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Demo,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Demo,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;

    match cmd {
        Command::Seed => {
            seed(&services).await?;
            Ok(())
        }
        Command::Demo => demo(&services).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
