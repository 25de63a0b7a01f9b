use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use examprep_core::model::{PaperSet, Question};
use examprep_core::session::ExamSession;

fn make_papers(years: i32, per_year: usize) -> PaperSet {
    let mut id = 0;
    let mut questions = Vec::new();
    for year in 2000..2000 + years {
        for i in 0..per_year {
            id += 1;
            questions.push(Question {
                id: format!("{year}-{id}"),
                year,
                subject: "Maths".into(),
                term: "First term".into(),
                text: format!("Compute {i} x 3"),
                kind: if i % 2 == 0 { "algebra".into() } else { "geometry".into() },
                choices: None,
                answer: Some((i * 3).to_string()),
            });
        }
    }
    questions.into_iter().collect()
}

fn bench_next_question(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_question");

    for (years, per_year) in [(3, 4), (10, 50), (20, 200)] {
        let papers = make_papers(years, per_year);
        group.bench_function(format!("{years}x{per_year}"), |b| {
            b.iter_batched(
                || {
                    let mut session = ExamSession::new("bench", "practice", "First term", "Maths")
                        .expect("valid session")
                        .with_seed(42);
                    session.load_papers(papers.clone());
                    session
                },
                |mut session| {
                    for _ in 0..16 {
                        let _ = session.next_question();
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_evaluate_miss(c: &mut Criterion) {
    let papers = make_papers(10, 50);
    c.bench_function("evaluate_miss_with_follow_up", |b| {
        b.iter_batched(
            || {
                let mut session = ExamSession::new("bench", "practice", "First term", "Maths")
                    .expect("valid session")
                    .with_seed(7);
                session.load_papers(papers.clone());
                session
            },
            |mut session| {
                let _ = session.evaluate("2000-1", "wrong");
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_next_question, bench_evaluate_miss);
criterion_main!(benches);
