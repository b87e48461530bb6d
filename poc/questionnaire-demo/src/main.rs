//! Questionnaire Demo: Simulated Respondents → Discrimination Scores
//!
//! Runs a small symptom questionnaire against respondents drawn from three
//! conclusion profiles and reports which questions separate answers best.
//!
//! Protocol:
//! 1. Build the symptom graph (follow-up: fever=yes → temperature)
//! 2. Simulate 40 sessions per conclusion with a seeded RNG
//! 3. Aggregate into one co-occurrence matrix per conclusion
//! 4. Print the similarity table and scores for "flu"
//! 5. Dump the full report as JSON
//!
//! Run with: RUST_LOG=querent_runtime=debug cargo run -p querent-questionnaire-demo

use querent::prelude::*;
use querent::runtime::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONCLUSIONS: [&str; 3] = ["allergy", "cold", "flu"];
const SESSIONS_PER_CONCLUSION: usize = 40;

/// Probability of the first answer label, per question and conclusion.
fn first_answer_probability(question: &str, conclusion: &str) -> f64 {
    match (question, conclusion) {
        ("fever", "flu") => 0.9,
        ("fever", "cold") => 0.3,
        ("temperature", "flu") => 0.8,
        ("aches", "flu") => 0.85,
        ("aches", "cold") => 0.2,
        ("cough", "flu") | ("cough", "cold") => 0.7,
        ("sneezing", "cold") => 0.8,
        ("sneezing", "allergy") => 0.9,
        ("itchy_eyes", "allergy") => 0.85,
        _ => 0.1,
    }
}

fn symptom_graph() -> Result<QueryGraph> {
    let yes_no = ["yes", "no"];
    Ok(QueryGraph::new(vec![
        QueryNode::new("fever")
            .with_answers(yes_no)
            .with_follow_up("yes", "temperature")
            .with_relevance("flu", 3.0)
            .with_relevance("cold", 1.0)
            .with_relevance("allergy", 0.2),
        QueryNode::new("temperature")
            .with_answers(["high", "mild"])
            .with_default_relevance(0.0),
        QueryNode::new("aches")
            .with_answers(yes_no)
            .with_relevance("flu", 2.5)
            .with_relevance("allergy", 0.1),
        QueryNode::new("cough")
            .with_answers(yes_no)
            .with_relevance("flu", 2.0)
            .with_relevance("cold", 2.0),
        QueryNode::new("sneezing")
            .with_answers(yes_no)
            .with_relevance("cold", 2.5)
            .with_relevance("allergy", 3.0),
        QueryNode::new("itchy_eyes")
            .with_answers(yes_no)
            .with_relevance("allergy", 3.0)
            .with_relevance("flu", 0.2),
    ])?)
}

/// Walk one session, answering from the conclusion's profile.
fn simulate(graph: &mut QueryGraph, conclusion: &str, rng: &mut StdRng) -> Result<SessionResult> {
    let mut session = QuerySession::new(graph, Some(conclusion))?;
    while let Some(node) = session.current_query() {
        let labels: Vec<&str> = node.answers().map(|a| a.label()).collect();
        let p = first_answer_probability(node.question(), conclusion);
        // Answers iterate in label order: "high" before "mild", "no" before "yes".
        let first_is_positive = matches!(labels.first(), Some(&"high"));
        let positive = rng.gen_bool(p);
        let answer = match (positive == first_is_positive, labels.as_slice()) {
            (true, [first, ..]) => *first,
            (false, [_, second, ..]) => *second,
            (_, [only]) => *only,
            (_, []) => break,
        };
        session.receive_answer_for_next_question(answer)?;
    }
    session.finish()
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querent_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║  Querent: Symptom Questionnaire Simulation          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // --- Phase 1: Graph ---
    let mut graph = symptom_graph()?;
    println!(
        "Graph: {} questions, {} QA pairs, {} follow-up edges",
        graph.len(),
        graph.qa_keys().len(),
        graph.edge_count()
    );
    println!();

    // --- Phase 2: Sessions ---
    println!("── Phase 2: Simulated Sessions ────────────────────────");
    let mut results = SessionResults::from_graph(&graph, CONCLUSIONS);
    let mut rng = StdRng::seed_from_u64(2020);
    for conclusion in CONCLUSIONS {
        let mut asked = 0;
        for _ in 0..SESSIONS_PER_CONCLUSION {
            let result = simulate(&mut graph, conclusion, &mut rng)?;
            asked += result.len();
            results.add_result(result)?;
        }
        println!(
            "  {:<8} {} sessions, {:.1} questions per session",
            conclusion,
            SESSIONS_PER_CONCLUSION,
            asked as f64 / SESSIONS_PER_CONCLUSION as f64
        );
    }
    info!(sessions = results.len(), "simulation finished");
    println!();

    // --- Phase 3: Similarity ---
    let config = ScoringConfig::default();
    if let Some(matrix) = results.matrix("flu") {
        println!("── Phase 3: Histogram Intersection (flu) ──────────────");
        print!("{}", matrix.correlation_table(&config)?);
        println!();

        // --- Phase 4: Scores ---
        println!("── Phase 4: Discrimination Scores (flu) ───────────────");
        for (question, answers) in matrix.get_correlation_with(&config)? {
            for (answer, scores) in answers {
                let ranked = scores
                    .iter()
                    .map(|(other, score)| format!("{}={:.2}", other, score))
                    .collect::<Vec<_>>()
                    .join("  ");
                println!("  {:>11}={:<4} {}", question, answer, ranked);
            }
        }
        println!();
    }

    // --- Phase 5: Report ---
    println!("── Phase 5: JSON Report ───────────────────────────────");
    let report = results.report(&config)?;
    println!("{}", report.to_json()?);

    Ok(())
}
