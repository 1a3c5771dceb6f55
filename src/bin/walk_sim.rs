//! Headless Walk Simulator
//!
//! Plays whole quests with an autopilot that answers, walks to each target
//! with noisy GPS and claims every discount. Prints a JSON summary.

use geo_quest::core::types::LatLng;
use geo_quest::core::QuestConfig;
use geo_quest::evaluator::Answer;
use geo_quest::geodesy;
use geo_quest::quest::{QuestEvent, QuestMachine, QuestState};
use geo_quest::questions::{ChoiceLabel, Payload, Question, QuestionBank, QuestionSource};
use geo_quest::sensors::SimulatedLocationSensor;

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Headless Walk Simulator - autopilot quests for tuning arrival settings
#[derive(Parser, Debug)]
#[command(name = "walk_sim")]
#[command(about = "Play quests with an autopilot and output a JSON summary")]
struct Args {
    /// Question file path or http(s) URL; built-in questions when omitted
    #[arg(long)]
    questions: Option<String>,

    /// TOML config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Meters walked per GPS fix
    #[arg(long, default_value_t = 25.0)]
    step_m: f64,

    /// Random variation of each step, in meters
    #[arg(long, default_value_t = 5.0)]
    jitter_m: f64,

    /// Worst GPS accuracy the autopilot reports
    #[arg(long, default_value_t = 30.0)]
    max_accuracy_m: f64,

    /// Chance of answering a question wrong before retrying
    #[arg(long, default_value_t = 0.0)]
    wrong_rate: f64,

    /// Give up walking after this many fixes and skip
    #[arg(long, default_value_t = 500)]
    max_steps: u32,

    /// Where every walk begins
    #[arg(long, default_value_t = 50.1141)]
    start_lat: f64,

    #[arg(long, default_value_t = 8.6786)]
    start_lng: f64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose event logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Wrong answers per game before the autopilot stops making mistakes
const MAX_RETRIES: u32 = 100;

/// JSON output structure
#[derive(Serialize)]
struct SimSummary {
    seed: u64,
    questions: usize,
    used_fallback: bool,
    games: Vec<GameResult>,
    mean_score: f64,
}

#[derive(Serialize, Default)]
struct GameResult {
    outcome: String,
    final_score: u32,
    fixes: u32,
    meters_walked: f64,
    arrivals: u32,
    skips: u32,
    retries: u32,
    discounts: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geo_quest=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut config = match &args.config {
        Some(path) => QuestConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config '{}': {}", path.display(), e);
            eprintln!("Using default config");
            QuestConfig::default()
        }),
        None => QuestConfig::default(),
    };
    config.seed = Some(seed);

    let bank = match &args.questions {
        Some(arg) => match Runtime::new() {
            Ok(rt) => {
                QuestionBank::load_or_fallback(rt.block_on(QuestionSource::from_arg(arg).fetch()))
            }
            Err(e) => {
                eprintln!("Warning: no async runtime ({}), using built-in questions", e);
                QuestionBank::embedded()
            }
        },
        None => QuestionBank::embedded(),
    };
    let question_count = bank.len();
    let used_fallback = bank.report().used_fallback;

    let (sensor, gps) = SimulatedLocationSensor::new();
    let mut quest = QuestMachine::new(bank, Box::new(sensor), None, config);
    let start = LatLng::new(args.start_lat, args.start_lng);

    let mut games = Vec::with_capacity(args.games as usize);
    for game in 0..args.games {
        if game > 0 {
            quest.restart();
        }
        if let Err(e) = quest.start() {
            eprintln!("Cannot start quest: {}", e);
            break;
        }

        let mut result = GameResult::default();
        let mut here = start;
        let mut steps = 0u32;

        while quest.state() != QuestState::Victory {
            match quest.state() {
                QuestState::AwaitingAnswer => {
                    let miss = result.retries < MAX_RETRIES
                        && rng.gen_bool(args.wrong_rate.clamp(0.0, 1.0));
                    let answer = match quest.current_question() {
                        Some(q) if miss => wrong_answer(q),
                        Some(q) => q.solution(),
                        None => break,
                    };
                    if let Err(e) = quest.submit_answer(answer) {
                        eprintln!("Answer rejected: {}", e);
                        break;
                    }
                }
                QuestState::Feedback { .. } => {
                    quest.advance_time(quest.config().timing.feedback_delay());
                }
                QuestState::AwaitingArrival => {
                    let Some(target) = quest.tracker().target() else {
                        break;
                    };
                    if steps >= args.max_steps || !gps.is_watched() {
                        if quest.skip().is_ok() {
                            steps = 0;
                        }
                        continue;
                    }
                    let jitter = args.jitter_m.abs();
                    let stride = (args.step_m + rng.gen_range(-jitter..=jitter)).max(1.0);
                    let next = geodesy::step_toward(here, target, stride);
                    result.meters_walked += geodesy::distance_meters(here, next);
                    here = next;
                    steps += 1;
                    result.fixes += 1;

                    let accuracy = rng.gen_range(3.0..=args.max_accuracy_m.max(3.0));
                    gps.push_position(here, Some(accuracy));
                    quest.poll();
                    if quest.state() != QuestState::AwaitingArrival {
                        steps = 0;
                    }
                }
                QuestState::Reward => {
                    if let Err(e) = quest.claim_discount() {
                        if args.verbose {
                            eprintln!("  Discount not claimed: {}", e);
                        }
                    }
                    if let Err(e) = quest.continue_quest() {
                        if args.verbose {
                            eprintln!("  Cannot continue: {}", e);
                        }
                        break;
                    }
                }
                QuestState::Defeat => {
                    if quest.retry().is_err() {
                        break;
                    }
                }
                QuestState::NotStarted | QuestState::Victory => break,
            }

            tally(&mut quest, &mut result, args.verbose);
        }
        tally(&mut quest, &mut result, args.verbose);

        result.outcome = quest.state().to_string();
        result.final_score = quest.score();
        games.push(result);
    }

    let mean_score = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.final_score as f64).sum::<f64>() / games.len() as f64
    };

    let summary = SimSummary {
        seed,
        questions: question_count,
        used_fallback,
        games,
        mean_score,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Count what happened since the last call
fn tally(quest: &mut QuestMachine, result: &mut GameResult, verbose: bool) {
    for event in quest.drain_events() {
        if verbose {
            eprintln!("  {:?}", event);
        }
        match event {
            QuestEvent::Arrived { .. } => result.arrivals += 1,
            QuestEvent::ChallengeSkipped { .. } => result.skips += 1,
            QuestEvent::Retrying { .. } => result.retries += 1,
            QuestEvent::DiscountClaimed { code, .. } => result.discounts.push(code),
            _ => {}
        }
    }
}

/// Something that is certainly not the solution
fn wrong_answer(question: &Question) -> Answer {
    match &question.payload {
        Payload::MultipleChoice(mc) => {
            let next = ChoiceLabel::ALL[(mc.correct.index() + 1) % ChoiceLabel::ALL.len()];
            Answer::Choice(next)
        }
        Payload::PictureMatch(_) => Answer::Picture(String::new()),
        Payload::WordPuzzle(_) => Answer::Letters(String::new()),
        Payload::ConnectPuzzle(cp) => {
            Answer::Dots(cp.expected_order.iter().rev().cloned().collect())
        }
    }
}
