//! Geo Quest - Entry Point
//!
//! Interactive text client. Sensors are simulated: `fix` and `walk` move the
//! player, `heading` turns them. The logical clock follows the wall clock
//! between commands; `tick` pushes it further.

use geo_quest::core::error::Result;
use geo_quest::core::types::{HeadingSample, LatLng, PositionFix};
use geo_quest::core::QuestConfig;
use geo_quest::evaluator::Answer;
use geo_quest::geodesy;
use geo_quest::journal::QuestJournal;
use geo_quest::quest::{PuzzleInput, QuestEvent, QuestMachine, QuestState};
use geo_quest::questions::{ChoiceLabel, Payload, QuestionBank, QuestionSource};
use geo_quest::sensors::{
    LocationReading, SensorError, SensorFeed, SimulatedHeadingSensor, SimulatedLocationSensor,
};

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Hauptwache, Frankfurt
const START: LatLng = LatLng::new(50.1141, 8.6786);

/// Location-based trivia quest
#[derive(Parser, Debug)]
#[command(name = "geo-quest")]
#[command(about = "Answer trivia, then walk to the place the answer names")]
struct Args {
    /// Question file path or http(s) URL
    #[arg(long, default_value = "data/questions.csv")]
    questions: String,

    /// TOML config; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for the question order
    #[arg(long)]
    seed: Option<u64>,

    /// Journal file for visited places and best score
    #[arg(long, default_value = "data/journal.json")]
    journal: PathBuf,

    /// Simulate a device that refuses location access
    #[arg(long)]
    no_gps: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geo_quest=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => QuestConfig::load(path)?,
        None => QuestConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    // Question fetch is the only async work
    let rt = Runtime::new()?;
    let raw = rt.block_on(QuestionSource::from_arg(&args.questions).fetch());
    let bank = QuestionBank::load_or_fallback(raw);
    if bank.report().used_fallback {
        tracing::warn!("Using the built-in Frankfurt questions");
    }

    let mut journal = QuestJournal::load(&args.journal).unwrap_or_else(|e| {
        tracing::warn!("Journal unreadable ({}), starting a new one", e);
        QuestJournal::new()
    });

    let (location, gps) = SimulatedLocationSensor::new();
    let (heading, compass) = SimulatedHeadingSensor::new();
    if args.no_gps {
        gps.fail_with(SensorError::PermissionDenied);
    }

    let mut quest = QuestMachine::new(bank, Box::new(location), Some(Box::new(heading)), config);
    let mut here = START;

    println!("\n=== GEO QUEST ===");
    println!("{} questions loaded", quest.bank().len());
    print_help();

    let mut last_input = Instant::now();
    loop {
        flush_events(&mut quest, &mut journal, &args.journal);
        display_status(&quest, here);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let now = Instant::now();
        quest.advance_time(now - last_input);
        last_input = now;

        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        let outcome = match command {
            "quit" | "q" => break,
            "help" | "h" => {
                print_help();
                Ok(())
            }
            "start" => quest.start().map(|_| ()),
            "answer" | "a" => match rest.first().map(|s| s.parse::<ChoiceLabel>()) {
                Some(Ok(label)) => quest.submit_answer(Answer::Choice(label)).map(|_| ()),
                _ => {
                    println!("Usage: answer <A|B|C|D>");
                    Ok(())
                }
            },
            "pick" => {
                if rest.is_empty() {
                    println!("Usage: pick <option text>");
                    Ok(())
                } else {
                    quest.submit_answer(Answer::Picture(rest.join(" "))).map(|_| ())
                }
            }
            "letter" | "l" => match rest.first().map(|s| s.parse::<usize>()) {
                Some(Ok(tile)) => quest.toggle_letter(tile).map(|_| ()),
                _ => {
                    println!("Usage: letter <tile number>");
                    Ok(())
                }
            },
            "word" | "w" => quest.submit_letters().map(|_| ()),
            "dot" | "d" => match rest.first() {
                Some(label) => quest.connect_dot(label).map(|_| ()),
                None => {
                    println!("Usage: dot <1-4>");
                    Ok(())
                }
            },
            "fix" => match parse_fix(rest) {
                Some((position, accuracy)) => {
                    here = position;
                    push_fix(&gps, &mut quest, position, accuracy);
                    Ok(())
                }
                None => {
                    println!("Usage: fix <lat> <lng> [accuracy_m]");
                    Ok(())
                }
            },
            "walk" => match (rest.first().map(|s| s.parse::<f64>()), quest.tracker().target()) {
                (Some(Ok(meters)), Some(target)) => {
                    here = geodesy::step_toward(here, target, meters);
                    push_fix(&gps, &mut quest, here, Some(5.0));
                    Ok(())
                }
                (Some(Ok(_)), None) => {
                    println!("Nowhere to walk to yet");
                    Ok(())
                }
                _ => {
                    println!("Usage: walk <meters>");
                    Ok(())
                }
            },
            "heading" => match rest.first().map(|s| s.parse::<f64>()) {
                Some(Ok(degrees)) => {
                    if !compass.push_heading(degrees) {
                        quest.on_heading(HeadingSample::new(degrees));
                    }
                    quest.poll();
                    Ok(())
                }
                _ => {
                    println!("Usage: heading <degrees>");
                    Ok(())
                }
            },
            "tick" | "t" => {
                let ms = rest.first().and_then(|s| s.parse::<u64>().ok()).unwrap_or(1000);
                quest.advance_time(Duration::from_millis(ms));
                Ok(())
            }
            "skip" => quest.skip().map(|_| ()),
            "claim" => quest.claim_discount().map(|_| ()),
            "continue" | "c" => quest.continue_quest().map(|_| ()),
            "retry" => quest.retry().map(|_| ()),
            "restart" => {
                quest.restart();
                here = START;
                Ok(())
            }
            "journal" | "j" => {
                display_journal(&journal, &quest);
                Ok(())
            }
            other => {
                println!("Unknown command '{}'. Type 'help' for the list.", other);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("! {}", e);
        }
    }

    flush_events(&mut quest, &mut journal, &args.journal);
    println!("Goodbye!");
    Ok(())
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  start               - Begin the quest");
    println!("  answer <A-D>        - Answer a multiple choice question");
    println!("  pick <text>         - Choose a picture option");
    println!("  letter <n>          - Toggle letter tile n");
    println!("  word                - Submit the selected letters");
    println!("  dot <1-4>           - Connect the next dot");
    println!("  fix <lat> <lng> [m] - Report a GPS fix");
    println!("  walk <meters>       - Walk toward the target");
    println!("  heading <deg>       - Turn to face a compass heading");
    println!("  tick [ms]           - Let time pass");
    println!("  skip                - Give up on the current location");
    println!("  claim / continue    - Claim the discount / move on");
    println!("  retry / restart     - Try again / start over");
    println!("  journal             - Places visited so far");
    println!("  quit                - Exit");
    println!();
}

fn parse_fix(args: &[&str]) -> Option<(LatLng, Option<f64>)> {
    let lat = args.first()?.parse::<f64>().ok()?;
    let lng = args.get(1)?.parse::<f64>().ok()?;
    let accuracy = args.get(2).and_then(|s| s.parse::<f64>().ok());
    Some((LatLng::new(lat, lng), accuracy))
}

/// Deliver over the live watch when there is one, directly otherwise
fn push_fix(
    gps: &SensorFeed<LocationReading>,
    quest: &mut QuestMachine,
    position: LatLng,
    accuracy: Option<f64>,
) {
    if gps.push_position(position, accuracy) {
        quest.poll();
    } else {
        quest.on_fix(PositionFix::at(position, accuracy));
    }
}

fn flush_events(quest: &mut QuestMachine, journal: &mut QuestJournal, path: &Path) {
    let mut dirty = false;
    for event in quest.drain_events() {
        dirty |= journal.observe(&event);
        render_event(&event, quest);
    }
    if dirty {
        if let Err(e) = journal.save(path) {
            tracing::warn!("Could not save journal: {}", e);
        }
    }
}

fn render_event(event: &QuestEvent, quest: &QuestMachine) {
    match event {
        QuestEvent::QuestionPresented { index, total, question, .. } => {
            println!();
            println!("--- Question {} of {} ---", index + 1, total);
            if let Some(q) = quest.bank().get(*question) {
                println!("{}", q.text);
                match &q.payload {
                    Payload::MultipleChoice(mc) => {
                        for label in ChoiceLabel::ALL {
                            println!("  {}) {}", label, mc.choice(label));
                        }
                    }
                    Payload::PictureMatch(pm) => {
                        for option in &pm.options {
                            println!("  [picture] {}", option);
                        }
                    }
                    Payload::WordPuzzle(_) | Payload::ConnectPuzzle(_) => {}
                }
            }
        }
        QuestEvent::AnswerEvaluated { verdict, score, .. } => {
            if verdict.correct {
                println!("Correct! +{} (score {})", verdict.score_delta, score);
            } else {
                println!("Wrong answer (score {})", score);
            }
        }
        QuestEvent::ChallengeArmed { location_name, target, .. } => {
            println!("Now walk to {} at {}", location_name, target);
        }
        QuestEvent::Proximity(report) => {
            println!(
                "{:.0}m to go ({:.0}%) - {}",
                report.distance_m,
                report.progress_pct,
                report.proximity.hint()
            );
        }
        QuestEvent::Heading { relative_bearing_deg } => {
            println!("Target bears {:.0} degrees off your heading", relative_bearing_deg);
        }
        QuestEvent::SensorUnavailable { reason } => {
            println!("Location unavailable: {}. You can 'skip' this place.", reason);
        }
        QuestEvent::Arrived { bonus, score, .. } => {
            println!("You made it! +{} (score {})", bonus, score);
        }
        QuestEvent::RewardOffered(offer) => {
            println!("Reward at {}: {} Code: {}", offer.business, offer.description, offer.code);
            println!("Type 'claim' to redeem, 'continue' to move on.");
        }
        QuestEvent::DiscountClaimed { code, bonus, score } => {
            println!("Claimed {} +{} (score {})", code, bonus, score);
        }
        QuestEvent::ChallengeSkipped { .. } => println!("Skipped."),
        QuestEvent::QuestCompleted { final_score, .. } => {
            println!();
            println!("*** VICTORY! Final score: {} ***", final_score);
        }
        QuestEvent::Defeated { score, .. } => {
            println!("Defeat. Score {}. Type 'retry' or 'restart'.", score);
        }
        QuestEvent::Restarted => println!("Quest reset."),
        QuestEvent::QuestionsShuffled { .. }
        | QuestEvent::QuestStarted { .. }
        | QuestEvent::LocationVisited { .. }
        | QuestEvent::Retrying { .. } => {}
    }
}

fn display_status(quest: &QuestMachine, here: LatLng) {
    let mut line = format!("[{}] score {}", quest.state(), quest.score());
    match quest.state() {
        QuestState::AwaitingAnswer => match quest.puzzle() {
            PuzzleInput::Letters(selection) => {
                let tiles: Vec<String> = selection
                    .tiles()
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        if selection.is_selected(i) {
                            format!("({})", c)
                        } else {
                            c.to_string()
                        }
                    })
                    .collect();
                line.push_str(&format!(
                    " | tiles {} | word '{}'",
                    tiles.join(" "),
                    selection.word()
                ));
            }
            PuzzleInput::Dots(selection) => {
                line.push_str(&format!(" | dots {}", selection.connected().join("-")));
            }
            PuzzleInput::None => {}
        },
        QuestState::AwaitingArrival => {
            line.push_str(&format!(" | you are at {}", here));
        }
        _ => {}
    }
    println!("{}", line);
}

fn display_journal(journal: &QuestJournal, quest: &QuestMachine) {
    let summary = journal.summary(quest.bank());
    let scores = journal.scores();
    println!();
    println!("Places tagged: {} ({} to go)", summary.tagged, summary.remaining);
    for entry in &summary.entries {
        println!("  [{}] {}", if entry.visited { "x" } else { " " }, entry.name);
    }
    println!("Best score {} over {} games", scores.best_score, scores.total_games);
}
