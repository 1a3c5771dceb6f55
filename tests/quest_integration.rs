//! End-to-end quest flows with simulated sensors

use geo_quest::core::types::{HeadingSample, LatLng, PositionFix};
use geo_quest::core::QuestConfig;
use geo_quest::evaluator::Answer;
use geo_quest::quest::{QuestEvent, QuestMachine, QuestState};
use geo_quest::questions::{ChoiceLabel, QuestionBank};
use geo_quest::sensors::{
    HeadingSensor, LocationReading, SensorError, SensorFeed, SimulatedHeadingSensor,
    SimulatedLocationSensor,
};
use std::time::Duration;

const SHIPPED: &str = include_str!("../data/questions.csv");

struct Harness {
    quest: QuestMachine,
    gps: SensorFeed<LocationReading>,
    compass: SensorFeed<HeadingSample>,
}

fn harness(raw: &str, delay_ms: u64) -> Harness {
    let mut config = QuestConfig::default();
    config.timing.feedback_delay_ms = delay_ms;
    config.seed = Some(11);

    let (location, gps) = SimulatedLocationSensor::new();
    let (heading, compass) = SimulatedHeadingSensor::new();
    let heading: Box<dyn HeadingSensor> = Box::new(heading);
    let quest = QuestMachine::new(
        QuestionBank::parse(raw),
        Box::new(location),
        Some(heading),
        config,
    );

    Harness { quest, gps, compass }
}

fn answer_correctly(quest: &mut QuestMachine) {
    let answer = quest.current_question().expect("question on screen").solution();
    let verdict = quest.submit_answer(answer).unwrap();
    assert!(verdict.correct);
}

fn walk_to_target(h: &mut Harness) {
    let target = h.quest.tracker().target().expect("challenge armed");
    assert!(h.gps.push_position(target, Some(4.0)));
    h.quest.poll();
}

#[test]
fn test_answer_then_arrive_scores_150() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();

    answer_correctly(&mut h.quest);
    assert_eq!(h.quest.state(), QuestState::AwaitingArrival);
    assert_eq!(h.quest.score(), 100);

    let commercial = h.quest.current_question().unwrap().is_commercial;
    walk_to_target(&mut h);
    assert_eq!(h.quest.score(), 150);
    if commercial {
        assert_eq!(h.quest.state(), QuestState::Reward);
        h.quest.continue_quest().unwrap();
    }
    assert_eq!(h.quest.current_index(), 1);
    assert_eq!(h.quest.state(), QuestState::AwaitingAnswer);
}

#[test]
fn test_full_playthrough_of_shipped_questions() {
    let mut h = harness(SHIPPED, 0);
    let total = h.quest.bank().len();
    assert_eq!(total, 7);
    h.quest.start().unwrap();

    while h.quest.state() != QuestState::Victory {
        match h.quest.state() {
            QuestState::AwaitingAnswer => answer_correctly(&mut h.quest),
            QuestState::AwaitingArrival => walk_to_target(&mut h),
            QuestState::Reward => {
                h.quest.claim_discount().unwrap();
                h.quest.continue_quest().unwrap();
            }
            other => panic!("unexpected state {}", other),
        }
    }

    // 7 answers, 7 arrivals, one discount
    assert_eq!(h.quest.score(), 7 * 150 + 100);
    assert!(!h.gps.is_watched());

    let events = h.quest.drain_events();
    let visited = events
        .iter()
        .filter(|e| matches!(e, QuestEvent::LocationVisited { .. }))
        .count();
    assert_eq!(visited, 7);
    assert!(events
        .iter()
        .any(|e| matches!(e, QuestEvent::DiscountClaimed { code, .. } if code == "BRUCHSAL20")));
    assert!(matches!(
        events.last(),
        Some(QuestEvent::QuestCompleted { final_score: 1150, .. })
    ));
}

#[test]
fn test_arrival_fires_once_for_queued_fixes() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    h.quest.drain_events();

    let target = h.quest.tracker().target().unwrap();
    for _ in 0..3 {
        h.gps.push_position(target, Some(5.0));
    }
    h.quest.poll();

    let arrivals = h
        .quest
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, QuestEvent::Arrived { .. }))
        .count();
    assert_eq!(arrivals, 1);
    assert!(!h.gps.push_position(target, Some(5.0)));
}

#[test]
fn test_poor_accuracy_widens_radius() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);

    let target = h.quest.tracker().target().unwrap();
    // about 25m north of the target
    let near = LatLng::new(target.lat + 0.000225, target.lng);

    h.gps.push_position(near, Some(10.0));
    h.quest.poll();
    assert_eq!(h.quest.state(), QuestState::AwaitingArrival);

    h.gps.push_position(near, Some(25.0));
    h.quest.poll();
    assert_ne!(h.quest.state(), QuestState::AwaitingArrival);
}

#[test]
fn test_skip_releases_sensors_without_bonus() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    assert!(h.gps.is_watched());
    assert!(h.compass.is_watched());

    h.quest.skip().unwrap();
    assert_eq!(h.quest.score(), 100);
    assert_eq!(h.quest.current_index(), 1);
    assert!(!h.gps.is_watched());
    assert!(!h.compass.is_watched());
    assert!(!h
        .quest
        .drain_events()
        .iter()
        .any(|e| matches!(e, QuestEvent::LocationVisited { .. } | QuestEvent::Arrived { .. })));
}

#[test]
fn test_dropping_the_machine_releases_sensors() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    assert!(h.gps.is_watched());

    let Harness { quest, gps, compass } = h;
    drop(quest);
    assert!(!gps.is_watched());
    assert!(!compass.is_watched());
}

#[test]
fn test_restart_from_victory() {
    let raw = "Question,A,B,C,D,Correct,Lat,Lng\n\
               Palace?,Schloss Bruchsal,B,C,D,Schloss Bruchsal,49.1247,8.5978\n";
    let mut h = harness(raw, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    walk_to_target(&mut h);
    assert_eq!(h.quest.state(), QuestState::Victory);
    assert_eq!(h.quest.score(), 150);
    h.quest.drain_events();

    assert_eq!(h.quest.restart(), QuestState::NotStarted);
    assert_eq!(h.quest.score(), 0);
    assert_eq!(h.quest.current_index(), 0);
    let events = h.quest.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, QuestEvent::QuestionsShuffled { count: 1 })));

    h.quest.start().unwrap();
    assert_eq!(h.quest.state(), QuestState::AwaitingAnswer);
}

#[test]
fn test_feedback_delay_and_cancel() {
    let mut h = harness(SHIPPED, 1500);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    assert_eq!(h.quest.state(), QuestState::Feedback { correct: true });

    h.quest.advance_time(Duration::from_millis(1000));
    assert_eq!(h.quest.state(), QuestState::Feedback { correct: true });
    assert!(!h.gps.is_watched());

    h.quest.advance_time(Duration::from_millis(600));
    assert_eq!(h.quest.state(), QuestState::AwaitingArrival);

    // a second answer, cancelled by restart before the timer fires
    h.quest.skip().unwrap();
    answer_correctly(&mut h.quest);
    h.quest.restart();
    h.quest.advance_time(Duration::from_secs(10));
    assert_eq!(h.quest.state(), QuestState::NotStarted);
    assert!(!h.gps.is_watched());
}

#[test]
fn test_wrong_answer_defeat_and_retry() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();

    let question = h.quest.current_question().unwrap().clone();
    // flip the correct answer into a wrong one of the same kind
    let wrong = match question.solution() {
        Answer::Choice(label) => Answer::Choice(ChoiceLabel::ALL[(label.index() + 1) % 4]),
        Answer::Picture(_) => Answer::Picture("nothing like it".into()),
        Answer::Letters(_) => Answer::Letters("X".into()),
        Answer::Dots(mut dots) => {
            dots.reverse();
            Answer::Dots(dots)
        }
    };

    assert!(!h.quest.submit_answer(wrong).unwrap().correct);
    assert_eq!(h.quest.state(), QuestState::Defeat);
    assert!(!h.gps.is_watched());

    h.quest.retry().unwrap();
    assert_eq!(h.quest.current_question().unwrap().id, question.id);
    assert_eq!(h.quest.score(), 0);
}

#[test]
fn test_sensor_failure_allows_skip() {
    let mut h = harness(SHIPPED, 0);
    h.gps.fail_with(SensorError::PermissionDenied);
    h.quest.start().unwrap();
    h.quest.drain_events();

    answer_correctly(&mut h.quest);
    assert_eq!(h.quest.state(), QuestState::AwaitingArrival);
    assert!(h.quest.drain_events().iter().any(|e| matches!(
        e,
        QuestEvent::SensorUnavailable {
            reason: SensorError::PermissionDenied
        }
    )));

    h.quest.skip().unwrap();
    assert_eq!(h.quest.state(), QuestState::AwaitingAnswer);
}

#[test]
fn test_sensor_error_reading_becomes_event() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    h.quest.drain_events();

    h.gps.push_error(SensorError::Timeout);
    h.quest.poll();
    assert_eq!(
        h.quest.drain_events(),
        vec![QuestEvent::SensorUnavailable {
            reason: SensorError::Timeout
        }]
    );
    assert_eq!(h.quest.state(), QuestState::AwaitingArrival);
}

#[test]
fn test_heading_gives_relative_bearing() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    answer_correctly(&mut h.quest);
    h.quest.drain_events();

    let target = h.quest.tracker().target().unwrap();
    // 500m due south of the target, facing east
    h.gps.push_position(LatLng::new(target.lat - 0.0045, target.lng), Some(5.0));
    h.compass.push_heading(90.0);
    h.quest.poll();

    let relative = h
        .quest
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            QuestEvent::Heading { relative_bearing_deg } => Some(relative_bearing_deg),
            _ => None,
        })
        .expect("heading event");
    assert!((relative - 270.0).abs() < 1.0, "got {}", relative);
}

#[test]
fn test_fix_outside_challenge_is_ignored() {
    let mut h = harness(SHIPPED, 0);
    h.quest.start().unwrap();
    h.quest.drain_events();

    h.quest.on_fix(PositionFix::new(49.1247, 8.5978, Some(5.0)));
    assert_eq!(h.quest.state(), QuestState::AwaitingAnswer);
    assert!(h.quest.drain_events().is_empty());
}

#[test]
fn test_shipped_config_loads() {
    let config = QuestConfig::from_toml_str(include_str!("../data/quest.toml")).unwrap();
    assert_eq!(config.seed, Some(2024));
    assert_eq!(config.rewards.offers.len(), 1);
    assert_eq!(config.timing.feedback_delay_ms, 1500);
}
