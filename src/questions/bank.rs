//! Question bank: parse, validate, shuffle
//!
//! The bank owns every `Question` for the lifetime of the program. Play
//! sessions only hold `QuestionId`s into it, so a restart can reshuffle
//! without touching the source again.

use rand::seq::SliceRandom;
use rand::Rng;

use super::csv::{data_rows, split_record};
use super::embedded::EMBEDDED_QUESTIONS;
use super::question::{
    ChoiceLabel, ConnectPuzzle, MultipleChoice, Payload, PictureMatch, Question, QuestionType,
    WordPuzzle,
};
use crate::core::error::Result;
use crate::core::types::{LatLng, QuestionId};

/// Question, four choices, correct answer, latitude, longitude
pub const MIN_FIELDS: usize = 8;

/// ExtraData marker for reward locations
pub const COMMERCIAL_MARKER: &str = "commercial";

/// Why a source row was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields(usize),
    EmptyQuestion,
    BadCoordinates,
}

/// What happened while parsing a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// (line number, reason) for every dropped row
    pub skipped: Vec<(usize, SkipReason)>,
    /// Multiple-choice questions whose answer text matched no choice
    pub unresolved_labels: Vec<QuestionId>,
    /// Picture or word puzzles no input can win: the answer is not one of
    /// the pictures, or the tiles do not spell it
    pub unwinnable: Vec<QuestionId>,
    pub used_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    report: LoadReport,
}

/// Parse a source blob into questions
///
/// Malformed rows are skipped, never fatal; the report says which.
pub fn parse_questions(raw: &str) -> (Vec<Question>, LoadReport) {
    let mut questions = Vec::new();
    let mut report = LoadReport::default();

    for (line_no, line) in data_rows(raw) {
        let fields = split_record(line);
        let id = QuestionId(questions.len());
        match parse_row(&fields, id) {
            Ok((question, flag)) => {
                match flag {
                    Some(RowFlag::UnresolvedLabel) => {
                        tracing::warn!(
                            "line {}: correct answer '{}' matches no choice, defaulting to A",
                            line_no,
                            question.correct_answer_text
                        );
                        report.unresolved_labels.push(id);
                    }
                    Some(RowFlag::Unwinnable) => {
                        tracing::warn!(
                            "line {}: no {} input can produce '{}'",
                            line_no,
                            question.question_type(),
                            question.correct_answer_text
                        );
                        report.unwinnable.push(id);
                    }
                    None => {}
                }
                questions.push(question);
            }
            Err(reason) => {
                tracing::debug!("skipping line {}: {:?}", line_no, reason);
                report.skipped.push((line_no, reason));
            }
        }
    }

    (questions, report)
}

/// Problems that keep a row but need reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowFlag {
    UnresolvedLabel,
    Unwinnable,
}

fn parse_row(
    fields: &[String],
    id: QuestionId,
) -> std::result::Result<(Question, Option<RowFlag>), SkipReason> {
    if fields.len() < MIN_FIELDS {
        return Err(SkipReason::TooFewFields(fields.len()));
    }
    if fields[0].is_empty() {
        return Err(SkipReason::EmptyQuestion);
    }

    let lat = fields[6].parse::<f64>().ok().filter(|v| v.is_finite());
    let lng = fields[7].parse::<f64>().ok().filter(|v| v.is_finite());
    let target = match (lat, lng) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng),
        _ => {
            tracing::warn!("question '{}' has unusable coordinates", fields[0]);
            return Err(SkipReason::BadCoordinates);
        }
    };

    let question_type = fields
        .get(8)
        .map_or(QuestionType::MultipleChoice, |t| QuestionType::from_source(t));
    let extra = fields.get(9).map(String::as_str).unwrap_or("");
    let correct_text = fields[5].clone();
    let four = [
        fields[1].clone(),
        fields[2].clone(),
        fields[3].clone(),
        fields[4].clone(),
    ];

    let mut flag = None;
    let payload = match question_type {
        QuestionType::MultipleChoice => {
            let (correct, found) = resolve_label(&four, &correct_text);
            if !found {
                flag = Some(RowFlag::UnresolvedLabel);
            }
            Payload::MultipleChoice(MultipleChoice { choices: four, correct })
        }
        QuestionType::PictureMatch => {
            if !four.contains(&correct_text) {
                flag = Some(RowFlag::Unwinnable);
            }
            Payload::PictureMatch(PictureMatch { options: four })
        }
        QuestionType::WordPuzzle => {
            let scrambled_letters = if extra.is_empty() {
                default_tiles(&correct_text)
            } else {
                extra.to_string()
            };
            if !spells(&scrambled_letters, &correct_text) {
                flag = Some(RowFlag::Unwinnable);
            }
            Payload::WordPuzzle(WordPuzzle { scrambled_letters })
        }
        QuestionType::ConnectPuzzle => Payload::ConnectPuzzle(ConnectPuzzle::new(four)),
    };

    let question = Question {
        id,
        text: fields[0].clone(),
        correct_answer_text: correct_text,
        target,
        is_commercial: extra == COMMERCIAL_MARKER,
        payload,
    };

    Ok((question, flag))
}

/// First choice (A..D) whose text equals the answer; A if none does
fn resolve_label(choices: &[String; 4], correct_text: &str) -> (ChoiceLabel, bool) {
    ChoiceLabel::ALL
        .iter()
        .copied()
        .find(|label| choices[label.index()] == correct_text)
        .map_or((ChoiceLabel::A, false), |label| (label, true))
}

/// True if the tiles are exactly the answer's letters, ignoring case
fn spells(tiles: &str, answer: &str) -> bool {
    default_tiles(tiles) == default_tiles(answer)
}

/// Tiles for a word puzzle with no scramble given: the answer's letters, sorted
fn default_tiles(answer: &str) -> String {
    let mut letters: Vec<char> = answer.to_uppercase().chars().collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            report: LoadReport::default(),
        }
    }

    /// Parse a source blob. May produce an empty bank.
    pub fn parse(raw: &str) -> Self {
        let (questions, report) = parse_questions(raw);
        tracing::info!(
            "Loaded {} questions ({} rows skipped)",
            questions.len(),
            report.skipped.len()
        );
        Self { questions, report }
    }

    /// The built-in minimal set
    pub fn embedded() -> Self {
        let mut bank = Self::parse(EMBEDDED_QUESTIONS);
        bank.report.used_fallback = true;
        bank
    }

    /// Use the source if it loaded and yielded questions, the embedded set otherwise
    pub fn load_or_fallback(source: Result<String>) -> Self {
        match source {
            Ok(raw) => {
                let bank = Self::parse(&raw);
                if bank.is_empty() {
                    tracing::warn!("Question source yielded no questions, using embedded set");
                    Self::embedded()
                } else {
                    bank
                }
            }
            Err(e) => {
                tracing::warn!("Question source failed ({}), using embedded set", e);
                Self::embedded()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id.0)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// A fresh uniformly random play order (Fisher–Yates)
    pub fn shuffle<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<QuestionId> {
        let mut order: Vec<QuestionId> = self.questions.iter().map(|q| q.id).collect();
        order.shuffle(rng);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::QuestError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const HEADER: &str = "Question,A,B,C,D,Correct,Lat,Lng,Type,Extra\n";

    fn bank_of(rows: &str) -> QuestionBank {
        QuestionBank::parse(&format!("{HEADER}{rows}"))
    }

    #[test]
    fn test_multiple_choice_resolves_label() {
        let bank = bank_of("Garden?,Botanischer Garten,Palmengarten,Grüneburgpark,Wallanlagen,Palmengarten,50.118,8.6512\n");
        let q = bank.get(QuestionId(0)).expect("one question");
        assert_eq!(q.question_type(), QuestionType::MultipleChoice);
        assert_eq!(q.correct_answer_label(), "B");
        assert!(!q.is_commercial);
        assert!(bank.report().unresolved_labels.is_empty());
    }

    #[test]
    fn test_first_matching_label_wins() {
        let bank = bank_of("Dup?,X,Same,Same,Y,Same,1,2\n");
        assert_eq!(bank.questions()[0].correct_answer_label(), "B");
    }

    #[test]
    fn test_unresolved_label_defaults_to_a() {
        let bank = bank_of("Typo?,One,Two,Three,Four,Fiv,1,2\n");
        assert_eq!(bank.questions()[0].correct_answer_label(), "A");
        assert_eq!(bank.report().unresolved_labels, vec![QuestionId(0)]);
    }

    #[test]
    fn test_quoted_question_with_commas() {
        let bank = bank_of("\"Which square, near the Main, hosts the Römer?\",Opernplatz,Hauptwache,Konstablerwache,Römerberg,Römerberg,50.1105,8.6827\n");
        let q = &bank.questions()[0];
        assert_eq!(q.text, "Which square, near the Main, hosts the Römer?");
        assert_eq!(q.correct_answer_label(), "D");
        assert_eq!(q.target, LatLng::new(50.1105, 8.6827));
    }

    #[test]
    fn test_short_and_empty_rows_skipped() {
        let bank = bank_of(
            "Too short,A,B,C\n\
             ,A,B,C,D,A,1,2\n\
             Kept?,A,B,C,D,C,1,2\n\
             Bad coords?,A,B,C,D,C,north,2\n",
        );
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].id, QuestionId(0));
        assert_eq!(bank.questions()[0].text, "Kept?");
        let reasons: Vec<_> = bank.report().skipped.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::TooFewFields(4),
                SkipReason::EmptyQuestion,
                SkipReason::BadCoordinates
            ]
        );
    }

    #[test]
    fn test_puzzle_variants() {
        let bank = bank_of(
            "Emoji?,🏰,🌳,⛪,🏛,🏰,49.12,8.59,picture_match\n\
             Spell it?,,,,,Palmengarten,50.118,8.6512,word_puzzle,NETRAGNEMLAP\n\
             Connect?,North wing,Garden,South wing,Gate,Schloss,49.12,8.59,connect_puzzle\n\
             Shop?,A,B,C,D,B,49.1,8.5,multiple_choice,commercial\n\
             Odd?,A,B,C,D,C,49.1,8.5,riddle\n",
        );
        let types: Vec<_> = bank.questions().iter().map(|q| q.question_type()).collect();
        assert_eq!(
            types,
            vec![
                QuestionType::PictureMatch,
                QuestionType::WordPuzzle,
                QuestionType::ConnectPuzzle,
                QuestionType::MultipleChoice,
                QuestionType::MultipleChoice,
            ]
        );

        match &bank.questions()[1].payload {
            Payload::WordPuzzle(w) => assert_eq!(w.scrambled_letters, "NETRAGNEMLAP"),
            other => panic!("expected word puzzle, got {other:?}"),
        }
        match &bank.questions()[2].payload {
            Payload::ConnectPuzzle(c) => {
                assert_eq!(c.expected_order, vec!["1", "2", "3", "4"]);
                assert_eq!(c.pieces[0], "North wing");
            }
            other => panic!("expected connect puzzle, got {other:?}"),
        }
        assert!(bank.questions()[3].is_commercial);
        assert_eq!(bank.questions()[4].correct_answer_label(), "C");
    }

    #[test]
    fn test_picture_answer_missing_from_options_is_flagged() {
        let bank = bank_of(
            "Pick?,Castle,Tree,Church,Museum,Schloss,49.1,8.5,picture_match\n\
             Pick again?,Castle,Tree,Schloss,Museum,Schloss,49.1,8.5,picture_match\n",
        );
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.report().unwinnable, vec![QuestionId(0)]);
        assert!(bank.report().unresolved_labels.is_empty());
    }

    #[test]
    fn test_word_tiles_must_spell_answer() {
        let bank = bank_of(
            "River?,,,,,Saalbach,49.12,8.59,word_puzzle,XYZ\n\
             River again?,,,,,Saalbach,49.12,8.59,word_puzzle,hbcaalas\n\
             One letter short?,,,,,Saalbach,49.12,8.59,word_puzzle,HBCAALA\n",
        );
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.report().unwinnable, vec![QuestionId(0), QuestionId(2)]);
    }

    #[test]
    fn test_word_puzzle_without_scramble_uses_answer_letters() {
        let bank = bank_of("Spell?,,,,,Dom,50,8,word_puzzle\n");
        match &bank.questions()[0].payload {
            Payload::WordPuzzle(w) => assert_eq!(w.scrambled_letters, "DMO"),
            other => panic!("expected word puzzle, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_on_error() {
        let bank = QuestionBank::load_or_fallback(Err(QuestError::Source("404".into())));
        assert_eq!(bank.len(), 5);
        assert!(bank.report().used_fallback);
    }

    #[test]
    fn test_fallback_on_empty_source() {
        let bank = QuestionBank::load_or_fallback(Ok("Question,A\n".into()));
        assert_eq!(bank.len(), 5);
        assert!(bank.report().used_fallback);
    }

    #[test]
    fn test_embedded_set_is_clean() {
        let bank = QuestionBank::embedded();
        assert_eq!(bank.len(), 5);
        assert!(bank.report().skipped.is_empty());
        assert!(bank.report().unresolved_labels.is_empty());
        assert!(bank.report().unwinnable.is_empty());
        assert!(bank
            .questions()
            .iter()
            .all(|q| q.question_type() == QuestionType::MultipleChoice));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let bank = QuestionBank::embedded();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut order = bank.shuffle(&mut rng);
        assert_eq!(order.len(), bank.len());
        order.sort();
        let ids: Vec<_> = (0..bank.len()).map(QuestionId).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let bank = QuestionBank::embedded();
        let a = bank.shuffle(&mut ChaCha8Rng::seed_from_u64(7));
        let b = bank.shuffle(&mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
