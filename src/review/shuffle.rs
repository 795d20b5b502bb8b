//! Quiz option shuffling
//!
//! Presentation order of quiz options is randomized per question instance.
//! The random source is injected so shuffle correctness is testable with
//! seeded generators.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::content::QuizQuestion;

/// Return a copy of the question with its options in shuffled order and
/// `correct_index` remapped to keep pointing at the correct answer text.
///
/// The input is not mutated. The multiset of option texts is unchanged
/// for every permutation, including the identity permutation.
pub fn shuffle_options<R: Rng>(question: &QuizQuestion, rng: &mut R) -> QuizQuestion {
    let mut pairs: Vec<(usize, String)> = question.options.iter().cloned().enumerate().collect();
    pairs.shuffle(rng);

    // correct_index is validated to be in range, so the pair is always found
    let correct_index = pairs
        .iter()
        .position(|(original, _)| *original == question.correct_index)
        .unwrap_or(question.correct_index);

    let mut shuffled = question.clone();
    shuffled.options = pairs.into_iter().map(|(_, text)| text).collect();
    shuffled.correct_index = correct_index;
    shuffled
}
