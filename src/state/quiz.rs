use rand::Rng;
use rand::seq::SliceRandom;
use torikumi_api::{Basho, Predictions, QuizBashoData, QuizMatch, Side};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuizPhase {
    #[default]
    Idle,
    Playing,
    /// Answers are shown one bout per tick; `revealed` bouts are visible.
    Revealing { revealed: usize },
    Result,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

impl QuizScore {
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// A replay of one historical day: pick winners, then check them.
#[derive(Debug, Default)]
pub struct QuizSession {
    pub phase: QuizPhase,
    pub basho_label: String,
    pub day: String,
    pub matches: Vec<QuizMatch>,
    pub predictions: Predictions,
    pub score: QuizScore,
}

/// Choose a random basho from a quiz index listing.
pub fn pick_basho<'a, R: Rng + ?Sized>(basho_list: &'a [Basho], rng: &mut R) -> Option<&'a Basho> {
    basho_list.choose(rng)
}

/// Choose a random day of a basho, skipping days without bouts.
pub fn pick_day<'a, R: Rng + ?Sized>(
    data: &'a QuizBashoData,
    rng: &mut R,
) -> Option<(&'a str, &'a [QuizMatch])> {
    let playable: Vec<&str> = data
        .day_keys()
        .into_iter()
        .filter(|k| data.days.get(*k).is_some_and(|m| !m.is_empty()))
        .collect();
    let day = *playable.choose(rng)?;
    Some((day, data.days[day].as_slice()))
}

impl QuizSession {
    /// Start a round. Every bout begins predicted as an east win.
    pub fn begin(&mut self, basho_label: &str, day: &str, matches: Vec<QuizMatch>) {
        self.predictions = (0..matches.len()).map(|i| (i, Some(Side::East))).collect();
        self.basho_label = basho_label.to_string();
        self.day = day.to_string();
        self.matches = matches;
        self.score = QuizScore::default();
        self.phase = QuizPhase::Playing;
    }

    /// Start a round on a random day of `data`. Returns false when it has no bouts.
    pub fn begin_random<R: Rng + ?Sized>(&mut self, data: &QuizBashoData, rng: &mut R) -> bool {
        let Some((day, matches)) = pick_day(data, rng) else {
            return false;
        };
        self.begin(&data.basho.label, day, matches.to_vec());
        true
    }

    pub fn set_prediction(&mut self, index: usize, side: Side) {
        if self.phase != QuizPhase::Playing || index >= self.matches.len() {
            return;
        }
        self.predictions = self.predictions.with(index, Some(side));
    }

    pub fn toggle(&mut self, index: usize) {
        let side = self.predictions.winner_or_default(index).opposite();
        self.set_prediction(index, side);
    }

    /// Whether the pick for `index` matches the real result.
    pub fn is_correct(&self, index: usize) -> bool {
        self.matches
            .get(index)
            .is_some_and(|m| self.predictions.winner_or_default(index) == m.winner)
    }

    pub fn submit(&mut self) {
        if self.phase != QuizPhase::Playing {
            return;
        }
        let correct = (0..self.matches.len()).filter(|&i| self.is_correct(i)).count();
        self.score = QuizScore { correct, total: self.matches.len() };
        self.phase = QuizPhase::Revealing { revealed: 0 };
    }

    /// Advance the reveal by one bout; one extra tick after the last bout shows the result.
    pub fn tick(&mut self) {
        if let QuizPhase::Revealing { revealed } = self.phase {
            self.phase = if revealed < self.matches.len() {
                QuizPhase::Revealing { revealed: revealed + 1 }
            } else {
                QuizPhase::Result
            };
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        match self.phase {
            QuizPhase::Revealing { revealed } => index < revealed,
            QuizPhase::Result => true,
            _ => false,
        }
    }

    pub fn exit(&mut self) {
        *self = Self::default();
    }
}
