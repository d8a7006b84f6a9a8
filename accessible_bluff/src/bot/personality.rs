//! Personality catalog.
//!
//! A personality is an immutable bundle of biases applied on top of a
//! difficulty tier's strategy: additive bluff/challenge modifiers, a
//! multi-card propensity, risk tolerance (a late multiplier on challenge
//! probability), the adaptive rate used by the bot's memory, optional
//! uniform noise and a bank of flavor lines.
//!
//! | Personality   | Bluff | Challenge | Multi-card | Risk | Adaptive | Noise |
//! |---------------|-------|-----------|------------|------|----------|-------|
//! | Aggressive    | +0.30 | +0.25     | +0.20      | 0.8  | 0.15     | 0     |
//! | Cautious      | -0.20 | -0.15     | -0.10      | 0.3  | 0.20     | 0     |
//! | Balanced      | 0     | 0         | 0          | 0.5  | 0.25     | 0     |
//! | Unpredictable | +0.10 | +0.10     | +0.10      | 0.6  | 0.10     | ±0.4  |

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::BotDifficulty;
use crate::game::entities::ActionKind;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityKind {
    Aggressive,
    Cautious,
    Balanced,
    Unpredictable,
}

/// Occasions a bot can say something.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LineKind {
    Place,
    Challenge,
    Pass,
    Win,
    Lose,
}

impl From<ActionKind> for LineKind {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Place => LineKind::Place,
            ActionKind::Challenge => LineKind::Challenge,
            ActionKind::Pass => LineKind::Pass,
        }
    }
}

#[derive(Debug)]
pub struct FlavorLines {
    pub place: &'static [&'static str],
    pub challenge: &'static [&'static str],
    pub pass: &'static [&'static str],
    pub win: &'static [&'static str],
    pub lose: &'static [&'static str],
}

impl FlavorLines {
    pub fn get(&self, kind: LineKind) -> &'static [&'static str] {
        match kind {
            LineKind::Place => self.place,
            LineKind::Challenge => self.challenge,
            LineKind::Pass => self.pass,
            LineKind::Win => self.win,
            LineKind::Lose => self.lose,
        }
    }
}

#[derive(Debug)]
pub struct Personality {
    pub kind: PersonalityKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Added to every base bluff probability.
    pub bluff_modifier: f32,
    /// Added to every base challenge probability.
    pub challenge_modifier: f32,
    /// Added to the chance of putting down more than one card.
    pub multi_card_modifier: f32,
    /// Final challenge probability is scaled by `risk_tolerance * 2`.
    pub risk_tolerance: f32,
    /// Blend rate for memory updates.
    pub adaptive_rate: f32,
    /// Half-width of the uniform noise added to challenge decisions.
    pub randomness_factor: f32,
    /// Added to the base pass probability.
    pub pass_modifier: f32,
    pub lines: FlavorLines,
}

pub static AGGRESSIVE: Personality = Personality {
    kind: PersonalityKind::Aggressive,
    name: "Aggressive",
    description: "Bluffs often and challenges at the slightest doubt",
    bluff_modifier: 0.3,
    challenge_modifier: 0.25,
    multi_card_modifier: 0.2,
    risk_tolerance: 0.8,
    adaptive_rate: 0.15,
    randomness_factor: 0.0,
    pass_modifier: -0.1,
    lines: FlavorLines {
        place: &["Beat that!", "Here it comes!", "Your move, if you dare."],
        challenge: &["Liar!", "No way that's true!", "Show me those cards!"],
        pass: &["Fine, I'll sit this one out.", "Enjoy it while it lasts."],
        win: &["Too easy!", "Nobody stops me!", "Another one for me."],
        lose: &["Pure luck.", "Rematch. Now.", "I'll get you next time."],
    },
};

pub static CAUTIOUS: Personality = Personality {
    kind: PersonalityKind::Cautious,
    name: "Cautious",
    description: "Rarely bluffs and only challenges when the odds are clear",
    bluff_modifier: -0.2,
    challenge_modifier: -0.15,
    multi_card_modifier: -0.1,
    risk_tolerance: 0.3,
    adaptive_rate: 0.2,
    randomness_factor: 0.0,
    pass_modifier: 0.1,
    lines: FlavorLines {
        place: &["This should be safe.", "Carefully now.", "I'll play it straight."],
        challenge: &[
            "The numbers don't add up.",
            "I've been counting. That can't be right.",
            "I'm fairly sure that's a bluff.",
        ],
        pass: &["Not worth the risk.", "I'll wait and see.", "Pass, for now."],
        win: &["Patience pays.", "Slow and steady.", "Every move counted."],
        lose: &["I must have miscounted.", "Time to rethink my approach."],
    },
};

pub static BALANCED: Personality = Personality {
    kind: PersonalityKind::Balanced,
    name: "Balanced",
    description: "Mixes honest play with the occasional bluff",
    bluff_modifier: 0.0,
    challenge_modifier: 0.0,
    multi_card_modifier: 0.0,
    risk_tolerance: 0.5,
    adaptive_rate: 0.25,
    randomness_factor: 0.0,
    pass_modifier: 0.0,
    lines: FlavorLines {
        place: &["Here's my play.", "Let's see where this goes.", "A reasonable move."],
        challenge: &["I'm calling that.", "That doesn't sound right.", "Let's have a look."],
        pass: &["I'll pass.", "Not this time.", "Moving on."],
        win: &["Good game, everyone!", "That went well.", "Nicely played, all."],
        lose: &["Well played.", "I'll adjust next time.", "Good game."],
    },
};

pub static UNPREDICTABLE: Personality = Personality {
    kind: PersonalityKind::Unpredictable,
    name: "Unpredictable",
    description: "Changes style from one moment to the next",
    bluff_modifier: 0.1,
    challenge_modifier: 0.1,
    multi_card_modifier: 0.1,
    risk_tolerance: 0.6,
    adaptive_rate: 0.1,
    randomness_factor: 0.4,
    pass_modifier: 0.0,
    lines: FlavorLines {
        place: &["How about this?", "Something different.", "Let's shake things up."],
        challenge: &["Hold on!", "Something smells off.", "Let's see what's really there!"],
        pass: &["Not yet...", "Maybe later.", "Pass! Or was it?"],
        win: &["Didn't see that coming, did you?", "Chaos wins again!", "Surprise!"],
        lose: &["Huh. Interesting.", "Well, that was unexpected.", "The cards had other plans."],
    },
};

impl PersonalityKind {
    pub const ALL: [PersonalityKind; 4] = [
        PersonalityKind::Aggressive,
        PersonalityKind::Cautious,
        PersonalityKind::Balanced,
        PersonalityKind::Unpredictable,
    ];

    pub fn personality(self) -> &'static Personality {
        match self {
            PersonalityKind::Aggressive => &AGGRESSIVE,
            PersonalityKind::Cautious => &CAUTIOUS,
            PersonalityKind::Balanced => &BALANCED,
            PersonalityKind::Unpredictable => &UNPREDICTABLE,
        }
    }

    /// Draw a personality weighted by difficulty: beginners lean cautious,
    /// intermediate is uniform, advanced leans aggressive/unpredictable.
    pub fn for_difficulty<R: Rng + ?Sized>(difficulty: BotDifficulty, rng: &mut R) -> Self {
        use PersonalityKind::*;
        let pool: &[PersonalityKind] = match difficulty {
            BotDifficulty::Beginner => &[Cautious, Cautious, Balanced, Aggressive],
            BotDifficulty::Intermediate => &Self::ALL,
            BotDifficulty::Advanced => &[
                Aggressive,
                Aggressive,
                Balanced,
                Unpredictable,
                Unpredictable,
            ],
        };
        pool.choose(rng).copied().unwrap_or(Balanced)
    }
}

impl fmt::Display for PersonalityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.personality().name)
    }
}

impl Personality {
    /// Uniform noise in `[-randomness_factor, randomness_factor]`.
    pub fn noise<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.randomness_factor <= 0.0 {
            return 0.0;
        }
        rng.random_range(-self.randomness_factor..=self.randomness_factor)
    }

    /// Random flavor line for the occasion, if the bank has any.
    pub fn line<R: Rng + ?Sized>(&self, kind: LineKind, rng: &mut R) -> Option<&'static str> {
        self.lines.get(kind).choose(rng).copied()
    }
}
