use std::str::FromStr;

/// Rounds in one practice session
pub const ROUNDS_PER_SESSION: u8 = 10;
/// Bags thrown per round
pub const THROWS_PER_ROUND: u8 = 4;

/// Where a single bag came to rest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Outcome {
    #[strum(to_string = "in hole")]
    InHole,
    #[strum(to_string = "on board")]
    OnBoard,
    #[strum(to_string = "off board")]
    Miss,
}

impl Outcome {
    pub fn points(self) -> u32 {
        match self {
            Outcome::InHole => 3,
            Outcome::OnBoard => 1,
            Outcome::Miss => 0,
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h" | "hole" | "in" | "inhole" => Ok(Outcome::InHole),
            "b" | "board" | "on" | "onboard" => Ok(Outcome::OnBoard),
            "m" | "miss" | "off" | "offboard" => Ok(Outcome::Miss),
            other => Err(format!("unknown throw outcome '{other}'")),
        }
    }
}

/// One bag toss; `number` is its position within the round (1-4)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throw {
    pub number: u8,
    pub outcome: Outcome,
}

impl Throw {
    pub fn new(number: u8, outcome: Outcome) -> Self {
        Self { number, outcome }
    }
}

/// Up to four throws sharing a round number (1-10)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub number: u8,
    pub throws: Vec<Throw>,
}

impl Round {
    pub fn new(number: u8) -> Self {
        Self {
            number,
            throws: Vec::with_capacity(THROWS_PER_ROUND as usize),
        }
    }

    /// Appends the next throw of this round. Returns false once the round is full.
    pub fn push(&mut self, outcome: Outcome) -> bool {
        if self.is_complete() {
            return false;
        }
        let number = self.throws.len() as u8 + 1;
        self.throws.push(Throw::new(number, outcome));
        true
    }

    pub fn pop(&mut self) -> Option<Throw> {
        self.throws.pop()
    }

    pub fn is_complete(&self) -> bool {
        self.throws.len() == THROWS_PER_ROUND as usize
    }

    fn count(&self, outcome: Outcome) -> u32 {
        self.throws.iter().filter(|t| t.outcome == outcome).count() as u32
    }

    pub fn total_in_hole(&self) -> u32 {
        self.count(Outcome::InHole)
    }

    pub fn total_on_board(&self) -> u32 {
        self.count(Outcome::OnBoard)
    }

    pub fn total_miss(&self) -> u32 {
        self.count(Outcome::Miss)
    }

    pub fn score(&self) -> u32 {
        self.total_in_hole() * Outcome::InHole.points()
            + self.total_on_board() * Outcome::OnBoard.points()
    }

    /// All four bags in the hole
    pub fn is_four_bagger(&self) -> bool {
        self.is_complete() && self.throws.iter().all(|t| t.outcome == Outcome::InHole)
    }
}

/// Ten empty rounds numbered 1 through 10
pub fn empty_rounds() -> Vec<Round> {
    (1..=ROUNDS_PER_SESSION).map(Round::new).collect()
}
