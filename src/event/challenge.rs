//! Challenge mini-games for players who missed the safety window

use serde::{Deserialize, Serialize};

use crate::{
    constants::shapes::{
        DECOY_SIZE_RANGE, MIN_DECOY_SIZE, MIN_POSITION, POSITION_RANGE, TARGET_ID, TARGET_SIZE,
    },
    quiz::Quiz,
};

/// Which mini-game an event uses, drawn once when the event is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Find and tap the green circle
    Shapes,
    /// Answer a trivia question correctly
    Quiz,
}

impl ChallengeKind {
    /// Draws a kind uniformly
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        if rng.bool() { Self::Shapes } else { Self::Quiz }
    }
}

/// Fill color of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Rose
    Rose,
    /// Blue
    Blue,
    /// Amber
    Amber,
    /// Purple
    Purple,
    /// White
    White,
    /// Reserved for the target
    Emerald,
}

const DECOY_COLORS: [Color; 5] = [
    Color::Rose,
    Color::Blue,
    Color::Amber,
    Color::Purple,
    Color::White,
];

/// Outline of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outline {
    /// Circle
    Circle,
    /// Square with rounded corners
    Rounded,
    /// Skewed parallelogram
    Skewed,
}

const DECOY_OUTLINES: [Outline; 3] = [Outline::Circle, Outline::Rounded, Outline::Skewed];

/// One shape on the board, positioned in percent of the board size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Decoys count up from zero, the target is [`TARGET_ID`]
    pub id: u32,
    /// Color
    pub color: Color,
    /// Outline
    pub outline: Outline,
    /// Horizontal position, 10 to 90
    pub x: f64,
    /// Vertical position, 10 to 90
    pub y: f64,
    /// Edge length in pixels
    pub size: f64,
}

impl Shape {
    /// Whether this is the green circle
    pub fn is_target(&self) -> bool {
        self.id == TARGET_ID
    }
}

/// A shuffled board of decoys with exactly one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeField {
    shapes: Vec<Shape>,
}

impl ShapeField {
    /// Lays out `decoy_count` decoys plus the target in random order
    pub fn generate(rng: &mut fastrand::Rng, decoy_count: usize) -> Self {
        let mut shapes = (0..decoy_count)
            .map(|i| Shape {
                id: u32::try_from(i).unwrap_or(u32::MAX - 1),
                color: DECOY_COLORS[rng.usize(..DECOY_COLORS.len())],
                outline: DECOY_OUTLINES[rng.usize(..DECOY_OUTLINES.len())],
                x: MIN_POSITION + rng.f64() * POSITION_RANGE,
                y: MIN_POSITION + rng.f64() * POSITION_RANGE,
                size: MIN_DECOY_SIZE + rng.f64() * DECOY_SIZE_RANGE,
            })
            .collect::<Vec<_>>();

        shapes.push(Shape {
            id: TARGET_ID,
            color: Color::Emerald,
            outline: Outline::Circle,
            x: MIN_POSITION + rng.f64() * POSITION_RANGE,
            y: MIN_POSITION + rng.f64() * POSITION_RANGE,
            size: TARGET_SIZE,
        });

        rng.shuffle(&mut shapes);

        Self { shapes }
    }

    /// The shapes in render order
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// The green circle
    pub fn target(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_target())
    }

    /// Whether tapping `id` hits the target
    pub fn is_hit(&self, id: u32) -> bool {
        self.target().is_some_and(|t| t.id == id)
    }
}

/// A challenge as shown to one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Challenge {
    /// Tap the green circle among decoys
    Shapes(ShapeField),
    /// Pick any option of a trivia question
    Quiz(Quiz),
}

impl Challenge {
    /// Builds this player's challenge for an event of `kind`
    ///
    /// Each client draws its own board or question. An empty question pool
    /// falls back to shapes.
    pub fn generate(
        kind: ChallengeKind,
        rng: &mut fastrand::Rng,
        decoy_count: usize,
        quizzes: &[Quiz],
    ) -> Self {
        match kind {
            ChallengeKind::Quiz if !quizzes.is_empty() => {
                Self::Quiz(quizzes[rng.usize(..quizzes.len())].clone())
            }
            _ => Self::Shapes(ShapeField::generate(rng, decoy_count)),
        }
    }

    /// The kind of this challenge
    pub fn kind(&self) -> ChallengeKind {
        match self {
            Self::Shapes(_) => ChallengeKind::Shapes,
            Self::Quiz(_) => ChallengeKind::Quiz,
        }
    }

    /// Whether tapping shape `id` completes the challenge
    pub fn completes_with_shape(&self, id: u32) -> bool {
        match self {
            Self::Shapes(field) => field.is_hit(id),
            Self::Quiz(_) => false,
        }
    }

    /// Whether picking option `index` completes the challenge
    ///
    /// Wrong options do nothing, the player keeps trying.
    pub fn completes_with_option(&self, index: usize) -> bool {
        match self {
            Self::Quiz(quiz) => index == quiz.correct_index,
            Self::Shapes(_) => false,
        }
    }
}
