/// Self-assessed stress, 1 (calm) to 10 (overload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StressLevel(u8);

pub const MIN: u8 = 1;
pub const MAX: u8 = 10;

const EMOJIS: [&str; 10] = [
    "\u{1F60A}", // 😊
    "\u{1F642}", // 🙂
    "\u{1F610}", // 😐
    "\u{1F615}", // 😕
    "\u{1F61F}", // 😟
    "\u{1F630}", // 😰
    "\u{1F62B}", // 😫
    "\u{1F92F}", // 🤯
    "\u{1F62D}", // 😭
    "\u{1F4A5}", // 💥
];

impl Default for StressLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl StressLevel {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(MIN, MAX))
    }

    /// From a slider position; rounds and clamps.
    pub fn from_scale(value: f64) -> Self {
        Self::new(value.round().clamp(MIN as f64, MAX as f64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn emoji(self) -> &'static str {
        EMOJIS[(self.0 - MIN) as usize]
    }

    pub fn suggestion(self) -> &'static str {
        match self.0 {
            0..=3 => "You seem calm. Great! Keep doing what you're doing.",
            4..=5 => "Getting a bit tense. Try a short breathing exercise.",
            6..=7 => {
                "High stress. Take a break now. Try the breathing exercise or one of the strategies."
            }
            _ => {
                "Very high stress. Press the emergency button or go to breathing immediately. You are safe. \u{1F499}"
            }
        }
    }

    /// Levels where the feeling page points at the emergency button.
    pub fn is_overload(self) -> bool {
        self.0 >= 8
    }
}

/// Slider marks shown under the scale.
pub const MARKS: [(u8, &str); 3] = [(1, "Calm"), (5, "Medium"), (10, "Overload")];
