/// A calming strategy from the built-in catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl Strategy {
    /// Row title: icon followed by name.
    pub fn title(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }

    /// What gets read aloud when the strategy is activated.
    pub fn narration(&self) -> String {
        format!("{}. {}", self.name, self.description)
    }
}

pub const STRATEGIES: [Strategy; 8] = [
    Strategy {
        id: "deep-breathing",
        icon: "\u{1FAC1}",
        name: "Deep breathing",
        description: "Slow, deep breaths to calm your nervous system",
    },
    Strategy {
        id: "hold-ice",
        icon: "\u{1F9CA}",
        name: "Hold ice",
        description: "Hold an ice cube, the cold sensation helps ground you",
    },
    Strategy {
        id: "grounding-54321",
        icon: "5\u{FE0F}\u{20E3}",
        name: "5-4-3-2-1 grounding",
        description: "5 things you see, 4 you hear, 3 you touch, 2 you smell, 1 you taste",
    },
    Strategy {
        id: "listen-to-music",
        icon: "\u{1F3A7}",
        name: "Listen to music",
        description: "Put on calming music or white noise",
    },
    Strategy {
        id: "pressure",
        icon: "\u{1F917}",
        name: "Pressure",
        description: "Hug yourself tight, use a weighted blanket, or squeeze a stress ball",
    },
    Strategy {
        id: "walk-away",
        icon: "\u{1F6B6}",
        name: "Walk away",
        description: "Leave the situation. Go somewhere quiet for a few minutes",
    },
    Strategy {
        id: "cold-water",
        icon: "\u{1F4A7}",
        name: "Cold water",
        description: "Splash cold water on your face or wrists",
    },
    Strategy {
        id: "fidget",
        icon: "\u{1F9F6}",
        name: "Fidget",
        description: "Use a fidget toy, rubber band, or squeeze something",
    },
];

pub fn all() -> &'static [Strategy] {
    &STRATEGIES
}

pub fn by_id(id: &str) -> Option<&'static Strategy> {
    STRATEGIES.iter().find(|s| s.id == id)
}

/// Resolve a stored favourite. Accepts an id or, for settings written by
/// older versions, the display name in any case.
pub fn lookup(key: &str) -> Option<&'static Strategy> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    by_id(key).or_else(|| STRATEGIES.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
}
