use crate::strategies::{self, Strategy};

pub const HEADING: &str = "You are safe \u{1F499}";
pub const DEFAULT_ADVICE: &str = "Try this: Take 5 deep breaths. Count each one. You are safe.";
pub const SPOKEN_REASSURANCE: &str = "You are safe. Take a deep breath.";

/// What the emergency dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guidance {
    pub heading: &'static str,
    pub body: String,
    /// The favourite that was resolved, if any.
    pub strategy: Option<&'static Strategy>,
}

/// Resolve the stored favourite into dialog content. An empty or unknown
/// favourite falls back to the default breathing advice.
pub fn resolve(favorite: &str) -> Guidance {
    match strategies::lookup(favorite) {
        Some(strategy) => Guidance {
            heading: HEADING,
            body: format!(
                "Your favorite strategy: {}\n\n{}",
                strategy.title(),
                strategy.description
            ),
            strategy: Some(strategy),
        },
        None => {
            if !favorite.trim().is_empty() {
                log::warn!("Favorite strategy {favorite:?} not in catalogue, using default");
            }
            Guidance {
                heading: HEADING,
                body: DEFAULT_ADVICE.to_string(),
                strategy: None,
            }
        }
    }
}
