use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub texts: Vec<String>,
}

impl Category {
    pub fn new(title: impl Into<String>, texts: &[&str]) -> Self {
        Self {
            title: title.into(),
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Appends freshly generated texts after the ones already shown.
///
/// No dedupe: the model was told not to repeat, and we keep what it returns.
pub fn append_texts(existing: &[String], new_texts: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(existing.len() + new_texts.len());
    out.extend_from_slice(existing);
    out.extend(new_texts);
    out
}

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Ice Breakers & Openers",
            &[
                "Are you a magician? Because whenever I look at you, everyone else disappears.",
                "I'm not a photographer, but I can definitely picture us together.",
                "My phone must be broken, because it's missing your number.",
                "Besides being gorgeous, what do you do for a living?",
            ],
        ),
        Category::new(
            "Playful & Witty",
            &[
                "If you were a vegetable, you'd be a cute-cumber.",
                "I'm currently accepting applications for a partner in crime. You interested?",
                "Are you a parking ticket? Because you've got FINE written all over you.",
                "I'm pretty sure my happiness is spelled Y-O-U.",
            ],
        ),
        Category::new(
            "Deep & Romantic",
            &[
                "Just so you know, you're the reason I'm smiling at my phone right now.",
                "I was having an off day, but then I thought of you and it all got better.",
                "You have this incredible way of making my heart happy.",
                "Seeing your name pop up on my phone is the best part of my day.",
            ],
        ),
        Category::new(
            "Late Night Thoughts",
            &[
                "Can't sleep. Too busy thinking about you.",
                "My bed is way too big for just one person... just saying.",
                "Hope you're having a good night. You're definitely starring in my dreams.",
                "Wish you were here to steal my blankets.",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order_and_duplicates() {
        let existing = vec!["a".to_string(), "b".to_string()];
        let out = append_texts(&existing, vec!["c".into(), "a".into()]);
        assert_eq!(out, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn defaults_have_four_seeded_categories() {
        let cats = default_categories();
        assert_eq!(cats.len(), 4);
        assert!(cats.iter().all(|c| c.texts.len() == 4));
        assert_eq!(cats[3].title, "Late Night Thoughts");
    }
}
