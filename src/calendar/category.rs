use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Private,
    Health,
    Sport,
    #[default]
    Other,
    Family,
    Everyday,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Work,
        Category::Private,
        Category::Health,
        Category::Sport,
        Category::Other,
        Category::Family,
        Category::Everyday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Private => "Private",
            Category::Health => "Health",
            Category::Sport => "Sport",
            Category::Other => "Other",
            Category::Family => "Family",
            Category::Everyday => "Everyday",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Category::Work => Color::Blue,
            Category::Private => Color::Rgb(255, 149, 0),
            Category::Health => Color::Green,
            Category::Sport => Color::Red,
            Category::Other => Color::Gray,
            Category::Family => Color::Rgb(255, 45, 85),
            Category::Everyday => Color::Rgb(0, 199, 190),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_category_is_other() {
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn every_category_has_distinct_color() {
        let colors: Vec<Color> = Category::ALL.iter().map(|c| c.color()).collect();
        for (i, color) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(color), "duplicate color {:?}", color);
        }
    }

    #[test]
    fn parses_label_case_insensitively() {
        assert_eq!("health".parse::<Category>(), Ok(Category::Health));
        assert_eq!(" Everyday ".parse::<Category>(), Ok(Category::Everyday));
        assert!("holiday".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_label() {
        let json = serde_json::to_string(&Category::Family).unwrap();
        assert_eq!(json, "\"family\"");
    }
}
