use owo_colors::Style;
use std::sync::OnceLock;
use crate::relation::RelationKind;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for status lines and type-chart output.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// x2 relations
    pub super_effective: Style,
    /// x0.5 relations
    pub not_very_effective: Style,
    /// x0 relations
    pub no_effect: Style,
}

impl Theme {
    /// Colored when stdout is a terminal and colors are not disabled
    pub fn detect() -> Self {
        let term = console::Term::stdout();
        if term.is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            super_effective: Style::new().green(),
            not_very_effective: Style::new().yellow(),
            no_effect: Style::new().bright_black(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none.clone(),
            success: none.clone(),
            error: none.clone(),
            warn: none.clone(),
            info: none.clone(),
            dim: none.clone(),
            super_effective: none.clone(),
            not_very_effective: none.clone(),
            no_effect: none,
        }
    }

    /// Style for a relation kind, picked by its damage multiplier
    pub fn relation(&self, kind: RelationKind) -> &Style {
        let multiplier = kind.multiplier();
        if multiplier > 1.0 {
            &self.super_effective
        } else if multiplier > 0.0 {
            &self.not_very_effective
        } else {
            &self.no_effect
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
