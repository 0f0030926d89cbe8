use ratatui::style::{Color, Modifier, Style};

/// Styles for every panel. Built once at startup and passed by reference.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub title: Style,
    pub border: Style,
    pub header: Style,
    pub text: Style,
    pub muted: Style,
    pub key: Style,
    pub error: Style,
    pub loading: Style,
    pub highlight: Style,
    pub active_tab: Style,
    pub positive: Style,
    pub negative: Style,
    pub accent: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            header: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            text: Style::default().fg(Color::White),
            muted: Style::default().fg(Color::DarkGray),
            key: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            loading: Style::default().fg(Color::Magenta),
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            active_tab: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            positive: Style::default().fg(Color::Green),
            negative: Style::default().fg(Color::Red),
            accent: Style::default().fg(Color::Cyan),
        }
    }
}

impl Theme {
    /// Green for up, red for down, muted for flat.
    pub fn change(&self, v: f64) -> Style {
        if v > 0.0 {
            self.positive
        } else if v < 0.0 {
            self.negative
        } else {
            self.muted
        }
    }
}
