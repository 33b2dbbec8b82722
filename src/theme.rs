use clap::ValueEnum;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CaretStyle {
    #[default]
    Underline,
    Bar,
    None,
}

impl CaretStyle {
    pub fn modifier(&self) -> Modifier {
        match self {
            CaretStyle::Underline => Modifier::UNDERLINED,
            CaretStyle::Bar => Modifier::REVERSED,
            CaretStyle::None => Modifier::empty(),
        }
    }
}

/// Background brightness a palette is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Light,
    Dark,
}

impl ThemeMode {
    /// `colorfgbg` is the terminal's `COLORFGBG` value, e.g. `"15;0"`.
    pub fn resolve(&self, colorfgbg: Option<&str>) -> Variant {
        match self {
            ThemeMode::Light => Variant::Light,
            ThemeMode::Dark => Variant::Dark,
            ThemeMode::System => {
                let bg = colorfgbg
                    .and_then(|v| v.rsplit(';').next())
                    .and_then(|v| v.trim().parse::<u8>().ok());
                match bg {
                    Some(7) | Some(9..=15) => Variant::Light,
                    _ => Variant::Dark,
                }
            }
        }
    }
}

pub const PALETTE_NAMES: [&str; 4] = ["default", "ocean", "forest", "mono"];

/// Colors used to render judgments and chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub correct: Color,
    pub incorrect: Color,
    pub pending: Color,
    pub accent: Color,
    pub muted: Color,
    pub warning: Color,
}

impl Palette {
    pub fn named(name: &str, variant: Variant) -> Option<Self> {
        let dark = variant == Variant::Dark;
        let palette = match name.to_ascii_lowercase().as_str() {
            "default" => Self {
                correct: Color::Green,
                incorrect: Color::Red,
                pending: if dark { Color::DarkGray } else { Color::Gray },
                accent: Color::Magenta,
                muted: Color::Gray,
                warning: Color::Yellow,
            },
            "ocean" => Self {
                correct: if dark { Color::Cyan } else { Color::Blue },
                incorrect: Color::LightRed,
                pending: if dark { Color::Rgb(90, 110, 130) } else { Color::Rgb(140, 160, 180) },
                accent: Color::LightBlue,
                muted: Color::Rgb(120, 140, 160),
                warning: Color::LightYellow,
            },
            "forest" => Self {
                correct: if dark { Color::LightGreen } else { Color::Rgb(34, 110, 50) },
                incorrect: Color::Rgb(200, 80, 40),
                pending: if dark { Color::Rgb(100, 115, 95) } else { Color::Rgb(150, 160, 140) },
                accent: Color::Rgb(160, 190, 90),
                muted: Color::Rgb(130, 140, 120),
                warning: Color::Rgb(230, 180, 60),
            },
            "mono" => Self {
                correct: if dark { Color::White } else { Color::Black },
                incorrect: if dark { Color::White } else { Color::Black },
                pending: Color::DarkGray,
                accent: if dark { Color::White } else { Color::Black },
                muted: Color::Gray,
                warning: if dark { Color::White } else { Color::Black },
            },
            _ => return None,
        };
        Some(palette)
    }
}

/// Resolved styles for one run of the app.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub palette: Palette,
    pub caret: CaretStyle,
    pub variant: Variant,
}

impl Theme {
    pub fn new(mode: ThemeMode, palette_name: &str, caret: CaretStyle) -> Self {
        let variant = mode.resolve(std::env::var("COLORFGBG").ok().as_deref());
        let palette = Palette::named(palette_name, variant).unwrap_or_else(|| {
            tracing::warn!(palette = palette_name, "unknown palette, using default");
            Palette::named("default", variant).unwrap_or(Palette::FALLBACK)
        });
        Self {
            palette,
            caret,
            variant,
        }
    }

    pub fn correct(&self) -> Style {
        Style::default()
            .fg(self.palette.correct)
            .add_modifier(Modifier::BOLD)
    }

    pub fn incorrect(&self) -> Style {
        let style = Style::default()
            .fg(self.palette.incorrect)
            .add_modifier(Modifier::BOLD);
        // mono has no hue to tell errors apart
        if self.palette.incorrect == self.palette.correct {
            style.add_modifier(Modifier::CROSSED_OUT)
        } else {
            style
        }
    }

    pub fn pending(&self) -> Style {
        Style::default().fg(self.palette.pending)
    }

    pub fn caret(&self) -> Style {
        self.pending()
            .add_modifier(Modifier::BOLD)
            .add_modifier(self.caret.modifier())
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn muted(&self) -> Style {
        Style::default()
            .fg(self.palette.muted)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn warning(&self) -> Style {
        Style::default()
            .fg(self.palette.warning)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::FALLBACK,
            caret: CaretStyle::default(),
            variant: Variant::Dark,
        }
    }
}

impl Palette {
    const FALLBACK: Palette = Palette {
        correct: Color::Green,
        incorrect: Color::Red,
        pending: Color::DarkGray,
        accent: Color::Magenta,
        muted: Color::Gray,
        warning: Color::Yellow,
    };
}
