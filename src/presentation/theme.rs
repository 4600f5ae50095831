use colored::Colorize;

pub struct Theme {
    pub title: fn(&str) -> String,
    pub label: fn(&str) -> String,
    pub value: fn(&str) -> String,
    pub line: fn(&str) -> String,
    pub idx: fn(&str) -> String,
    pub category: fn(&str) -> String,
    pub distance: fn(&str) -> String,
    pub notice: fn(&str) -> String,
    pub favorite: fn(&str) -> String,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "temp" | "" => Self::temp(),
            "hanok" => Self::hanok(),
            "sea" => Self::sea(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", name).red());
                Self::temp() // Fallback to default
            }
        }
    }

    fn temp() -> Self {
        Self {
            title: |s| s.bright_magenta().bold().to_string(),
            label: |s| s.cyan().to_string(),
            value: |s| s.white().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            category: |s| s.cyan().italic().to_string(),
            distance: |s| s.green().to_string(),
            notice: |s| s.yellow().to_string(),
            favorite: |s| s.bright_yellow().to_string(),
        }
    }

    fn hanok() -> Self {
        Self {
            title: |s| s.red().bold().underline().to_string(),
            label: |s| s.normal().to_string(),
            value: |s| s.white().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            category: |s| s.green().italic().to_string(),
            distance: |s| s.bright_yellow().to_string(),
            notice: |s| s.bright_red().to_string(),
            favorite: |s| s.red().to_string(),
        }
    }

    fn sea() -> Self {
        Self {
            title: |s| s.blue().bold().underline().to_string(),
            label: |s| s.bright_cyan().to_string(),
            value: |s| s.black().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.cyan().to_string(),
            category: |s| s.green().italic().to_string(),
            distance: |s| s.bright_blue().to_string(),
            notice: |s| s.yellow().bold().to_string(),
            favorite: |s| s.bright_blue().to_string(),
        }
    }
}
