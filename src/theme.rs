use ratatui::style::Color;

// Color palette structure
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThemeId {
    OceanicNext,
    CatppuccinMocha,
}

impl ThemeId {
    pub fn name(&self) -> &'static str {
        match self {
            ThemeId::OceanicNext => "Oceanic Next",
            ThemeId::CatppuccinMocha => "Catppuccin Mocha",
        }
    }

    pub fn all() -> &'static [ThemeId] {
        &[ThemeId::OceanicNext, ThemeId::CatppuccinMocha]
    }

    /// Unknown names fall back to the default theme
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|theme| theme.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(ThemeId::OceanicNext)
    }

    pub fn palette(&self) -> &'static Base16Palette {
        match self {
            ThemeId::OceanicNext => &OCEANIC_NEXT_PALETTE,
            ThemeId::CatppuccinMocha => &CATPPUCCIN_MOCHA_PALETTE,
        }
    }
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

static OCEANIC_NEXT_PALETTE: Base16Palette = Base16Palette {
    base_00: hex(0x1B2B34),
    base_01: hex(0x343D46),
    base_02: hex(0x4F5B66),
    base_03: hex(0x65737E),
    base_04: hex(0xA7ADBA),
    base_05: hex(0xC0C5CE),
    base_06: hex(0xCDD3DE),
    base_07: hex(0xD8DEE9),
    base_08: hex(0xEC5f67),
    base_09: hex(0xF99157),
    base_0a: hex(0xFAC863),
    base_0b: hex(0x99C794),
    base_0c: hex(0x5FB3B3),
    base_0d: hex(0x6699CC),
    base_0e: hex(0xC594C5),
    base_0f: hex(0xAB7967),
};

static CATPPUCCIN_MOCHA_PALETTE: Base16Palette = Base16Palette {
    base_00: hex(0x1E1E2E),
    base_01: hex(0x181825),
    base_02: hex(0x313244),
    base_03: hex(0x45475A),
    base_04: hex(0x585B70),
    base_05: hex(0xCDD6F4),
    base_06: hex(0xF5E0DC),
    base_07: hex(0xB4BEFE),
    base_08: hex(0xF38BA8),
    base_09: hex(0xFAB387),
    base_0a: hex(0xF9E2AF),
    base_0b: hex(0xA6E3A1),
    base_0c: hex(0x94E2D5),
    base_0d: hex(0x89B4FA),
    base_0e: hex(0xCBA6F7),
    base_0f: hex(0xF2CDCD),
};
