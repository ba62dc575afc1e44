use ratatui::style::Color;

// Backgrounds
pub const BG_DARK: Color = Color::Rgb(14, 20, 22);
pub const BG_BAR: Color = Color::Rgb(19, 27, 30);
pub const BG_SURFACE: Color = Color::Rgb(24, 34, 38);
pub const BG_HIGHLIGHT: Color = Color::Rgb(32, 52, 56);

// Primary accent (pharmacy teal)
pub const TEAL: Color = Color::Rgb(45, 212, 191);

// Text
pub const TEXT: Color = Color::Rgb(222, 228, 228);
pub const TEXT_DIM: Color = Color::Rgb(135, 150, 152);
pub const TEXT_MUTED: Color = Color::Rgb(80, 95, 98);

// Semantic
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const ORANGE: Color = Color::Rgb(251, 146, 60);
