use riqi_core::Priority;
use termimad::{
    MadSkin,
    crossterm::style::{Attribute, Color},
};

/// The slice of the One Dark palette the parse output uses.
pub struct OneDark;

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

impl OneDark {
    pub const FG: Color = rgb(0xABB2BF);
    pub const RED: Color = rgb(0xE06C75);
    pub const YELLOW: Color = rgb(0xE5C07B);
    pub const GREEN: Color = rgb(0x98C379);
    pub const BLUE: Color = rgb(0x61AFEF);
    pub const CYAN: Color = rgb(0x56B6C2);

    /// Block output only uses plain paragraphs and bold labels.
    pub fn skin() -> MadSkin {
        let mut skin = MadSkin::default();
        skin.paragraph.set_fg(OneDark::FG);
        skin.bold.set_fg(OneDark::YELLOW);
        skin.bold.add_attr(Attribute::Bold);
        skin
    }

    pub fn priority(priority: Priority) -> Color {
        match priority {
            Priority::High => OneDark::RED,
            Priority::Medium => OneDark::YELLOW,
            Priority::Low => OneDark::GREEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack() {
        assert_eq!(
            OneDark::RED,
            Color::Rgb {
                r: 0xE0,
                g: 0x6C,
                b: 0x75
            }
        );
    }

    #[test]
    fn priorities_have_distinct_colors() {
        let colors = [Priority::High, Priority::Medium, Priority::Low].map(OneDark::priority);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }
}
