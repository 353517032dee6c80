use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::TimelineError;

/// Visually distinct clip colors, in allocation order.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#FF5733", // Coral Red
    "#33FF57", // Neon Green
    "#3357FF", // Royal Blue
    "#FF33F6", // Hot Pink
    "#33FFF6", // Cyan
    "#F6FF33", // Yellow
    "#FF8C33", // Orange
    "#8C33FF", // Purple
    "#33FF8C", // Mint
    "#FF338C", // Rose
    "#338CFF", // Sky Blue
    "#8CFF33", // Lime
];

/// Hex color string, e.g. `#FF5733`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClipColor(pub String);

impl ClipColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipColor {
    fn from(hex: &str) -> Self {
        Self(hex.to_string())
    }
}

impl fmt::Display for ClipColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out palette colors so that live clips stay distinguishable.
///
/// Colors are taken in palette order. Once every entry is in use the cycle
/// restarts from the first entry; removing a clip never returns its color.
#[derive(Debug, Clone)]
pub struct ColorAllocator {
    palette: Vec<ClipColor>,
    used: HashSet<ClipColor>,
}

impl ColorAllocator {
    pub fn new(palette: Vec<ClipColor>) -> Result<Self, TimelineError> {
        if palette.is_empty() {
            return Err(TimelineError::InvalidConfig("palette is empty".into()));
        }
        let mut seen = HashSet::new();
        for color in &palette {
            if !seen.insert(color) {
                return Err(TimelineError::InvalidConfig(format!(
                    "duplicate palette color {}",
                    color
                )));
            }
        }
        Ok(Self {
            palette,
            used: HashSet::new(),
        })
    }

    pub fn allocate(&mut self) -> ClipColor {
        let next = self
            .palette
            .iter()
            .find(|color| !self.used.contains(*color))
            .cloned();
        let color = match next {
            Some(color) => color,
            None => {
                self.used.clear();
                self.palette[0].clone()
            }
        };
        self.used.insert(color.clone());
        color
    }

    pub fn palette(&self) -> &[ClipColor] {
        &self.palette
    }

    /// Colors currently in use, in palette order.
    pub fn used(&self) -> Vec<&ClipColor> {
        self.palette
            .iter()
            .filter(|color| self.used.contains(*color))
            .collect()
    }

    pub fn is_used(&self, color: &ClipColor) -> bool {
        self.used.contains(color)
    }
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| ClipColor::from(*c)).collect(),
            used: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_distinct_colors_in_palette_order() {
        let mut colors = ColorAllocator::default();
        let first: Vec<_> = (0..DEFAULT_PALETTE.len())
            .map(|_| colors.allocate())
            .collect();
        let expected: Vec<_> = DEFAULT_PALETTE.iter().map(|c| ClipColor::from(*c)).collect();
        assert_eq!(first, expected);
    }

    #[test]
    fn test_exhausted_palette_restarts_cycle() {
        let mut colors = ColorAllocator::default();
        for _ in 0..12 {
            colors.allocate();
        }
        let thirteenth = colors.allocate();
        assert_eq!(thirteenth.as_str(), "#FF5733");
        assert_eq!(colors.used(), vec![&ClipColor::from("#FF5733")]);

        // Availability was reset, so the cycle continues with the second entry.
        assert_eq!(colors.allocate().as_str(), "#33FF57");
    }

    #[test]
    fn test_single_color_palette() {
        let mut colors = ColorAllocator::new(vec![ClipColor::from("#000000")]).unwrap();
        assert_eq!(colors.allocate().as_str(), "#000000");
        assert_eq!(colors.allocate().as_str(), "#000000");
        assert_eq!(colors.used().len(), 1);
    }

    #[test]
    fn test_rejects_bad_palettes() {
        assert!(ColorAllocator::new(Vec::new()).is_err());
        assert!(ColorAllocator::new(vec![
            ClipColor::from("#111111"),
            ClipColor::from("#111111"),
        ])
        .is_err());
    }
}
