//! Driver rosters used as card faces.

use serde::Serialize;

/// A driver card face with its team livery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Driver {
    /// Surname, used as the card identity.
    pub name: &'static str,
    /// Livery background colour (hex).
    pub background: &'static str,
    /// Text colour readable on `background` (hex).
    pub text: &'static str,
}

const fn driver(name: &'static str, background: &'static str, text: &'static str) -> Driver {
    Driver {
        name,
        background,
        text,
    }
}

const RED_BULL: (&str, &str) = ("#101C50", "#fff");
const MERCEDES: (&str, &str) = ("#00D2BE", "#000");
const FERRARI: (&str, &str) = ("#EF1A2D", "#fff");
const MCLAREN: (&str, &str) = ("#FF8000", "#000");
const ASTON_MARTIN: (&str, &str) = ("#006F62", "#fff");
const ALPINE: (&str, &str) = ("#0090FF", "#fff");
const WILLIAMS: (&str, &str) = ("#005AFF", "#fff");
const RACING_BULLS: (&str, &str) = ("#6692FF", "#000");
const SAUBER: (&str, &str) = ("#52E252", "#000");
const HAAS: (&str, &str) = ("#B6BABD", "#000");

/// The eight drivers of the classic sixteen-card board.
pub const CLASSIC_GRID: [Driver; 8] = [
    driver("Verstappen", RED_BULL.0, RED_BULL.1),
    driver("Hamilton", MERCEDES.0, MERCEDES.1),
    driver("Leclerc", FERRARI.0, FERRARI.1),
    driver("Norris", MCLAREN.0, MCLAREN.1),
    driver("Alonso", ASTON_MARTIN.0, ASTON_MARTIN.1),
    driver("Piastri", MCLAREN.0, MCLAREN.1),
    driver("Russell", MERCEDES.0, MERCEDES.1),
    driver("Sainz", FERRARI.0, FERRARI.1),
];

/// A full twenty-driver grid to sample boards from.
pub const FULL_GRID: [Driver; 20] = [
    driver("Verstappen", RED_BULL.0, RED_BULL.1),
    driver("Perez", RED_BULL.0, RED_BULL.1),
    driver("Hamilton", MERCEDES.0, MERCEDES.1),
    driver("Russell", MERCEDES.0, MERCEDES.1),
    driver("Leclerc", FERRARI.0, FERRARI.1),
    driver("Sainz", FERRARI.0, FERRARI.1),
    driver("Norris", MCLAREN.0, MCLAREN.1),
    driver("Piastri", MCLAREN.0, MCLAREN.1),
    driver("Alonso", ASTON_MARTIN.0, ASTON_MARTIN.1),
    driver("Stroll", ASTON_MARTIN.0, ASTON_MARTIN.1),
    driver("Gasly", ALPINE.0, ALPINE.1),
    driver("Ocon", ALPINE.0, ALPINE.1),
    driver("Albon", WILLIAMS.0, WILLIAMS.1),
    driver("Sargeant", WILLIAMS.0, WILLIAMS.1),
    driver("Tsunoda", RACING_BULLS.0, RACING_BULLS.1),
    driver("Ricciardo", RACING_BULLS.0, RACING_BULLS.1),
    driver("Bottas", SAUBER.0, SAUBER.1),
    driver("Zhou", SAUBER.0, SAUBER.1),
    driver("Hulkenberg", HAAS.0, HAAS.1),
    driver("Magnussen", HAAS.0, HAAS.1),
];

/// Returns the names of `grid`, ready to hand to a deck builder.
pub fn names(grid: &[Driver]) -> Vec<&'static str> {
    grid.iter().map(|d| d.name).collect()
}

/// Looks up a driver's livery by name in either grid.
pub fn find(name: &str) -> Option<&'static Driver> {
    FULL_GRID.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_grids_have_distinct_names() {
        let classic: HashSet<_> = names(&CLASSIC_GRID).into_iter().collect();
        let full: HashSet<_> = names(&FULL_GRID).into_iter().collect();
        assert_eq!(classic.len(), CLASSIC_GRID.len());
        assert_eq!(full.len(), FULL_GRID.len());
        assert!(classic.is_subset(&full));
    }

    #[test]
    fn test_find_livery() {
        let driver = find("Norris").expect("Norris is on the grid");
        assert_eq!(driver.background, "#FF8000");
        assert!(find("Senna").is_none());
    }
}
