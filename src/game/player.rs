use std::ops::Neg;

use super::board::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::Black => "Black",
            Player::White => "White",
        }
    }
}

impl Neg for Player {
    type Output = Player;

    fn neg(self) -> Player {
        self.other()
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Player {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "b" => Ok(Player::Black),
            "white" | "w" => Ok(Player::White),
            other => Err(format!("unknown side '{other}' (expected 'black' or 'white')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_player() {
        assert_eq!(Player::Black.other(), Player::White);
        assert_eq!(Player::White.other(), Player::Black);
        assert_eq!(-Player::Black, Player::White);
    }

    #[test]
    fn test_player_name() {
        assert_eq!(Player::Black.name(), "Black");
        assert_eq!(Player::White.name(), "White");
    }

    #[test]
    fn test_player_cell_sign() {
        assert_eq!(Player::Black.to_cell().value(), 1);
        assert_eq!(Player::White.to_cell().value(), -1);
    }

    #[test]
    fn test_parse_player() {
        assert_eq!("black".parse::<Player>(), Ok(Player::Black));
        assert_eq!("W".parse::<Player>(), Ok(Player::White));
        assert!("red".parse::<Player>().is_err());
    }
}
