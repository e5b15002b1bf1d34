use std::fmt;

pub const WIN_SEQUENCES: [[usize; 3]; 8] = [
    // Horizontal
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Vertical
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonal
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn swap(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Mark>; 9],
}

impl Board {
    pub fn new() -> Self {
        let squares = [None; 9];
        Self { squares }
    }

    pub fn mark(&self, index: usize, mark: Mark) -> Board {
        let mut new_board = *self;
        new_board.squares[index] = Some(mark);
        new_board
    }

    // Callers validate the index; squares are addressed 0-8, row major.
    pub fn square(&self, index: usize) -> Option<Mark> {
        self.squares[index]
    }

    pub fn is_valid_move(&self, index: usize) -> bool {
        self.squares[index].is_none()
    }

    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|square| square.is_some())
    }

    pub fn empty_squares(&self) -> impl Iterator<Item = usize> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, square)| square.is_none())
            .map(|(index, _)| index)
    }

    // First fully-occupied sequence in enumeration order: rows, then
    // columns, then diagonals. A move completing two lines at once is
    // reported as the earlier of the two.
    pub fn winning_line(&self) -> Option<(Mark, [usize; 3])> {
        for seq in WIN_SEQUENCES {
            if let Some(first) = self.squares[seq[0]] {
                if seq.iter().all(|i| self.squares[*i] == Some(first)) {
                    return Some((first, seq));
                }
            }
        }
        None
    }

    fn display_squares(&self) -> [&'static str; 9] {
        const NUMBERS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

        let mut display = [""; 9];
        for (index, dsquare) in display.iter_mut().enumerate() {
            *dsquare = match self.squares[index] {
                Some(Mark::X) => "X",
                Some(Mark::O) => "O",
                None => NUMBERS[index],
            };
        }
        display
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self.display_squares();
        writeln!(f, " {} | {} | {}", ds[6], ds[7], ds[8])?;
        f.write_str("---+---+---\n")?;
        writeln!(f, " {} | {} | {}", ds[3], ds[4], ds[5])?;
        f.write_str("---+---+---\n")?;
        writeln!(f, " {} | {} | {}", ds[0], ds[1], ds[2])?;
        Ok(())
    }
}
