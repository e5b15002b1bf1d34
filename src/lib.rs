use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

mod board;
mod session;

pub use board::{Board, Mark, WIN_SEQUENCES};
pub use session::Session;

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid move: square {0} is already taken!")]
    InvalidMove(usize),

    #[error("invalid index: {0}!")]
    OutOfRange(usize),

    #[error("the game is over, start a new one!")]
    NotActive,

    #[error("no open squares left to play!")]
    NoMovesAvailable,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    HumanVsHuman,
    HumanVsAuto,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    Won { mark: Mark, line: [usize; 3] },
    Draw,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

/// What a frontend should show after an accepted placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(Mark),
    Won { mark: Mark, line: [usize; 3] },
    Draw,
}

/// Frontend requests fed into a [`Session`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Place(usize),
    Restart(Mode),
}

/// One game of tic-tac-toe: the board, whose turn it is, and whether the
/// game is still running. X always moves first; in [`Mode::HumanVsAuto`]
/// the automated side plays O.
#[derive(Copy, Clone, Debug)]
pub struct Game {
    board: Board,
    turn: Mark,
    status: Status,
    mode: Mode,
}

impl Game {
    pub fn new(mode: Mode) -> Game {
        Game {
            board: Board::new(),
            turn: Mark::X,
            status: Status::Active,
            mode,
        }
    }

    /// Abandons the current game and starts a fresh one under `mode`. The
    /// only way back to [`Status::Active`] from a finished game.
    pub fn reset(&mut self, mode: Mode) {
        *self = Game::new(mode);
    }

    /// Places the current turn's mark on `index`. Rejections are strict
    /// no-ops; an `Err` never changes any state.
    pub fn place(&mut self, index: usize) -> Result<Outcome, Error> {
        if !self.status.is_active() {
            return Err(Error::NotActive);
        }
        if index >= 9 {
            return Err(Error::OutOfRange(index));
        }
        if !self.board.is_valid_move(index) {
            return Err(Error::InvalidMove(index));
        }

        self.board = self.board.mark(index, self.turn);
        if let Some((mark, line)) = self.board.winning_line() {
            self.status = Status::Won { mark, line };
            Ok(Outcome::Won { mark, line })
        } else if self.board.is_full() {
            self.status = Status::Draw;
            Ok(Outcome::Draw)
        } else {
            self.turn = self.turn.swap();
            Ok(Outcome::Continue(self.turn))
        }
    }

    /// Picks a square for the automated opponent, uniformly at random among
    /// the open ones. Pure selection: no lookahead, no mutation. The caller
    /// applies the returned index through [`Game::place`] like any other
    /// move, and gates the call on [`Game::awaiting_auto`].
    pub fn auto_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, Error> {
        let open: Vec<usize> = self.board.empty_squares().collect();
        open.choose(rng).copied().ok_or(Error::NoMovesAvailable)
    }

    /// True while the game is running, the mode has an automated side, and
    /// it is that side's turn. Frontends check this both when scheduling
    /// the delayed reply and again when the delay fires, so a restart or
    /// mode switch in between cancels the move.
    pub fn awaiting_auto(&self) -> bool {
        self.mode == Mode::HumanVsAuto && self.status.is_active() && self.turn == Mark::O
    }

    pub fn is_playable(&self, index: usize) -> bool {
        self.status.is_active() && index < 9 && self.board.is_valid_move(index)
    }

    pub fn square(&self, index: usize) -> Result<Option<Mark>, Error> {
        if index >= 9 {
            return Err(Error::OutOfRange(index));
        }
        Ok(self.board.square(index))
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn played_out(mode: Mode, moves: &[usize]) -> Game {
        let mut game = Game::new(mode);
        for index in moves {
            game.place(*index).unwrap();
        }
        game
    }

    fn mark_counts(game: &Game) -> (usize, usize) {
        let xs = (0..9)
            .filter(|index| game.square(*index).unwrap() == Some(Mark::X))
            .count();
        let os = (0..9)
            .filter(|index| game.square(*index).unwrap() == Some(Mark::O))
            .count();
        (xs, os)
    }

    // X:{0,2,3,7,8} O:{1,4,5,6} fills the board without completing a line.
    const DRAWN_GAME: [usize; 9] = [0, 1, 2, 4, 3, 5, 7, 6, 8];

    #[test]
    fn fresh_game_starts_active_with_x() {
        let game = Game::new(Mode::HumanVsHuman);
        assert_eq!(game.status(), Status::Active);
        assert_eq!(game.turn(), Mark::X);
        for index in 0..9 {
            assert_eq!(game.square(index), Ok(None));
            assert!(game.is_playable(index));
        }
    }

    #[test]
    fn marks_alternate_strictly() {
        let mut game = Game::new(Mode::HumanVsHuman);
        let mut expected = Mark::X;
        for index in DRAWN_GAME {
            assert_eq!(game.turn(), expected);
            game.place(index).unwrap();
            let (xs, os) = mark_counts(&game);
            assert!(xs == os || xs == os + 1);
            expected = expected.swap();
        }
    }

    #[test]
    fn continue_reports_the_next_turn() {
        let mut game = Game::new(Mode::HumanVsHuman);
        assert_eq!(game.place(0), Ok(Outcome::Continue(Mark::O)));
        assert_eq!(game.place(4), Ok(Outcome::Continue(Mark::X)));
        assert_eq!(game.turn(), Mark::X);
    }

    #[test]
    fn occupied_square_is_rejected_without_mutation() {
        let mut game = played_out(Mode::HumanVsHuman, &[4]);
        let before = game.board();
        assert_eq!(game.place(4), Err(Error::InvalidMove(4)));
        assert_eq!(game.board(), before);
        assert_eq!(game.turn(), Mark::O);
        assert_eq!(game.status(), Status::Active);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut game = Game::new(Mode::HumanVsHuman);
        assert_eq!(game.place(9), Err(Error::OutOfRange(9)));
        assert_eq!(game.square(12), Err(Error::OutOfRange(12)));
        assert!(!game.is_playable(9));
        assert_eq!(game.board(), Board::new());
    }

    #[test]
    fn win_is_detected_on_the_completing_move() {
        let mut game = played_out(Mode::HumanVsHuman, &[0, 3, 1, 4]);
        assert_eq!(
            game.place(2),
            Ok(Outcome::Won {
                mark: Mark::X,
                line: [0, 1, 2]
            })
        );
        assert_eq!(
            game.status(),
            Status::Won {
                mark: Mark::X,
                line: [0, 1, 2]
            }
        );
        // The turn does not flip once the game ends.
        assert_eq!(game.turn(), Mark::X);
    }

    #[test]
    fn placements_after_a_win_are_rejected_without_mutation() {
        let mut game = played_out(Mode::HumanVsHuman, &[0, 3, 1, 4, 2]);
        let before = game.board();
        assert_eq!(game.place(5), Err(Error::NotActive));
        assert_eq!(game.board(), before);
        assert!(!game.is_playable(5));
    }

    #[test]
    fn filling_the_board_without_a_line_is_a_draw() {
        let mut game = Game::new(Mode::HumanVsHuman);
        for index in &DRAWN_GAME[..8] {
            assert!(matches!(game.place(*index), Ok(Outcome::Continue(_))));
        }
        assert_eq!(game.place(DRAWN_GAME[8]), Ok(Outcome::Draw));
        assert_eq!(game.status(), Status::Draw);
        assert!(game.board().is_full());
    }

    #[test]
    fn placements_after_a_draw_are_rejected() {
        let mut game = played_out(Mode::HumanVsHuman, &DRAWN_GAME);
        assert_eq!(game.place(0), Err(Error::NotActive));
    }

    #[test]
    fn double_diagonal_win_reports_the_first_diagonal() {
        // The closing center move completes [0, 4, 8] and [2, 4, 6] at
        // once; enumeration order picks the former.
        let mut game = played_out(Mode::HumanVsHuman, &[0, 1, 2, 3, 6, 5, 8, 7]);
        assert_eq!(
            game.place(4),
            Ok(Outcome::Won {
                mark: Mark::X,
                line: [0, 4, 8]
            })
        );
    }

    #[test]
    fn reset_returns_to_a_fresh_game_in_the_requested_mode() {
        let mut game = played_out(Mode::HumanVsHuman, &[0, 3, 1, 4, 2]);
        game.reset(Mode::HumanVsAuto);
        assert_eq!(game.status(), Status::Active);
        assert_eq!(game.turn(), Mark::X);
        assert_eq!(game.mode(), Mode::HumanVsAuto);
        assert_eq!(game.board(), Board::new());
    }

    #[test]
    fn auto_move_returns_the_only_open_square() {
        let game = played_out(Mode::HumanVsAuto, &DRAWN_GAME[..8]);
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(game.auto_move(&mut rng), Ok(8));
        }
    }

    #[test]
    fn auto_move_is_reproducible_for_a_seed() {
        let game = played_out(Mode::HumanVsAuto, &[4]);
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        assert_eq!(game.auto_move(&mut first), game.auto_move(&mut second));
    }

    #[test]
    fn auto_move_only_picks_open_squares() {
        let game = played_out(Mode::HumanVsAuto, &[4, 0, 8, 2]);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let index = game.auto_move(&mut rng).unwrap();
            assert!(game.is_playable(index));
        }
    }

    #[test]
    fn auto_move_on_a_full_board_reports_no_moves() {
        let game = played_out(Mode::HumanVsAuto, &DRAWN_GAME);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(game.auto_move(&mut rng), Err(Error::NoMovesAvailable));
    }

    #[test]
    fn awaiting_auto_tracks_mode_turn_and_status() {
        let mut game = Game::new(Mode::HumanVsHuman);
        game.place(0).unwrap();
        assert!(!game.awaiting_auto());

        let mut game = Game::new(Mode::HumanVsAuto);
        assert!(!game.awaiting_auto());
        game.place(0).unwrap();
        assert!(game.awaiting_auto());
        game.place(3).unwrap();
        assert!(!game.awaiting_auto());

        let won = played_out(Mode::HumanVsAuto, &[0, 3, 1, 4, 2]);
        assert!(!won.awaiting_auto());

        game.reset(Mode::HumanVsAuto);
        assert!(!game.awaiting_auto());
    }

    #[test]
    fn random_playouts_preserve_the_invariants() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = Game::new(Mode::HumanVsAuto);
            while game.status().is_active() {
                let index = game.auto_move(&mut rng).unwrap();
                game.place(index).unwrap();
                let (xs, os) = mark_counts(&game);
                assert!(xs == os || xs == os + 1);
            }
            match game.status() {
                Status::Won { mark, line } => {
                    for index in line {
                        assert_eq!(game.square(index), Ok(Some(mark)));
                    }
                }
                Status::Draw => assert!(game.board().is_full()),
                Status::Active => unreachable!(),
            }
        }
    }
}
