use sodium::{Cell, CellLoop, SodiumCtx, Stream};

use crate::{Action, Error, Game, Mark, Mode, Outcome};

type Stepped = (Game, Option<Result<Outcome, Error>>);

/// A game wired into sodium: one [`Action`] stream in, the stepped engine
/// state plus move/outcome/error streams out. One action steps the engine
/// to completion per transaction, so frontends never see a half-applied
/// placement.
pub struct Session {
    pub game: Cell<Game>,
    pub moves: Stream<(usize, Mark)>,
    pub outcomes: Stream<Outcome>,
    pub errors: Stream<Error>,
}

impl Session {
    pub fn new(ctx: &SodiumCtx, actions: &Stream<Action>, mode: Mode) -> Session {
        ctx.transaction(|| {
            let game_cell_loop: CellLoop<Game> = ctx.new_cell_loop();
            let game_cell_fwd = game_cell_loop.cell();

            let stepped: Stream<Stepped> =
                actions.snapshot(&game_cell_fwd, |action: &Action, game: &Game| {
                    let mut game = *game;
                    let result = match *action {
                        Action::Place(index) => Some(game.place(index)),
                        Action::Restart(mode) => {
                            game.reset(mode);
                            None
                        }
                    };
                    (game, result)
                });

            // Accepted placements, tagged with the mover's mark; snapshotted
            // against the pre-step state so the mark is the one placed, not
            // the next turn's.
            let moves = actions
                .map(|action: &Action| match action {
                    Action::Place(index) => Some(*index),
                    Action::Restart(_) => None,
                })
                .filter_option()
                .snapshot(&game_cell_fwd, |index: &usize, game: &Game| {
                    if game.is_playable(*index) {
                        Some((*index, game.turn()))
                    } else {
                        None
                    }
                })
                .filter_option();

            let game_cell = stepped
                .map(|(game, _): &Stepped| *game)
                .hold(Game::new(mode));
            game_cell_loop.loop_(&game_cell);

            let (outcomes, errors) = stepped
                .map(|(_, result): &Stepped| *result)
                .filter_option()
                .split_res();

            Session {
                game: game_cell,
                moves,
                outcomes,
                errors,
            }
        })
    }
}
