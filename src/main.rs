use std::{io::BufRead, thread, time::Duration};

use rand::rngs::ThreadRng;
use sodium::{Cell, SodiumCtx, StreamSink};

use oxo::{Action, Error, Game, Mark, Mode, Outcome, Session};

const AUTO_MOVE_DELAY: Duration = Duration::from_millis(500);

fn main() {
    let ctx = SodiumCtx::new();

    let (actions, game, _listeners) = ctx.transaction(|| {
        let mut listeners = Vec::new();

        let actions: StreamSink<Action> = ctx.new_stream_sink();
        let session = Session::new(&ctx, &actions.stream(), Mode::HumanVsHuman);

        listeners.push(session.moves.listen(|(index, mark): &(usize, Mark)| {
            println!("\n{:?} takes square {}:", mark, index + 1)
        }));
        listeners.push(
            session
                .game
                .updates()
                .listen(|game: &Game| println!("{}", game.board())),
        );
        listeners.push(session.outcomes.listen(|outcome: &Outcome| match outcome {
            Outcome::Continue(mark) => println!("{:?}'s turn.", mark),
            Outcome::Won { mark, line } => println!(
                "{:?} has won the game! (squares {}, {} and {})",
                mark,
                line[0] + 1,
                line[1] + 1,
                line[2] + 1
            ),
            Outcome::Draw => println!("It's a draw."),
        }));
        listeners.push(session.errors.listen(|err: &Error| println!("{}", err)));

        (actions, session.game, listeners)
    });

    let mut mode = Mode::HumanVsHuman;
    let mut rng = rand::thread_rng();

    println!("Welcome to oxo!\n");
    println!("Squares are numbered 1-9, numpad style. X plays first.");
    println!("Enter a square to mark it, h for a two player game,");
    println!("c to play the computer, r to restart, q to quit.\n");
    println!("{}", game.sample().board());

    let stdin = std::io::stdin().lock();
    for line in stdin.lines() {
        let line = line.unwrap();
        match line.trim() {
            "" => continue,
            "q" | "quit" => break,
            "r" | "restart" => {
                println!("\nStarting over! X plays first.");
                actions.send(Action::Restart(mode));
            }
            "h" | "human" => {
                mode = Mode::HumanVsHuman;
                println!("\nNew two player game! X plays first.");
                actions.send(Action::Restart(mode));
            }
            "c" | "computer" => {
                mode = Mode::HumanVsAuto;
                println!("\nNew game against the computer! You are X and play first.");
                actions.send(Action::Restart(mode));
            }
            input => match input.parse::<usize>() {
                Ok(square) if (1..=9).contains(&square) => {
                    actions.send(Action::Place(square - 1));
                    auto_reply(&actions, &game, &mut rng);
                }
                Ok(square) => println!("invalid square: {}! enter 1-9", square),
                Err(err) => println!("invalid input: {}!", err),
            },
        }
    }
}

// The automated side answers after a perceptible pause. The game is
// re-checked once the pause ends; a restart or mode switch in the interim
// cancels the reply.
fn auto_reply(actions: &StreamSink<Action>, game: &Cell<Game>, rng: &mut ThreadRng) {
    if !game.sample().awaiting_auto() {
        return;
    }
    thread::sleep(AUTO_MOVE_DELAY);

    let current = game.sample();
    if !current.awaiting_auto() {
        return;
    }
    if let Ok(index) = current.auto_move(rng) {
        actions.send(Action::Place(index));
    }
}
