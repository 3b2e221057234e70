use std::{env, thread, time::Duration};

use log::info;

use chess_rules::Board;
use chess_search::ScoredMove;
use chess_session::BotSession;

const DEFAULT_DEPTH: u8 = 2;
// Enough for a decisive game at shallow depths, and the demo always stops
const MAX_PLIES: u32 = 200;

fn main() {
    env_logger::init();

    let depth = env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u8>().ok())
        .unwrap_or(DEFAULT_DEPTH);

    let mut board = Board::new();
    let mut session = BotSession::new(depth);
    info!("self-play at depth {}", session.depth());

    println!("{board}\n");

    for ply in 1..=MAX_PLIES {
        if board.is_checkmate() {
            println!(
                "Checkmate, {:?} wins.",
                board.side_to_move().opposite()
            );
            return;
        }
        if board.is_draw() {
            println!("Draw.");
            return;
        }

        let side = board.side_to_move();
        session
            .request_move(&board)
            .expect("no search should be pending between plies");
        let chosen = match wait_for_result(&mut session) {
            Some(chosen) => chosen,
            None => {
                // Terminal positions are caught above; reaching this means
                // we could not compute a move, so leave the board untouched
                println!("Unable to compute a move for {side:?}.");
                return;
            }
        };

        board
            .make_move(chosen.mv)
            .expect("selected move must be legal");
        println!(
            "{ply:3}. {side:?} plays {} (score {})",
            chosen.mv, chosen.score
        );
        println!("{board}\n");
    }

    println!("Stopping after {MAX_PLIES} plies.");
}

fn wait_for_result(session: &mut BotSession) -> Option<ScoredMove> {
    loop {
        if let Some(result) = session.poll() {
            return result;
        }
        thread::sleep(Duration::from_millis(10));
    }
}
