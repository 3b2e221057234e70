pub mod evaluation;
pub mod search;
pub mod selector;

pub use evaluation::evaluate_position;
pub use search::{search, DRAW_SCORE, MATE_SCORE};
pub use selector::{select_best_move, ScoredMove};
