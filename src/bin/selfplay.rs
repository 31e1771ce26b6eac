//! Random self-play harness: plays full games through the public rules API,
//! spot-checking the apply/undo round-trip on every ply. Useful as a smoke
//! test that the generator, applier, and undo machinery agree with each
//! other over long, messy games.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use castlemate::{Board, Color};

const GAMES: usize = 50;
const MAX_PLIES: usize = 300;

enum Outcome {
    Checkmate(Color),
    Stalemate,
    MoveCap,
}

fn play_game(rng: &mut StdRng, record: &mut Vec<String>) -> Outcome {
    let mut board = Board::new();
    record.clear();

    for _ in 0..MAX_PLIES {
        let moves = board.legal_moves();
        let mv = match moves.choose(rng) {
            Some(mv) => mv,
            None => {
                return if board.in_check() {
                    Outcome::Checkmate(board.side_to_move().opposite())
                } else {
                    Outcome::Stalemate
                };
            }
        };

        // Apply, undo, compare, re-apply: the round-trip law must hold at
        // every position a real game can reach.
        let snapshot = board.clone();
        board.apply(mv).expect("generated move must apply");
        board.undo();
        assert!(
            board == snapshot,
            "undo failed to restore the position after {mv} (ply {})",
            record.len()
        );
        board.apply(mv).expect("generated move must re-apply");
        record.push(mv.notation());
    }
    Outcome::MoveCap
}

fn main() {
    let mut rng = StdRng::seed_from_u64(0x5e1f);
    let mut record = Vec::new();

    let mut white_wins = 0u32;
    let mut black_wins = 0u32;
    let mut stalemates = 0u32;
    let mut capped = 0u32;

    for game in 0..GAMES {
        match play_game(&mut rng, &mut record) {
            Outcome::Checkmate(Color::White) => white_wins += 1,
            Outcome::Checkmate(Color::Black) => black_wins += 1,
            Outcome::Stalemate => stalemates += 1,
            Outcome::MoveCap => capped += 1,
        }
        println!("game {:>2}: {} plies", game + 1, record.len());
    }

    println!(
        "\n{GAMES} games: white {white_wins}, black {black_wins}, \
         stalemate {stalemates}, hit the {MAX_PLIES}-ply cap {capped}"
    );
    println!(
        "last game record: {}",
        serde_json::to_string(&record).expect("move list serializes")
    );
}
