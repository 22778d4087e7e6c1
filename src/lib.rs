//! Crate root module declarations for the Plum state-space explorer.
//!
//! The explorer enumerates every board reachable from a root position up to a
//! fixed depth, stores each distinct position once together with its
//! parent-to-child edges, and offers a console browser over the stored graph.

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod encoding;
    pub mod position;
}

pub mod moves {
    pub mod leaper_moves;
    pub mod pawn_moves;
    pub mod slider_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod move_generator;
    pub mod perft;
}

pub mod storage {
    pub mod schema;
    pub mod state_store;
}

pub mod search {
    pub mod frontier;
    pub mod orchestrator;
    pub mod run_report;
    pub mod size_guard;
    pub mod threading;
}

pub mod explorer {
    pub mod tree_browser;
}

pub mod utils {
    pub mod fen_parser;
    pub mod render_game_state;
}

pub mod config;
pub mod errors;
pub mod logging;
