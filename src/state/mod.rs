mod store;

pub use store::{AppState, Move, SharedState};
