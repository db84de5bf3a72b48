pub mod board;
pub mod config;

pub use board::{
    ActorError, BoardActor, BoardHandle, BoardLayout, CardTransform, FlipError, ParseError,
    PlayerId, Position, Symbol, TransformError,
};
pub use config::BoardConfig;
