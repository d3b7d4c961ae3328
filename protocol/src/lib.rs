//! Player-facing side of multiplayer mines: the JSON messages players exchange with the server and
//! the [`Dispatcher`] that applies them to live games.

pub use dispatcher::*;
pub use messages::*;

mod dispatcher;
mod messages;
