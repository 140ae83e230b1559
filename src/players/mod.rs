pub mod base;
pub mod deductive;
pub mod random;

pub use base::BasePlayer;
pub use deductive::DeductivePlayer;
pub use random::RandomPlayer;
