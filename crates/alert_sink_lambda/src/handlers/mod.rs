pub mod delivery;
pub mod replay;
