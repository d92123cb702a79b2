//! Business rules for jogo (game event) management: creation validation,
//! member invitations, presence confirmation, pagination and lifecycle
//! transitions with email notification side effects.

pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
