pub mod album;
pub mod email;
pub mod game;
pub mod member;
pub mod page;
