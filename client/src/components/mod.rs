pub mod auth_pages;
pub mod coefs;
pub mod create_match;
pub mod form;
pub mod header;
pub mod matches;
pub mod modal;
pub mod my_bets;
pub mod toasts;
pub mod with_role;
