// Cellar inventory: wine CRUD, consumption tracking, drinking windows and stats.

pub mod handlers;
pub mod repo;
pub mod stats;
pub mod validation;
pub mod window;
