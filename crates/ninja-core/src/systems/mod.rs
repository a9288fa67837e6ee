pub mod clouds;
pub mod effects;
pub mod projectiles;
