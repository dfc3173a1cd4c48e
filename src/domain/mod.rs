pub mod eth;
pub mod flow;
pub mod price;
pub mod purchase;
pub mod step;
