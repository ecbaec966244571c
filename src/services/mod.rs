pub mod campaigns;
pub mod recommendation;
pub mod restaurants;
pub mod users;
pub mod videos;
