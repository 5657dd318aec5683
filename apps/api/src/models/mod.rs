pub mod consumption;
pub mod notification;
pub mod partner;
pub mod recommendation;
pub mod taste_profile;
pub mod wine;
