pub mod assessment;
pub mod friend_share;
pub mod order;
pub mod profile;
pub mod result;
