pub mod category;
pub mod newsletter;
pub mod subscriber;
