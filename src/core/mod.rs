pub mod dispatcher;
pub mod registration;
pub mod resolver;
pub mod tags;
