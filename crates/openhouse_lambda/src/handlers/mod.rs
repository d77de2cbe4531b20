pub mod areas;
pub mod attendees;
pub mod buildings;
pub mod cascade;
pub mod eateries;
pub mod error;
pub mod events;
pub mod open_houses;
pub mod references;
pub mod request;
pub mod response;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;
