pub mod error;
pub mod flowmon;
pub mod queue;
pub mod scenario;
pub mod sim;
pub mod wifi;

#[cfg(test)]
mod test;
