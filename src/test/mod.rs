mod channel;
mod scenario;
mod simulator;
mod summary;
