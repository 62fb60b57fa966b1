pub mod noon;
pub mod transitions;
