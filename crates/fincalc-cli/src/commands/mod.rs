pub mod investments;
pub mod loans;
pub mod planning;
