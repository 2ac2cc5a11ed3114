pub mod inflation_adjusted_sip;
pub mod lumpsum;
pub mod sip;
pub mod step_up_sip;
