// src/payslip/mod.rs
pub mod assembler;
pub mod models;
pub mod validator;

pub use assembler::PayslipAssembler;
