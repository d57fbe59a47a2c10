pub mod assemble;
pub mod prepare;
