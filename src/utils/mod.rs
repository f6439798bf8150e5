pub mod dna;
pub mod validation;
