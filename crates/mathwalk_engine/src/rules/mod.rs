pub mod absolute_value;
pub mod arithmetic;
pub mod cancel;
pub mod distribute;
pub mod fractions;
pub mod poly_terms;
pub mod signs;
