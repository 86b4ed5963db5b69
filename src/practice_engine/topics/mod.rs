//! Topic generators, one file per curriculum module.
//!
//! Each module owns a closed operation enum whose serde tags match the
//! curriculum `operations` strings, and exposes the same entry point:
//!
//! ```ignore
//! pub fn generate<R: Rng + ?Sized>(
//!     rng: &mut R,
//!     params: &ParameterSet,
//!     level: Level,
//! ) -> QuestionBody
//! ```
//!
//! The generator dispatches to these via `generator.rs` and stamps the id,
//! module and level onto the returned body.

/// CO- counting on and back, sequences, ordering
pub mod counting;
/// NB- number bonds and fact families
pub mod bonds;
/// MU- times tables and division facts
pub mod multiply;
/// FR- fractions of amounts, equivalence, comparison
pub mod fractions;
/// PV- place value
pub mod place_value;
/// WM- columnar addition and subtraction
pub mod written;
/// CV- unit conversions
pub mod conversions;
/// FA- factors, multiples, primes
pub mod factors;
/// RO- rounding and estimation
pub mod rounding;
/// MO- money
pub mod money;
/// NE- negative numbers
pub mod negatives;
/// TI- time
pub mod time;
