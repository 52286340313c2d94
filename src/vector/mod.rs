//! Algorithms that search for local minima of functions along multiple dimensions.

mod hooke_jeeves;

pub use self::hooke_jeeves::best_nearby;
pub use self::hooke_jeeves::initial_steps;
pub use self::hooke_jeeves::HookeJeeves;
pub use self::hooke_jeeves::HookeJeevesBuilder;
pub use self::hooke_jeeves::HookeJeevesBuilderError;
pub use self::hooke_jeeves::Iteration;
pub use self::hooke_jeeves::VARS;

mod nelder_mead;

pub use self::nelder_mead::NelderMead;
pub use self::nelder_mead::NelderMeadBuilder;
pub use self::nelder_mead::NelderMeadBuilderError;
