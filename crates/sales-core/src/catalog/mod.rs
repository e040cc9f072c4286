//! Sale catalog types.

mod category;
mod sale;

pub use category::{category_label, KNOWN_CATEGORIES};
pub use sale::Sale;
