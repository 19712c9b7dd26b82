mod card;
mod readme;

pub use card::{BEGIN_MARKER, END_MARKER, generate as generate_card};
pub use readme::update as update_readme;
