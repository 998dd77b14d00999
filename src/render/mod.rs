//! Plain-text views of the list and the form.

pub mod text;

pub use text::{render_form, render_list};
