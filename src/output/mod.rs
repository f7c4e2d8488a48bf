//! Output formatting for the command line front end.
//!
//! - [`terminal`] - aligned, optionally coloured text rows

mod terminal;

pub use terminal::{
    format_field, render_bogon, render_info, render_set, render_subnet_row, render_subnets,
};
